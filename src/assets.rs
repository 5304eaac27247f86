//! Sprite assets
//!
//! Every avatar has one image per state, except the throw state which is a
//! frame sequence. The manifest is validated before a session is created so
//! the throw animator never sees an empty sequence.

use thiserror::Error;

use crate::consts::THROW_FRAME_COUNT;
use crate::settings::Condition;
use crate::sim::{AvatarId, AvatarState, Session};

/// Path of the shared ball sprite
pub const BALL_SPRITE: &str = "assets/ball.png";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("{avatar:?} has no throw frames")]
    EmptyThrowSequence { avatar: AvatarId },
    #[error("{avatar:?} has {found} throw frames, expected {expected}")]
    MismatchedThrowSequence {
        avatar: AvatarId,
        expected: usize,
        found: usize,
    },
    #[error("failed to load {path}")]
    LoadFailed { path: String },
}

/// Image paths for one avatar state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpriteSet {
    Single(String),
    Sequence(Vec<String>),
}

impl SpriteSet {
    pub fn paths(&self) -> &[String] {
        match self {
            SpriteSet::Single(path) => std::slice::from_ref(path),
            SpriteSet::Sequence(paths) => paths,
        }
    }
}

/// Path of frame `n` (1-based) for `state`
pub fn sprite_path(state: AvatarState, n: usize) -> String {
    format!("assets/player/{}/{}.png", state.as_str(), n)
}

/// All sprites, indexed by avatar then state
#[derive(Debug, Clone)]
pub struct AssetManifest {
    pub avatars: [[SpriteSet; 4]; 3],
    pub ball: String,
}

impl Default for AssetManifest {
    fn default() -> Self {
        let avatar_set = || {
            AvatarState::ALL.map(|state| match state {
                AvatarState::Throw => SpriteSet::Sequence(
                    (1..=THROW_FRAME_COUNT).map(|n| sprite_path(state, n)).collect(),
                ),
                _ => SpriteSet::Single(sprite_path(state, 1)),
            })
        };
        Self {
            avatars: [avatar_set(), avatar_set(), avatar_set()],
            ball: BALL_SPRITE.to_string(),
        }
    }
}

impl AssetManifest {
    pub fn sprites(&self, avatar: AvatarId, state: AvatarState) -> &SpriteSet {
        &self.avatars[avatar.index()][state_index(state)]
    }

    /// Every image to load, in a stable order (avatars, states, frames, ball)
    pub fn all_paths(&self) -> Vec<&str> {
        self.avatars
            .iter()
            .flat_map(|sets| sets.iter())
            .flat_map(|set| set.paths())
            .map(String::as_str)
            .chain(std::iter::once(self.ball.as_str()))
            .collect()
    }

    /// Throw sequence length shared by all avatars
    pub fn throw_frame_count(&self) -> Result<usize, AssetError> {
        let mut expected = None;
        for avatar in AvatarId::ALL {
            let found = self.sprites(avatar, AvatarState::Throw).paths().len();
            if found == 0 {
                return Err(AssetError::EmptyThrowSequence { avatar });
            }
            match expected {
                None => expected = Some(found),
                Some(expected) if expected != found => {
                    return Err(AssetError::MismatchedThrowSequence {
                        avatar,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(expected.unwrap_or(THROW_FRAME_COUNT))
    }

    /// Build a session whose throw animation matches this manifest
    pub fn new_session(&self, condition: Condition) -> Result<Session, AssetError> {
        Ok(Session::new(condition, self.throw_frame_count()?))
    }
}

/// Position of `state` within a per-avatar sprite array
pub fn state_index(state: AvatarState) -> usize {
    match state {
        AvatarState::Idle => 0,
        AvatarState::Active => 1,
        AvatarState::Throw => 2,
        AvatarState::Catch => 3,
    }
}

/// Counts image loads and reports completion exactly once
#[derive(Debug, Clone)]
pub struct LoadTracker {
    expected: usize,
    loaded: usize,
    failed: Vec<String>,
}

impl LoadTracker {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            loaded: 0,
            failed: Vec::new(),
        }
    }

    pub fn for_manifest(manifest: &AssetManifest) -> Self {
        Self::new(manifest.all_paths().len())
    }

    /// Record a loaded image. Returns true on the load that completes the set.
    pub fn mark_loaded(&mut self) -> bool {
        if self.loaded >= self.expected {
            return false;
        }
        self.loaded += 1;
        self.is_complete()
    }

    pub fn mark_failed(&mut self, path: &str) -> AssetError {
        log::error!("Failed to load {}", path);
        self.failed.push(path.to_string());
        AssetError::LoadFailed {
            path: path.to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.loaded == self.expected
    }

    /// Loaded fraction in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.expected == 0 {
            1.0
        } else {
            self.loaded as f32 / self.expected as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest_paths() {
        let manifest = AssetManifest::default();
        let paths = manifest.all_paths();
        // 3 avatars x (idle + active + 3 throw + catch) + ball
        assert_eq!(paths.len(), 3 * 6 + 1);
        assert_eq!(paths[0], "assets/player/idle/1.png");
        assert_eq!(paths.last(), Some(&"assets/ball.png"));
        assert_eq!(
            manifest.sprites(AvatarId::Computer2, AvatarState::Throw).paths(),
            ["assets/player/throw/1.png", "assets/player/throw/2.png", "assets/player/throw/3.png"]
        );
        assert_eq!(manifest.throw_frame_count(), Ok(THROW_FRAME_COUNT));
    }

    #[test]
    fn test_empty_throw_sequence_rejected() {
        let mut manifest = AssetManifest::default();
        manifest.avatars[1][state_index(AvatarState::Throw)] = SpriteSet::Sequence(Vec::new());
        assert_eq!(
            manifest.new_session(Condition::Inclusion).unwrap_err(),
            AssetError::EmptyThrowSequence {
                avatar: AvatarId::Computer1
            }
        );
    }

    #[test]
    fn test_mismatched_throw_sequence_rejected() {
        let mut manifest = AssetManifest::default();
        manifest.avatars[2][state_index(AvatarState::Throw)] =
            SpriteSet::Sequence(vec![sprite_path(AvatarState::Throw, 1)]);
        assert_eq!(
            manifest.throw_frame_count(),
            Err(AssetError::MismatchedThrowSequence {
                avatar: AvatarId::Computer2,
                expected: 3,
                found: 1,
            })
        );
    }

    #[test]
    fn test_tracker_completes_once() {
        let mut tracker = LoadTracker::new(3);
        assert!(!tracker.mark_loaded());
        assert!(!tracker.mark_loaded());
        assert!(tracker.mark_loaded());
        assert!(!tracker.mark_loaded());
        assert!(tracker.is_complete());
        assert_eq!(tracker.progress(), 1.0);
    }

    #[test]
    fn test_tracker_failure_blocks_completion() {
        let mut tracker = LoadTracker::new(2);
        tracker.mark_loaded();
        let err = tracker.mark_failed("assets/ball.png");
        assert_eq!(err.to_string(), "failed to load assets/ball.png");
        assert!(!tracker.mark_loaded());
        assert!(!tracker.is_complete());
    }
}
