//! Session state and core types
//!
//! Everything the turn engine, throw animator and scheduler touch lives in a
//! single `Session` value.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::throw::ThrowAnimation;
use crate::AVATAR_POSITIONS;
use crate::consts::*;
use crate::settings::Condition;

/// One of the three fixed seats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AvatarId {
    Human,
    Computer1,
    Computer2,
}

impl AvatarId {
    pub const ALL: [AvatarId; 3] = [AvatarId::Human, AvatarId::Computer1, AvatarId::Computer2];

    pub fn index(self) -> usize {
        match self {
            AvatarId::Human => 0,
            AvatarId::Computer1 => 1,
            AvatarId::Computer2 => 2,
        }
    }

    pub fn is_human(self) -> bool {
        self == AvatarId::Human
    }

    /// Label drawn under the avatar
    pub fn name(self) -> &'static str {
        match self {
            AvatarId::Human => "You",
            AvatarId::Computer1 => "P2",
            AvatarId::Computer2 => "P3",
        }
    }
}

/// Presentation state of an avatar (selects the sprite)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AvatarState {
    #[default]
    Idle,
    Active,
    Throw,
    Catch,
}

impl AvatarState {
    pub const ALL: [AvatarState; 4] = [
        AvatarState::Idle,
        AvatarState::Active,
        AvatarState::Throw,
        AvatarState::Catch,
    ];

    /// Asset directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarState::Idle => "idle",
            AvatarState::Active => "active",
            AvatarState::Throw => "throw",
            AvatarState::Catch => "catch",
        }
    }
}

/// An avatar entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub id: AvatarId,
    pub pos: Vec2,
    pub state: AvatarState,
    /// Throw frame currently shown (only while throwing)
    pub throw_frame: Option<usize>,
}

impl Avatar {
    pub fn new(id: AvatarId) -> Self {
        Self {
            id,
            pos: AVATAR_POSITIONS[id.index()],
            state: AvatarState::Idle,
            throw_frame: None,
        }
    }
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub radius: f32,
    /// Avatar in possession; reassigned the moment a throw is dispatched
    pub holder: AvatarId,
}

impl Ball {
    pub fn new(holder: AvatarId) -> Self {
        Self {
            pos: AVATAR_POSITIONS[holder.index()],
            radius: BALL_RADIUS,
            holder,
        }
    }
}

/// Unordered pair of avatars (a computer may pair with itself)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvatarPair {
    low: AvatarId,
    high: AvatarId,
}

impl AvatarPair {
    pub fn new(a: AvatarId, b: AvatarId) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }
}

/// Consecutive computer-to-computer pairing tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChainState {
    pub count: u32,
    pub last_pair: Option<AvatarPair>,
}

impl ChainState {
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.last_pair.is_none()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Chain state after recording `pair`
    pub fn with_pair(&self, pair: AvatarPair) -> Self {
        if self.last_pair == Some(pair) {
            Self {
                count: self.count + 1,
                last_pair: Some(pair),
            }
        } else {
            Self {
                count: 1,
                last_pair: Some(pair),
            }
        }
    }
}

/// Recipient picked by the human, waiting to be consumed by the turn engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PendingSelection {
    target: Option<AvatarId>,
}

impl PendingSelection {
    pub fn is_selected(&self) -> bool {
        self.target.is_some()
    }

    /// Record a selection, replacing any earlier one
    pub fn record(&mut self, target: AvatarId) {
        self.target = Some(target);
    }

    /// Consume the selection
    pub fn take(&mut self) -> Option<AvatarId> {
        self.target.take()
    }
}

/// A decided ball transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    pub from: AvatarId,
    pub to: AvatarId,
    /// 0-based index of this dispatch in the session
    pub throw_index: u32,
}

/// Receiver showing the catch pose until `release_at`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatchHold {
    pub avatar: AvatarId,
    pub release_at: f64,
}

/// Scheduler phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Assets still loading
    Loading,
    /// Assets loaded; loading screen held until `at`
    Revealing { at: f64 },
    /// Next decision deferred until `decide_at`
    Thinking { decide_at: f64 },
    /// Human holds the ball; re-polled every tick until a selection arrives
    AwaitingSelection,
    /// A throw animation is playing
    Throwing(ThrowAnimation),
    /// Throw budget exhausted
    GameOver,
}

impl GamePhase {
    /// Whether the game view is up and clicks may record a selection
    pub fn is_live(&self) -> bool {
        !matches!(
            self,
            GamePhase::Loading | GamePhase::Revealing { .. } | GamePhase::GameOver
        )
    }
}

/// Events emitted by the scheduler. Any event means state changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    AssetsLoaded,
    GameScreenShown,
    SelectionRecorded(AvatarId),
    AwaitingSelection,
    Dispatched(Dispatch),
    ThrowStep { step: usize, ball_pos: Vec2 },
    Caught(AvatarId),
    CatchReleased(AvatarId),
    GameOver,
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub condition: Condition,
    /// Indexed by `AvatarId::index`
    pub avatars: [Avatar; 3],
    pub ball: Ball,
    /// Completed dispatches
    pub throws: u32,
    pub chain: ChainState,
    pub pending: PendingSelection,
    pub phase: GamePhase,
    pub catch_hold: Option<CatchHold>,
    /// Length of every avatar's throw sequence
    pub throw_frames: usize,
}

impl Session {
    /// Create a session. `throw_frames` comes from a validated asset manifest.
    pub fn new(condition: Condition, throw_frames: usize) -> Self {
        debug_assert!(throw_frames > 0);
        Self {
            condition,
            avatars: AvatarId::ALL.map(Avatar::new),
            ball: Ball::new(AvatarId::Human),
            throws: 0,
            chain: ChainState::default(),
            pending: PendingSelection::default(),
            phase: GamePhase::Loading,
            catch_hold: None,
            throw_frames,
        }
    }

    pub fn avatar(&self, id: AvatarId) -> &Avatar {
        &self.avatars[id.index()]
    }

    pub fn avatar_mut(&mut self, id: AvatarId) -> &mut Avatar {
        &mut self.avatars[id.index()]
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_layout() {
        let session = Session::new(Condition::Inclusion, THROW_FRAME_COUNT);
        assert_eq!(session.ball.holder, AvatarId::Human);
        assert_eq!(session.ball.pos, Vec2::new(300.0, 350.0));
        assert_eq!(session.ball.radius, BALL_RADIUS);
        assert_eq!(session.avatar(AvatarId::Computer1).pos, Vec2::new(150.0, 150.0));
        assert_eq!(session.avatar(AvatarId::Computer2).pos, Vec2::new(450.0, 150.0));
        assert!(session.avatars.iter().all(|a| a.state == AvatarState::Idle));
        assert!(session.chain.is_empty());
        assert_eq!(session.phase, GamePhase::Loading);
    }

    #[test]
    fn test_pair_is_unordered() {
        let a = AvatarPair::new(AvatarId::Computer1, AvatarId::Computer2);
        let b = AvatarPair::new(AvatarId::Computer2, AvatarId::Computer1);
        assert_eq!(a, b);
        assert_ne!(a, AvatarPair::new(AvatarId::Computer1, AvatarId::Computer1));
    }

    #[test]
    fn test_chain_counts_repeats() {
        let pair = AvatarPair::new(AvatarId::Computer1, AvatarId::Computer2);
        let self_pair = AvatarPair::new(AvatarId::Computer2, AvatarId::Computer2);

        let chain = ChainState::default().with_pair(pair);
        assert_eq!(chain.count, 1);
        let chain = chain.with_pair(pair).with_pair(pair);
        assert_eq!(chain.count, 3);

        let chain = chain.with_pair(self_pair);
        assert_eq!(chain.count, 1);
        assert_eq!(chain.last_pair, Some(self_pair));
    }

    #[test]
    fn test_pending_selection_consumed_once() {
        let mut pending = PendingSelection::default();
        assert!(!pending.is_selected());
        pending.record(AvatarId::Computer2);
        assert!(pending.is_selected());
        assert_eq!(pending.take(), Some(AvatarId::Computer2));
        assert_eq!(pending.take(), None);
    }

    #[test]
    fn test_session_serializes() {
        let session = Session::new(Condition::Exclusion, THROW_FRAME_COUNT);
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back.condition, Condition::Exclusion);
        assert_eq!(back.ball.holder, AvatarId::Human);
    }
}
