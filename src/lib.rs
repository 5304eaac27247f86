//! Ball Toss - a three-avatar ball passing experiment
//!
//! Core modules:
//! - `sim`: Deterministic session (turn engine, throw animator, scheduler)
//! - `assets`: Sprite manifest, load tracking and validation
//! - `input`: Click hit testing and pending selections
//! - `renderer`: Canvas drawing of avatars and the ball
//! - `settings`: Startup parameters (condition from the `v` query parameter)

pub mod assets;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::{AssetError, AssetManifest};
pub use settings::{Condition, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Canvas dimensions
    pub const CANVAS_WIDTH: u32 = 600;
    pub const CANVAS_HEIGHT: u32 = 400;

    /// Session length in dispatches
    pub const MAX_THROWS: u32 = 30;

    /// Frames in every avatar's throw sequence
    pub const THROW_FRAME_COUNT: usize = 3;
    /// Time each throw frame is shown (ms)
    pub const THROW_STEP_MS: f64 = 200.0;
    /// How long a receiver shows the catch pose (ms)
    pub const CATCH_HOLD_MS: f64 = 1000.0;
    /// Thinking delay between dispatches, sampled from [min, max) ms
    pub const THINK_MIN_MS: f64 = 800.0;
    pub const THINK_MAX_MS: f64 = 2000.0;

    /// Minimum time the loading screen stays up after assets finish (ms)
    pub const MIN_LOADING_MS: f64 = 5000.0;
    /// Delay between revealing the game and the first decision (ms)
    pub const FIRST_THROW_DELAY_MS: f64 = 1000.0;

    /// Computer-to-computer repeats allowed for the same pairing
    pub const MAX_NPC_CHAIN: u32 = 3;
    /// Inclusion: chance a computer throws to the human
    pub const INCLUSION_HUMAN_CHANCE: f64 = 0.4;
    /// Exclusion: chance a computer throws to the human, before and after the cutoff
    pub const EXCLUSION_EARLY_HUMAN_CHANCE: f64 = 0.2;
    pub const EXCLUSION_LATE_HUMAN_CHANCE: f64 = 0.05;
    /// Exclusion: first throw index using the late chance
    pub const EXCLUSION_CUTOFF_THROW: u32 = 6;

    /// Click tolerance around an avatar (px, square)
    pub const HIT_RADIUS: f32 = 40.0;
    /// Avatar sprite edge length (px)
    pub const AVATAR_SIZE: f32 = 80.0;
    /// Ball radius (px)
    pub const BALL_RADIUS: f32 = 10.0;
}

/// Fixed avatar seats on the canvas: human at the bottom, computers above
pub const AVATAR_POSITIONS: [Vec2; 3] = [
    Vec2::new(300.0, 350.0),
    Vec2::new(150.0, 150.0),
    Vec2::new(450.0, 150.0),
];

/// Linear interpolation between two canvas points
#[inline]
pub fn lerp_point(start: Vec2, end: Vec2, progress: f32) -> Vec2 {
    start + (end - start) * progress
}
