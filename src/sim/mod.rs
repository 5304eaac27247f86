//! Deterministic session module
//!
//! All decision logic lives here. This module must stay pure:
//! - Time comes in as a millisecond timestamp
//! - Randomness comes in as an injected `Rng`
//! - No rendering or platform dependencies

pub mod state;
pub mod throw;
pub mod tick;
pub mod turn;

pub use state::{
    Avatar, AvatarId, AvatarPair, AvatarState, Ball, CatchHold, ChainState, Dispatch, GameEvent,
    GamePhase, PendingSelection, Session,
};
pub use throw::{ThrowAnimation, ThrowStep};
pub use tick::{TickInput, thinking_delay, tick};
pub use turn::{DispatchOutcome, TurnDecision, decide_next_target, next_dispatch, sample_until};
