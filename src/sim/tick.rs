//! Session scheduler
//!
//! Drives loading → reveal → decide → animate → settle → think → decide
//! against an injected clock (ms) and RNG. Called once per animation frame.

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, GamePhase, Session};
use super::throw::{apply_step, begin_throw, release_catch};
use super::turn::{DispatchOutcome, next_dispatch};
use crate::consts::*;
use crate::input::collect_click;

/// Host input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// All assets have finished loading
    pub assets_loaded: bool,
    /// Click position in canvas coordinates (one-shot)
    pub click: Option<Vec2>,
}

/// Sample the pause before the next decision
pub fn thinking_delay<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(THINK_MIN_MS..THINK_MAX_MS)
}

/// Advance the session to `now` (ms). Returned events are in order; an empty
/// list means nothing changed and no redraw is needed.
pub fn tick<R: Rng + ?Sized>(session: &mut Session, input: &TickInput, now: f64, rng: &mut R) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // An expired catch is released first so a click at the same instant sees Idle
    if let Some(avatar) = release_catch(session, now) {
        log::debug!("{} catch released", avatar.name());
        events.push(GameEvent::CatchReleased(avatar));
    }

    if let Some(pos) = input.click {
        if let Some(target) = collect_click(session, pos) {
            log::debug!("Selected {}", target.name());
            events.push(GameEvent::SelectionRecorded(target));
        }
    }

    match session.phase.clone() {
        GamePhase::Loading => {
            if input.assets_loaded {
                session.phase = GamePhase::Revealing {
                    at: now + MIN_LOADING_MS,
                };
                events.push(GameEvent::AssetsLoaded);
            }
        }
        GamePhase::Revealing { at } => {
            if now >= at {
                log::info!("Game started ({})", session.condition.as_str());
                session.phase = GamePhase::Thinking {
                    decide_at: at + FIRST_THROW_DELAY_MS,
                };
                events.push(GameEvent::GameScreenShown);
            }
        }
        GamePhase::Thinking { decide_at } => {
            if now >= decide_at {
                decide(session, now, rng, &mut events);
            }
        }
        GamePhase::AwaitingSelection => {
            decide(session, now, rng, &mut events);
        }
        GamePhase::Throwing(mut anim) => {
            let mut finished_at = None;
            while let Some(step) = anim.advance(now) {
                log::debug!("Throw step {} at {:?}", step.index, step.ball_pos);
                apply_step(session, &anim, &step);
                events.push(GameEvent::ThrowStep {
                    step: step.index,
                    ball_pos: step.ball_pos,
                });
                if step.is_last {
                    events.push(GameEvent::Caught(anim.to));
                    finished_at = Some(step.at);
                }
            }
            session.phase = match finished_at {
                Some(at) => GamePhase::Thinking {
                    decide_at: at + thinking_delay(rng),
                },
                None => GamePhase::Throwing(anim),
            };
        }
        GamePhase::GameOver => {}
    }

    events
}

/// Ask the turn engine for the next dispatch and move to the matching phase
fn decide<R: Rng + ?Sized>(session: &mut Session, now: f64, rng: &mut R, events: &mut Vec<GameEvent>) {
    match next_dispatch(session, rng) {
        DispatchOutcome::Finished => {
            log::info!("Game over after {} throws", session.throws);
            session.phase = GamePhase::GameOver;
            events.push(GameEvent::GameOver);
        }
        DispatchOutcome::Wait => {
            if session.phase != GamePhase::AwaitingSelection {
                session.phase = GamePhase::AwaitingSelection;
                events.push(GameEvent::AwaitingSelection);
            }
        }
        DispatchOutcome::Dispatched(dispatch) => {
            log::info!(
                "Throw {}/{}: {} -> {}",
                dispatch.throw_index + 1,
                MAX_THROWS,
                dispatch.from.name(),
                dispatch.to.name()
            );
            let anim = begin_throw(session, &dispatch, now);
            session.phase = GamePhase::Throwing(anim);
            events.push(GameEvent::Dispatched(dispatch));
        }
    }
}
