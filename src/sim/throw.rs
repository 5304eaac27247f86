//! Throw animator
//!
//! A dispatch plays as one step per throw frame, 200 ms apart. Each step moves
//! the ball a fraction of the way to the receiver and shows the matching
//! sender frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{AvatarId, AvatarState, CatchHold, Dispatch, Session};
use crate::consts::*;
use crate::lerp_point;

/// An in-flight throw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowAnimation {
    pub from: AvatarId,
    pub to: AvatarId,
    start: Vec2,
    end: Vec2,
    /// Number of steps (one per sender throw frame)
    frame_count: usize,
    /// Next step to play
    step: usize,
    /// Nominal time of the next step (ms)
    next_step_at: f64,
}

/// One played step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowStep {
    pub index: usize,
    pub ball_pos: Vec2,
    /// Nominal time the step was due (ms)
    pub at: f64,
    pub is_last: bool,
}

impl ThrowAnimation {
    pub fn new(from: AvatarId, to: AvatarId, start: Vec2, end: Vec2, frame_count: usize, now: f64) -> Self {
        Self {
            from,
            to,
            start,
            end,
            frame_count,
            step: 0,
            next_step_at: now + THROW_STEP_MS,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn is_complete(&self) -> bool {
        self.step >= self.frame_count
    }

    /// Ball position after step `k`. The final step lands on the receiver.
    pub fn position_at(&self, k: usize) -> Vec2 {
        if k + 1 >= self.frame_count {
            return self.end;
        }
        let progress = (k + 1) as f32 / self.frame_count as f32;
        lerp_point(self.start, self.end, progress)
    }

    /// Play the next step if it is due by `now`
    pub fn advance(&mut self, now: f64) -> Option<ThrowStep> {
        if self.is_complete() || now < self.next_step_at {
            return None;
        }
        let index = self.step;
        let at = self.next_step_at;
        self.step += 1;
        self.next_step_at += THROW_STEP_MS;
        Some(ThrowStep {
            index,
            ball_pos: self.position_at(index),
            at,
            is_last: self.is_complete(),
        })
    }
}

/// Start the throw for `dispatch`: the sender switches to its throw pose
pub fn begin_throw(session: &mut Session, dispatch: &Dispatch, now: f64) -> ThrowAnimation {
    let start = session.avatar(dispatch.from).pos;
    let end = session.avatar(dispatch.to).pos;
    session.avatar_mut(dispatch.from).state = AvatarState::Throw;
    ThrowAnimation::new(dispatch.from, dispatch.to, start, end, session.throw_frames, now)
}

/// Apply a played step to the session.
///
/// On the last step the sender returns to idle and the receiver holds the
/// catch pose for `CATCH_HOLD_MS`.
pub fn apply_step(session: &mut Session, anim: &ThrowAnimation, step: &ThrowStep) {
    session.ball.pos = step.ball_pos;
    session.avatar_mut(anim.from).throw_frame = Some(step.index);

    if step.is_last {
        let sender = session.avatar_mut(anim.from);
        sender.state = AvatarState::Idle;
        sender.throw_frame = None;

        session.avatar_mut(anim.to).state = AvatarState::Catch;
        session.catch_hold = Some(CatchHold {
            avatar: anim.to,
            release_at: step.at + CATCH_HOLD_MS,
        });
    }
}

/// Release an expired catch hold. Returns the released avatar.
pub fn release_catch(session: &mut Session, now: f64) -> Option<AvatarId> {
    let hold = session.catch_hold?;
    if now < hold.release_at {
        return None;
    }
    session.catch_hold = None;
    let avatar = session.avatar_mut(hold.avatar);
    // A throw may already have started from the catch pose
    if avatar.state == AvatarState::Catch {
        avatar.state = AvatarState::Idle;
    }
    Some(hold.avatar)
}
