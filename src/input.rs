//! Click input
//!
//! Hit tests pointer clicks against the computer avatars and records the
//! human's pick as a pending selection.

use glam::Vec2;

use crate::consts::HIT_RADIUS;
use crate::sim::{Avatar, AvatarId, AvatarState, Session};

/// Computer avatar under `pos`, if any (square tolerance of `HIT_RADIUS`)
pub fn hit_test(avatars: &[Avatar], pos: Vec2) -> Option<AvatarId> {
    avatars
        .iter()
        .filter(|a| !a.id.is_human())
        .find(|a| (a.pos.x - pos.x).abs() < HIT_RADIUS && (a.pos.y - pos.y).abs() < HIT_RADIUS)
        .map(|a| a.id)
}

/// Whether a click may record a selection right now
pub fn accepts_selection(session: &Session) -> bool {
    session.phase.is_live()
        && session.ball.holder.is_human()
        && session.avatar(AvatarId::Human).state == AvatarState::Idle
}

/// Handle a click in canvas coordinates. Returns the recorded target.
pub fn collect_click(session: &mut Session, pos: Vec2) -> Option<AvatarId> {
    if !accepts_selection(session) {
        return None;
    }
    let target = hit_test(&session.avatars, pos)?;
    session.pending.record(target);
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::THROW_FRAME_COUNT;
    use crate::settings::Condition;
    use crate::sim::GamePhase;

    fn live_session() -> Session {
        let mut session = Session::new(Condition::Inclusion, THROW_FRAME_COUNT);
        session.phase = GamePhase::AwaitingSelection;
        session
    }

    #[test]
    fn test_hit_test_tolerance() {
        let session = live_session();
        assert_eq!(hit_test(&session.avatars, Vec2::new(150.0, 150.0)), Some(AvatarId::Computer1));
        assert_eq!(hit_test(&session.avatars, Vec2::new(489.0, 111.0)), Some(AvatarId::Computer2));
        assert_eq!(hit_test(&session.avatars, Vec2::new(190.0, 150.0)), None);
        // Human is never a target
        assert_eq!(hit_test(&session.avatars, Vec2::new(300.0, 350.0)), None);
    }

    #[test]
    fn test_click_records_selection() {
        let mut session = live_session();
        assert_eq!(collect_click(&mut session, Vec2::new(440.0, 160.0)), Some(AvatarId::Computer2));
        assert!(session.pending.is_selected());

        // A later click replaces the pick
        collect_click(&mut session, Vec2::new(160.0, 140.0));
        assert_eq!(session.pending.take(), Some(AvatarId::Computer1));
        assert!(!session.pending.is_selected());
    }

    #[test]
    fn test_click_ignored_when_not_holding_or_busy() {
        let mut session = live_session();
        session.ball.holder = AvatarId::Computer1;
        assert_eq!(collect_click(&mut session, Vec2::new(450.0, 150.0)), None);

        let mut session = live_session();
        session.avatar_mut(AvatarId::Human).state = AvatarState::Catch;
        assert_eq!(collect_click(&mut session, Vec2::new(450.0, 150.0)), None);

        let mut session = live_session();
        session.phase = GamePhase::GameOver;
        assert_eq!(collect_click(&mut session, Vec2::new(450.0, 150.0)), None);
        assert!(!session.pending.is_selected());
    }
}
