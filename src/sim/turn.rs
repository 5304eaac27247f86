//! Turn engine
//!
//! Decides who receives the ball next. Human throws come from a pending
//! click selection; computer throws are sampled according to the session
//! condition, with repeated computer-to-computer pairings capped by rejection
//! sampling.

use rand::Rng;

use super::state::{AvatarId, AvatarPair, ChainState, Dispatch, PendingSelection, Session};
use crate::consts::*;
use crate::settings::Condition;

/// Outcome of asking the turn engine for a recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDecision {
    /// Throw to this avatar
    Target(AvatarId),
    /// Human holds the ball and has not picked anyone yet
    Wait,
}

/// Outcome of a dispatch attempt on a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched(Dispatch),
    Wait,
    /// Throw budget exhausted
    Finished,
}

/// Draw from `draw` until `accept` returns a value.
///
/// `accept` must not have side effects on rejection; only the accepted value
/// escapes.
pub fn sample_until<R, T, U>(
    rng: &mut R,
    mut draw: impl FnMut(&mut R) -> T,
    mut accept: impl FnMut(&T) -> Option<U>,
) -> U
where
    R: Rng + ?Sized,
{
    loop {
        let candidate = draw(rng);
        if let Some(accepted) = accept(&candidate) {
            return accepted;
        }
    }
}

/// Human with probability `human_chance`, otherwise either computer with
/// equal odds (the holder may draw itself).
pub fn sample_recipient<R: Rng + ?Sized>(rng: &mut R, human_chance: f64) -> AvatarId {
    if rng.random_bool(human_chance) {
        AvatarId::Human
    } else if rng.random_bool(0.5) {
        AvatarId::Computer1
    } else {
        AvatarId::Computer2
    }
}

/// Chain state after `holder` throws to `candidate`, or `None` if that would
/// repeat the same computer pairing more than `MAX_NPC_CHAIN` times in a row.
pub fn admit_recipient(chain: &ChainState, holder: AvatarId, candidate: AvatarId) -> Option<ChainState> {
    if candidate.is_human() {
        return Some(ChainState::default());
    }
    let next = chain.with_pair(AvatarPair::new(holder, candidate));
    (next.count <= MAX_NPC_CHAIN).then_some(next)
}

/// Pick the next recipient.
///
/// Returns `Wait` without touching anything when the human holds the ball and
/// no selection is pending.
pub fn decide_next_target<R: Rng + ?Sized>(
    holder: AvatarId,
    throw_index: u32,
    condition: Condition,
    pending: &mut PendingSelection,
    chain: &mut ChainState,
    rng: &mut R,
) -> TurnDecision {
    if holder.is_human() {
        let Some(target) = pending.take() else {
            return TurnDecision::Wait;
        };
        chain.reset();
        return TurnDecision::Target(target);
    }

    let target = match condition {
        Condition::Inclusion => inclusion_target(holder, throw_index, chain, rng),
        Condition::Exclusion => exclusion_target(throw_index, rng),
    };
    TurnDecision::Target(target)
}

fn inclusion_target<R: Rng + ?Sized>(
    holder: AvatarId,
    throw_index: u32,
    chain: &mut ChainState,
    rng: &mut R,
) -> AvatarId {
    // Final throw always goes to the participant
    if throw_index == MAX_THROWS - 1 {
        return AvatarId::Human;
    }

    let current = *chain;
    let (target, next_chain) = sample_until(
        rng,
        |rng| sample_recipient(rng, INCLUSION_HUMAN_CHANCE),
        |&candidate| admit_recipient(&current, holder, candidate).map(|next| (candidate, next)),
    );
    *chain = next_chain;
    target
}

fn exclusion_target<R: Rng + ?Sized>(throw_index: u32, rng: &mut R) -> AvatarId {
    let human_chance = if throw_index < EXCLUSION_CUTOFF_THROW {
        EXCLUSION_EARLY_HUMAN_CHANCE
    } else {
        EXCLUSION_LATE_HUMAN_CHANCE
    };
    sample_recipient(rng, human_chance)
}

/// Run one turn-engine decision against the session.
///
/// On a target, the ball holder is reassigned immediately and the throw
/// counter advances by one.
pub fn next_dispatch<R: Rng + ?Sized>(session: &mut Session, rng: &mut R) -> DispatchOutcome {
    if session.throws >= MAX_THROWS {
        return DispatchOutcome::Finished;
    }

    let from = session.ball.holder;
    let throw_index = session.throws;
    let decision = decide_next_target(
        from,
        throw_index,
        session.condition,
        &mut session.pending,
        &mut session.chain,
        rng,
    );

    match decision {
        TurnDecision::Wait => DispatchOutcome::Wait,
        TurnDecision::Target(to) => {
            session.ball.holder = to;
            session.throws += 1;
            DispatchOutcome::Dispatched(Dispatch {
                from,
                to,
                throw_index,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pair_12() -> AvatarPair {
        AvatarPair::new(AvatarId::Computer1, AvatarId::Computer2)
    }

    #[test]
    fn test_human_waits_without_selection() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pending = PendingSelection::default();
        let mut chain = ChainState {
            count: 2,
            last_pair: Some(pair_12()),
        };
        let before = chain;

        for _ in 0..10 {
            let decision = decide_next_target(
                AvatarId::Human,
                4,
                Condition::Inclusion,
                &mut pending,
                &mut chain,
                &mut rng,
            );
            assert_eq!(decision, TurnDecision::Wait);
            assert_eq!(chain, before);
            assert!(!pending.is_selected());
        }
    }

    #[test]
    fn test_human_selection_consumed_and_chain_reset() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pending = PendingSelection::default();
        pending.record(AvatarId::Computer2);
        let mut chain = ChainState {
            count: 3,
            last_pair: Some(pair_12()),
        };

        let decision = decide_next_target(
            AvatarId::Human,
            0,
            Condition::Exclusion,
            &mut pending,
            &mut chain,
            &mut rng,
        );
        assert_eq!(decision, TurnDecision::Target(AvatarId::Computer2));
        assert!(chain.is_empty());
        assert!(!pending.is_selected());
    }

    #[test]
    fn test_inclusion_final_throw_goes_to_human() {
        for seed in 0..50 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut pending = PendingSelection::default();
            let mut chain = ChainState {
                count: 2,
                last_pair: Some(pair_12()),
            };
            let before = chain;

            let decision = decide_next_target(
                AvatarId::Computer1,
                MAX_THROWS - 1,
                Condition::Inclusion,
                &mut pending,
                &mut chain,
                &mut rng,
            );
            assert_eq!(decision, TurnDecision::Target(AvatarId::Human));
            assert_eq!(chain, before);
        }
    }

    #[test]
    fn test_inclusion_rejects_fourth_repeat() {
        let chain = ChainState {
            count: 3,
            last_pair: Some(pair_12()),
        };
        assert_eq!(admit_recipient(&chain, AvatarId::Computer1, AvatarId::Computer2), None);
        assert_eq!(admit_recipient(&chain, AvatarId::Computer2, AvatarId::Computer1), None);

        let self_pass = admit_recipient(&chain, AvatarId::Computer1, AvatarId::Computer1).unwrap();
        assert_eq!(self_pass.count, 1);

        let to_human = admit_recipient(&chain, AvatarId::Computer1, AvatarId::Human).unwrap();
        assert!(to_human.is_empty());
    }

    #[test]
    fn test_inclusion_never_picks_capped_pair() {
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut chain = ChainState {
                count: MAX_NPC_CHAIN,
                last_pair: Some(pair_12()),
            };
            let target = decide_next_target(
                AvatarId::Computer1,
                10,
                Condition::Inclusion,
                &mut PendingSelection::default(),
                &mut chain,
                &mut rng,
            );
            assert_ne!(target, TurnDecision::Target(AvatarId::Computer2));
            assert!(chain.count <= MAX_NPC_CHAIN);
        }
    }

    #[test]
    fn test_exclusion_early_rate() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut pending = PendingSelection::default();
        let mut chain = ChainState::default();
        let samples = 1000;
        let humans = (0..samples)
            .filter(|_| {
                decide_next_target(
                    AvatarId::Computer1,
                    3,
                    Condition::Exclusion,
                    &mut pending,
                    &mut chain,
                    &mut rng,
                ) == TurnDecision::Target(AvatarId::Human)
            })
            .count();

        let rate = humans as f64 / samples as f64;
        assert!((rate - 0.2).abs() < 0.05, "human rate {}", rate);
        assert!(chain.is_empty(), "exclusion never tracks pairings");
    }

    #[test]
    fn test_exclusion_late_rate_drops() {
        let mut rng = Pcg32::seed_from_u64(11);
        let samples = 2000;
        let humans = (0..samples)
            .filter(|_| {
                decide_next_target(
                    AvatarId::Computer2,
                    EXCLUSION_CUTOFF_THROW,
                    Condition::Exclusion,
                    &mut PendingSelection::default(),
                    &mut ChainState::default(),
                    &mut rng,
                ) == TurnDecision::Target(AvatarId::Human)
            })
            .count();

        let rate = humans as f64 / samples as f64;
        assert!(rate < 0.1, "human rate {}", rate);
    }

    #[test]
    fn test_next_dispatch_updates_holder_and_counter() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut session = Session::new(Condition::Inclusion, THROW_FRAME_COUNT);

        assert_eq!(next_dispatch(&mut session, &mut rng), DispatchOutcome::Wait);
        assert_eq!(session.throws, 0);

        session.pending.record(AvatarId::Computer1);
        let outcome = next_dispatch(&mut session, &mut rng);
        assert_eq!(
            outcome,
            DispatchOutcome::Dispatched(Dispatch {
                from: AvatarId::Human,
                to: AvatarId::Computer1,
                throw_index: 0,
            })
        );
        assert_eq!(session.ball.holder, AvatarId::Computer1);
        assert_eq!(session.throws, 1);
    }

    #[test]
    fn test_next_dispatch_finishes_at_budget() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut session = Session::new(Condition::Inclusion, THROW_FRAME_COUNT);
        session.ball.holder = AvatarId::Computer2;
        session.throws = MAX_THROWS;

        assert_eq!(next_dispatch(&mut session, &mut rng), DispatchOutcome::Finished);
        assert_eq!(session.throws, MAX_THROWS);
        assert_eq!(session.ball.holder, AvatarId::Computer2);
    }

    /// Play a whole session, the human cycling through `picks` (true picks P2)
    fn play_session(condition: Condition, seed: u64, picks: &[bool]) -> Vec<Dispatch> {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut session = Session::new(condition, THROW_FRAME_COUNT);
        let mut dispatches = Vec::new();
        let mut turn = 0;
        loop {
            match next_dispatch(&mut session, &mut rng) {
                DispatchOutcome::Finished => break,
                DispatchOutcome::Wait => {
                    let pick = if picks[turn % picks.len()] {
                        AvatarId::Computer1
                    } else {
                        AvatarId::Computer2
                    };
                    session.pending.record(pick);
                    turn += 1;
                }
                DispatchOutcome::Dispatched(dispatch) => {
                    // The forced final inclusion throw leaves the chain as it was
                    let forced_final = condition == Condition::Inclusion && dispatch.throw_index == MAX_THROWS - 1;
                    if dispatch.to.is_human() && !forced_final {
                        assert!(session.chain.is_empty());
                    }
                    dispatches.push(dispatch);
                }
            }
        }
        dispatches
    }

    proptest! {
        #[test]
        fn prop_inclusion_caps_pair_repeats(seed in any::<u64>(), picks in prop::collection::vec(any::<bool>(), 1..8)) {
            let dispatches = play_session(Condition::Inclusion, seed, &picks);

            let mut run: Option<(AvatarPair, u32)> = None;
            for d in &dispatches {
                if d.from.is_human() || d.to.is_human() {
                    run = None;
                    continue;
                }
                let pair = AvatarPair::new(d.from, d.to);
                run = match run {
                    Some((last, n)) if last == pair => Some((pair, n + 1)),
                    _ => Some((pair, 1)),
                };
                prop_assert!(run.map(|(_, n)| n).unwrap_or(0) <= MAX_NPC_CHAIN);
            }
        }

        #[test]
        fn prop_counter_is_monotonic_and_bounded(seed in any::<u64>(), exclusion in any::<bool>()) {
            let condition = if exclusion { Condition::Exclusion } else { Condition::Inclusion };
            let dispatches = play_session(condition, seed, &[true, false]);

            prop_assert_eq!(dispatches.len() as u32, MAX_THROWS);
            for (i, d) in dispatches.iter().enumerate() {
                prop_assert_eq!(d.throw_index, i as u32);
            }
            for pair in dispatches.windows(2) {
                prop_assert_eq!(pair[0].to, pair[1].from);
            }
        }

        #[test]
        fn prop_inclusion_ends_with_human(seed in any::<u64>()) {
            let dispatches = play_session(Condition::Inclusion, seed, &[false]);
            let last = dispatches.last().unwrap();
            if !last.from.is_human() {
                prop_assert_eq!(last.to, AvatarId::Human);
            }
        }
    }
}
