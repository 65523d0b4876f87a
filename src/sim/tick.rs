//! Per-frame simulation step
//!
//! One call per animation frame: fire due tasks, then either animate the
//! confetti (finale) or move and collide the envelopes.

use super::collision::resolve_collisions;
use super::interaction::{release_pause, zoom_out};
use super::motion;
use super::phase::{begin_boss, enter_finale, fade_intro};
use super::schedule::Task;
use super::state::{GamePhase, GameState, TransitionError, Viewport};

/// Advance the game by one animation frame at host time `now_ms`
pub fn tick(state: &mut GameState, now_ms: f64) {
    state.observe_time(now_ms);
    state.frame += 1;

    while let Some((_, task)) = state.scheduler.pop_due(state.now_ms) {
        if let Err(e) = run_task(state, task) {
            log::warn!("{task:?} skipped: {e}");
        }
    }

    match state.phase {
        GamePhase::Finale => {
            state.confetti.step(&mut state.rng);
        }
        _ => {
            motion::step(state);
            if motion::motion_active(state) {
                resolve_collisions(state);
            }
        }
    }
}

/// Window load/resize hook
pub fn resize(state: &mut GameState, viewport: Viewport) {
    motion::reinitialize(state, viewport);
}

fn run_task(state: &mut GameState, task: Task) -> Result<(), TransitionError> {
    match task {
        Task::ZoomOut(id) => {
            state.pending_zoom_out = None;
            zoom_out(state, id)
        }
        Task::ReleasePause => release_pause(state),
        Task::FadeIntro => {
            fade_intro(state);
            Ok(())
        }
        Task::BeginBoss => begin_boss(state),
        Task::Finale => {
            state.finale_timer = None;
            enter_finale(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Settings;
    use crate::sim::interaction::{PointerOutcome, dismiss, envelope_pointer_up, overlay_pointer_up};
    use crate::sim::state::{EnvelopeId, EnvelopeState};
    use glam::Vec2;
    use proptest::prelude::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn new_state() -> GameState {
        GameState::new(Settings::default(), 12345, Viewport::new(1280.0, 720.0))
    }

    /// Run frames until `until_ms`, checking the focus invariant every frame
    fn run_until(state: &mut GameState, until_ms: f64) {
        let mut t = state.now_ms;
        while t < until_ms {
            t = (t + FRAME_MS).min(until_ms);
            tick(state, t);
            assert!(state.focused_count() <= 1);
        }
    }

    /// Catch, open and dismiss one envelope, then wait out the choreography
    fn read_letter(state: &mut GameState, id: EnvelopeId) {
        let t = state.now_ms;
        assert_eq!(envelope_pointer_up(state, id, t), PointerOutcome::Zoomed(id));
        assert_eq!(envelope_pointer_up(state, id, t + 100.0), PointerOutcome::Opened(id));
        run_until(state, t + 200.0);
        assert_eq!(dismiss(state), PointerOutcome::Closing(id));
        run_until(state, t + 200.0 + CLOSE_ANIMATION_MS + PAUSE_GRACE_MS + 100.0);
        assert!(!state.paused);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = new_state();
        let mut state2 = new_state();

        for i in 1..=120 {
            tick(&mut state1, i as f64 * FRAME_MS);
            tick(&mut state2, i as f64 * FRAME_MS);
        }

        assert_eq!(state1.frame, state2.frame);
        for (a, b) in state1.envelopes.iter().zip(&state2.envelopes) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.vel, b.vel);
        }
    }

    #[test]
    fn test_envelopes_move_in_phase1() {
        let mut state = new_state();
        let before: Vec<_> = state.envelopes.iter().map(|e| e.pos).collect();
        tick(&mut state, FRAME_MS);
        let after: Vec<_> = state.envelopes.iter().map(|e| e.pos).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_catch_freezes_motion() {
        let mut state = new_state();
        tick(&mut state, FRAME_MS);
        envelope_pointer_up(&mut state, EnvelopeId::Ordinary(0), FRAME_MS);
        let frozen: Vec<_> = state.envelopes.iter().map(|e| e.pos).collect();

        run_until(&mut state, 2000.0);
        let after: Vec<_> = state.envelopes.iter().map(|e| e.pos).collect();
        assert_eq!(frozen, after);
        assert!(state.paused);
    }

    #[test]
    fn test_dismiss_opened_timeline() {
        let mut state = new_state();
        let id = EnvelopeId::Ordinary(1);
        envelope_pointer_up(&mut state, id, 0.0);
        envelope_pointer_up(&mut state, id, 0.0);
        let old_pos = state.envelopes[1].pos;

        assert_eq!(
            overlay_pointer_up(&mut state, Vec2::new(1.0, 1.0), 1000.0),
            PointerOutcome::Closing(id)
        );
        assert_eq!(state.envelopes[1].state, EnvelopeState::Zoomed);

        // Still zoomed just before the close animation ends
        run_until(&mut state, 1000.0 + CLOSE_ANIMATION_MS - 1.0);
        assert_eq!(state.envelopes[1].state, EnvelopeState::Zoomed);
        assert_eq!(state.focus, Some(id));

        run_until(&mut state, 1000.0 + CLOSE_ANIMATION_MS);
        assert_eq!(state.envelopes[1].state, EnvelopeState::Moving);
        assert_eq!(state.focus, None);
        assert!(state.paused);
        assert_eq!(state.envelopes[1].pos, old_pos);
        let speed = state.base_speed();
        assert!((state.envelopes[1].vel.abs() - Vec2::splat(speed)).length() < 1e-6);

        run_until(&mut state, 1000.0 + CLOSE_ANIMATION_MS + PAUSE_GRACE_MS - 1.0);
        assert!(state.paused);
        run_until(&mut state, 1000.0 + CLOSE_ANIMATION_MS + PAUSE_GRACE_MS);
        assert!(!state.paused);
    }

    #[test]
    fn test_reopen_cancels_pending_zoom_out() {
        let mut state = new_state();
        let id = EnvelopeId::Ordinary(2);
        envelope_pointer_up(&mut state, id, 0.0);
        envelope_pointer_up(&mut state, id, 0.0);
        dismiss(&mut state);

        // Click the envelope again while the paper is folding
        run_until(&mut state, 300.0);
        assert_eq!(envelope_pointer_up(&mut state, id, 300.0), PointerOutcome::Opened(id));

        // The stale zoom-out must not fire
        run_until(&mut state, 2000.0);
        assert_eq!(state.envelopes[2].state, EnvelopeState::Opened);
        assert_eq!(state.focus, Some(id));
        assert!(state.paused);
    }

    #[test]
    fn test_dismiss_during_close_zooms_out_once() {
        let mut state = new_state();
        let id = EnvelopeId::Ordinary(3);
        envelope_pointer_up(&mut state, id, 0.0);
        envelope_pointer_up(&mut state, id, 0.0);
        dismiss(&mut state);
        run_until(&mut state, 100.0);

        assert_eq!(dismiss(&mut state), PointerOutcome::Released(id));
        let vel = state.envelopes[3].vel;
        assert_eq!(state.scheduler.len(), 1); // only the pause release

        run_until(&mut state, 1000.0);
        assert_eq!(state.envelopes[3].state, EnvelopeState::Moving);
        assert_eq!(state.envelopes[3].vel.abs(), vel.abs());
        assert!(!state.paused);
    }

    #[test]
    fn test_five_reads_start_intro() {
        let mut state = new_state();
        for i in 0..ENVELOPE_COUNT as u8 {
            assert_eq!(state.phase, GamePhase::Phase1);
            read_letter(&mut state, EnvelopeId::Ordinary(i));
        }
        assert_eq!(state.read_count, 5);
        assert_eq!(state.phase, GamePhase::Intro);
        assert!(state.envelopes.iter().all(|e| e.is_hidden()));

        // Intro plays out on its own: hold, fade, boss. It started during the
        // last grace period, at most ~120 ms before `start`.
        let start = state.now_ms;
        run_until(&mut state, start + INTRO_HOLD_MS - 200.0);
        assert!(!state.intro_fading);
        run_until(&mut state, start + INTRO_HOLD_MS + FRAME_MS);
        assert!(state.intro_fading);
        assert_eq!(state.phase, GamePhase::Intro);
        run_until(&mut state, start + INTRO_HOLD_MS + INTRO_FADE_MS + 2.0 * FRAME_MS);
        assert_eq!(state.phase, GamePhase::Boss);
        assert_eq!(state.gold.state, EnvelopeState::Moving);
    }

    #[test]
    fn test_rereading_does_not_advance() {
        let mut state = new_state();
        for _ in 0..6 {
            read_letter(&mut state, EnvelopeId::Ordinary(0));
        }
        assert_eq!(state.read_count, 1);
        assert_eq!(state.phase, GamePhase::Phase1);
    }

    #[test]
    fn test_boss_to_finale() {
        let mut state = new_state();
        for i in 0..ENVELOPE_COUNT as u8 {
            read_letter(&mut state, EnvelopeId::Ordinary(i));
        }
        let t = state.now_ms + INTRO_HOLD_MS + INTRO_FADE_MS + 2.0 * FRAME_MS;
        run_until(&mut state, t);
        assert_eq!(state.phase, GamePhase::Boss);

        // Gold moves, the others stay hidden and still
        let gold_start = state.gold.pos;
        run_until(&mut state, t + 100.0);
        assert_ne!(state.gold.pos, gold_start);
        let gold_speed = state.base_speed() * GOLD_SPEED_MULTIPLIER;
        assert!((state.gold.vel.x.abs() - gold_speed).abs() < 1e-5);

        // Catch and open the gold envelope
        let open_at = state.now_ms;
        let gold = EnvelopeId::Gold;
        assert_eq!(
            envelope_pointer_up(&mut state, gold, open_at),
            PointerOutcome::Zoomed(gold)
        );
        assert_eq!(
            envelope_pointer_up(&mut state, gold, open_at),
            PointerOutcome::Opened(gold)
        );
        assert_eq!(state.read_count, 5);

        tick(&mut state, open_at + FINALE_DELAY_MS - 1.0);
        assert_eq!(state.phase, GamePhase::Boss);
        tick(&mut state, open_at + FINALE_DELAY_MS);
        assert_eq!(state.phase, GamePhase::Finale);
        assert_eq!(state.confetti.len(), CONFETTI_COUNT);

        // Confetti keeps animating, envelopes never move again
        let gold_pos = state.gold.pos;
        let first_y = state.confetti.particles[0].pos.y;
        run_until(&mut state, open_at + FINALE_DELAY_MS + 5000.0);
        assert_ne!(state.confetti.particles[0].pos.y, first_y);
        assert_eq!(state.gold.pos, gold_pos);
        assert!(state.envelopes.iter().all(|e| e.is_hidden()));
    }

    #[test]
    fn test_phases_strictly_ordered() {
        let mut state = new_state();
        let mut seen = vec![state.phase];
        for i in 0..ENVELOPE_COUNT as u8 {
            read_letter(&mut state, EnvelopeId::Ordinary(i));
            if *seen.last().unwrap() != state.phase {
                seen.push(state.phase);
            }
        }
        let mut t = state.now_ms;
        for _ in 0..700 {
            t += FRAME_MS;
            tick(&mut state, t);
            if *seen.last().unwrap() != state.phase {
                seen.push(state.phase);
            }
            if state.phase == GamePhase::Boss && state.focus.is_none() && !state.paused {
                envelope_pointer_up(&mut state, EnvelopeId::Gold, t);
                envelope_pointer_up(&mut state, EnvelopeId::Gold, t);
            }
        }
        assert_eq!(
            seen,
            vec![GamePhase::Phase1, GamePhase::Intro, GamePhase::Boss, GamePhase::Finale]
        );
    }

    #[test]
    fn test_resize_relayouts() {
        let mut state = new_state();
        resize(&mut state, Viewport::new(400.0, 300.0));
        assert!((state.envelope_size.x - 300.0 * ENVELOPE_WIDTH_FRACTION).abs() < 1e-4);
        for env in &state.envelopes {
            assert!(env.pos.x <= 400.0 - state.envelope_size.x);
            assert!(env.pos.y <= 300.0 - state.envelope_size.y);
        }
    }

    #[test]
    fn test_resize_keeps_gold_position() {
        let mut state = new_state();
        crate::sim::phase::start_intro(&mut state).unwrap();
        crate::sim::phase::begin_boss(&mut state).unwrap();
        run_until(&mut state, 100.0);
        let gold_pos = state.gold.pos;
        assert_ne!(gold_pos + state.envelope_size * 0.5, state.viewport.center());

        resize(&mut state, Viewport::new(1600.0, 900.0));

        assert_eq!(state.gold.pos, gold_pos);
        let gold_speed = 1600.0 * SPEED_SCALE * GOLD_SPEED_MULTIPLIER;
        assert!((state.gold.vel - Vec2::splat(gold_speed)).length() < 1e-5);
        assert_eq!(state.gold.vel, Vec2::splat(state.base_speed() * GOLD_SPEED_MULTIPLIER));
    }

    #[derive(Debug, Clone)]
    enum Gesture {
        Click(f32, f32),
        Dismiss,
        Wait(f64),
    }

    fn gesture() -> impl Strategy<Value = Gesture> {
        prop_oneof![
            (0.0f32..1280.0, 0.0f32..720.0).prop_map(|(x, y)| Gesture::Click(x, y)),
            Just(Gesture::Dismiss),
            (0.0f64..2500.0).prop_map(Gesture::Wait),
        ]
    }

    fn phase_rank(phase: GamePhase) -> u8 {
        match phase {
            GamePhase::Phase1 => 0,
            GamePhase::Intro => 1,
            GamePhase::Boss => 2,
            GamePhase::Finale => 3,
        }
    }

    proptest! {
        #[test]
        fn prop_random_input_keeps_invariants(
            seed in any::<u64>(),
            script in proptest::collection::vec(gesture(), 1..60),
        ) {
            let mut state = GameState::new(Settings::default(), seed, Viewport::new(1280.0, 720.0));
            let mut rank = phase_rank(state.phase);

            for g in script {
                let now = state.now_ms;
                match g {
                    Gesture::Click(x, y) => {
                        crate::sim::interaction::pointer_up(&mut state, Vec2::new(x, y), now);
                    }
                    Gesture::Dismiss => {
                        dismiss(&mut state);
                    }
                    Gesture::Wait(ms) => run_until(&mut state, now + ms),
                }

                prop_assert!(state.focused_count() <= 1);
                prop_assert_eq!(state.overlay_active(), state.focus.is_some());
                if state.focus.is_some() {
                    prop_assert!(state.paused);
                }
                let next = phase_rank(state.phase);
                prop_assert!(next >= rank && next <= rank + 1);
                rank = next;
            }
        }
    }
}
