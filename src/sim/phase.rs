//! Phase progression: phase1 -> intro -> boss -> finale
//!
//! Every change goes through [`advance_phase`], which only accepts the
//! immediate successor, so phases can be neither skipped nor revisited.

use super::confetti::Confetti;
use super::schedule::Task;
use super::state::{EnvelopeState, GamePhase, GameState, Transition, TransitionError};

/// Move to the next phase
pub fn advance_phase(state: &mut GameState, to: GamePhase) -> Result<(), TransitionError> {
    let from = state.phase;
    state.phase = from.advance_to(to)?;
    log::info!("Phase {} -> {}", from.as_str(), to.as_str());
    Ok(())
}

/// Enough letters read: hide the envelopes and show the boss intro
pub fn start_intro(state: &mut GameState) -> Result<(), TransitionError> {
    advance_phase(state, GamePhase::Intro)?;

    for env in &mut state.envelopes {
        if env.state == EnvelopeState::Moving {
            env.apply(Transition::Hide)?;
        }
    }
    state.intro_fading = false;

    let hold = state.settings.timings.intro_hold_ms;
    let now = state.now_ms;
    state.scheduler.schedule(now, hold, Task::FadeIntro);
    Ok(())
}

/// Intro hold elapsed: fade the panel out
pub fn fade_intro(state: &mut GameState) {
    state.intro_fading = true;
    let fade = state.settings.timings.intro_fade_ms;
    let now = state.now_ms;
    state.scheduler.schedule(now, fade, Task::BeginBoss);
}

/// Intro gone: the gold envelope enters at the center of the screen
pub fn begin_boss(state: &mut GameState) -> Result<(), TransitionError> {
    advance_phase(state, GamePhase::Boss)?;
    state.intro_fading = false;

    let pos = state.viewport.center() - state.envelope_size * 0.5;
    state.gold.apply(Transition::Reveal)?;
    state.gold.pos = pos;
    state.paused = false;

    log::info!("Gold envelope released at ({:.0}, {:.0})", pos.x, pos.y);
    Ok(())
}

/// Gold letter opened: queue the finale (only the first open counts)
pub fn schedule_finale(state: &mut GameState) {
    if state.finale_timer.is_some() {
        return;
    }
    let delay = state.settings.timings.finale_delay_ms;
    let now = state.now_ms;
    state.finale_timer = Some(state.scheduler.schedule(now, delay, Task::Finale));
    log::info!("Finale in {delay} ms");
}

/// Roll the confetti; nothing else moves from here on
pub fn enter_finale(state: &mut GameState) -> Result<(), TransitionError> {
    advance_phase(state, GamePhase::Finale)?;

    for handle in [state.pending_zoom_out.take(), state.pending_release.take()]
        .into_iter()
        .flatten()
    {
        state.scheduler.cancel(handle);
    }

    let bounds = state.viewport;
    let settings = state.settings.confetti;
    state.confetti = Confetti::seed(&mut state.rng, bounds, settings);
    log::info!("Finale: {} confetti pieces", state.confetti.len());
    Ok(())
}
