//! Pointer input and the envelope lifecycle
//!
//! Catch (moving -> zoomed), open (zoomed -> opened), dismiss
//! (opened -> zoomed -> moving). Only one envelope is ever focused; while one
//! is, every other envelope is inert and the rest of the screen is overlay.

use glam::Vec2;

use super::motion::random_diagonal;
use super::phase;
use super::schedule::Task;
use super::state::{EnvelopeId, EnvelopeState, GamePhase, GameState, Transition, TransitionError};

/// Why a pointer-up did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Motion is frozen and this envelope isn't the engaged one
    Paused,
    /// Another envelope is focused
    OtherFocused,
    /// Envelope is not on screen
    Hidden,
    /// Letter is already open
    AlreadyOpened,
    /// Overlay clicked with nothing to dismiss
    NothingFocused,
    /// Pointer hit nothing interactive
    Miss,
    /// Game is over
    Finale,
    /// State machine refused the change
    Rejected,
}

/// What a pointer-up did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Zoomed(EnvelopeId),
    Opened(EnvelopeId),
    /// Paper is folding back, zoom-out follows
    Closing(EnvelopeId),
    Released(EnvelopeId),
    Ignored(IgnoreReason),
}

impl PointerOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, PointerOutcome::Ignored(_))
    }
}

fn rejected(err: TransitionError) -> PointerOutcome {
    log::debug!("Pointer input rejected: {err}");
    PointerOutcome::Ignored(IgnoreReason::Rejected)
}

/// Pointer-up anywhere on the page
///
/// Hit priority: focused envelope, then the overlay, then moving envelopes
/// (topmost first).
pub fn pointer_up(state: &mut GameState, point: Vec2, now_ms: f64) -> PointerOutcome {
    state.observe_time(now_ms);
    if state.phase == GamePhase::Finale {
        return PointerOutcome::Ignored(IgnoreReason::Finale);
    }

    if let Some(id) = state.focus {
        let on_envelope = state.focused_rect().is_some_and(|r| r.contains(point));
        return if on_envelope {
            envelope_pointer_up(state, id, now_ms)
        } else {
            dismiss(state)
        };
    }

    match hit_test(state, point) {
        Some(id) => envelope_pointer_up(state, id, now_ms),
        None => PointerOutcome::Ignored(IgnoreReason::Miss),
    }
}

/// Topmost visible, unfocused envelope under `point`
pub fn hit_test(state: &GameState, point: Vec2) -> Option<EnvelopeId> {
    let size = state.envelope_size;
    state
        .all_envelopes()
        .rev()
        .find(|e| e.state == EnvelopeState::Moving && e.rect(size).contains(point))
        .map(|e| e.id)
}

/// Pointer-up delivered to an envelope element
pub fn envelope_pointer_up(state: &mut GameState, id: EnvelopeId, now_ms: f64) -> PointerOutcome {
    state.observe_time(now_ms);
    if state.phase == GamePhase::Finale {
        return PointerOutcome::Ignored(IgnoreReason::Finale);
    }

    let Some(env) = state.envelope(id) else {
        return PointerOutcome::Ignored(IgnoreReason::Miss);
    };
    let env_state = env.state;
    let engaged = state.focus == Some(id) && env_state.is_focused();

    if state.paused && !engaged {
        log::debug!("{id} ignored: paused");
        return PointerOutcome::Ignored(IgnoreReason::Paused);
    }

    match env_state {
        EnvelopeState::Hidden => PointerOutcome::Ignored(IgnoreReason::Hidden),
        EnvelopeState::Opened => PointerOutcome::Ignored(IgnoreReason::AlreadyOpened),
        EnvelopeState::Moving if state.focus.is_some() => {
            PointerOutcome::Ignored(IgnoreReason::OtherFocused)
        }
        EnvelopeState::Moving => zoom_in(state, id).unwrap_or_else(rejected),
        EnvelopeState::Zoomed if !engaged => PointerOutcome::Ignored(IgnoreReason::OtherFocused),
        EnvelopeState::Zoomed => open(state, id).unwrap_or_else(rejected),
    }
}

/// Pointer-up delivered to the overlay element
///
/// For hosts that route events per element; the browser build sends every
/// pointer-up through [`pointer_up`] instead. The overlay sits behind the
/// enlarged envelope but can still receive the event, so a point inside the
/// envelope's rect counts as an envelope click.
pub fn overlay_pointer_up(state: &mut GameState, point: Vec2, now_ms: f64) -> PointerOutcome {
    state.observe_time(now_ms);
    if state.phase == GamePhase::Finale {
        return PointerOutcome::Ignored(IgnoreReason::Finale);
    }

    if let Some(id) = state.focus {
        if state.focused_rect().is_some_and(|r| r.contains(point)) {
            return envelope_pointer_up(state, id, now_ms);
        }
    }
    dismiss(state)
}

/// Catch a moving envelope
fn zoom_in(state: &mut GameState, id: EnvelopeId) -> Result<PointerOutcome, TransitionError> {
    debug_assert!(state.focus.is_none());
    let env = state.envelope_mut(id).ok_or(TransitionError::NotVisible(id))?;
    env.apply(Transition::Zoom)?;

    state.paused = true;
    state.focus = Some(id);

    log::debug!("{id} zoomed");
    Ok(PointerOutcome::Zoomed(id))
}

/// Unfold the focused envelope's letter
fn open(state: &mut GameState, id: EnvelopeId) -> Result<PointerOutcome, TransitionError> {
    if state.focus != Some(id) {
        return Err(TransitionError::NotFocused(id));
    }

    let phase = state.phase;
    let env = state.envelope_mut(id).ok_or(TransitionError::NotVisible(id))?;
    env.apply(Transition::Open)?;

    let first_read = phase == GamePhase::Phase1 && !env.has_been_read;
    if first_read {
        env.has_been_read = true;
    }

    // Reopened while the paper was still folding back
    if let Some(handle) = state.pending_zoom_out.take() {
        state.scheduler.cancel(handle);
        log::debug!("{id} reopened, pending zoom-out cancelled");
    }

    if first_read {
        state.read_count += 1;
        log::info!(
            "{id} read ({}/{})",
            state.read_count,
            state.settings.read_threshold
        );
    }

    if phase == GamePhase::Boss {
        phase::schedule_finale(state);
    }

    Ok(PointerOutcome::Opened(id))
}

/// Dismiss the focused envelope (overlay click outside it)
pub fn dismiss(state: &mut GameState) -> PointerOutcome {
    let Some(id) = state.focus else {
        return PointerOutcome::Ignored(IgnoreReason::NothingFocused);
    };
    let Some(env_state) = state.envelope(id).map(|e| e.state) else {
        return PointerOutcome::Ignored(IgnoreReason::NothingFocused);
    };

    match env_state {
        EnvelopeState::Opened => {
            let closed = state
                .envelope_mut(id)
                .ok_or(TransitionError::NotVisible(id))
                .and_then(|env| env.apply(Transition::Close));
            if let Err(e) = closed {
                return rejected(e);
            }
            if let Some(handle) = state.pending_zoom_out.take() {
                state.scheduler.cancel(handle);
            }
            let delay = state.settings.timings.close_animation_ms;
            let now = state.now_ms;
            state.pending_zoom_out = Some(state.scheduler.schedule(now, delay, Task::ZoomOut(id)));
            log::debug!("{id} closing");
            PointerOutcome::Closing(id)
        }
        EnvelopeState::Zoomed => match zoom_out(state, id) {
            Ok(()) => PointerOutcome::Released(id),
            Err(e) => rejected(e),
        },
        _ => PointerOutcome::Ignored(IgnoreReason::NothingFocused),
    }
}

/// Put the focused envelope back into play
///
/// Motion stays frozen for the grace period; see [`release_pause`].
pub fn zoom_out(state: &mut GameState, id: EnvelopeId) -> Result<(), TransitionError> {
    if state.focus != Some(id) {
        return Err(TransitionError::NotFocused(id));
    }

    let speed = state.release_speed();
    let vel = random_diagonal(&mut state.rng, speed);
    let env = state.envelope_mut(id).ok_or(TransitionError::NotVisible(id))?;
    env.apply(Transition::Release)?;
    env.vel = vel;

    state.focus = None;
    if let Some(handle) = state.pending_zoom_out.take() {
        state.scheduler.cancel(handle);
    }
    if let Some(handle) = state.pending_release.take() {
        state.scheduler.cancel(handle);
    }
    let delay = state.settings.timings.pause_grace_ms;
    let now = state.now_ms;
    state.pending_release = Some(state.scheduler.schedule(now, delay, Task::ReleasePause));

    log::debug!("{id} released");
    Ok(())
}

/// End of the grace period: resume motion, or summon the boss once enough
/// letters have been read
pub fn release_pause(state: &mut GameState) -> Result<(), TransitionError> {
    state.pending_release = None;
    state.paused = false;

    if state.phase == GamePhase::Phase1 && state.read_count >= state.settings.read_threshold {
        phase::start_intro(state)?;
    }
    Ok(())
}
