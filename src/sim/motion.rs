//! Envelope motion: constant velocity with wall bounces
//!
//! Velocities are in px per frame. Envelope size follows the viewport's
//! smaller dimension, so everything scales with the window.

use glam::Vec2;
use rand::Rng;

use super::state::{Envelope, EnvelopeState, GamePhase, GameState, Viewport};
use crate::settings::Settings;

/// Envelope size for a viewport
pub fn envelope_size(settings: &Settings, viewport: Viewport) -> Vec2 {
    let vmin = viewport.min_dimension();
    Vec2::new(
        vmin * settings.envelope_width_fraction,
        vmin * settings.envelope_height_fraction,
    )
}

/// Random diagonal direction scaled to `speed`
pub fn random_diagonal<R: Rng>(rng: &mut R, speed: f32) -> Vec2 {
    let sx = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let sy = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    Vec2::new(sx, sy) * speed
}

/// Lay everything out again (page load and window resize)
///
/// Ordinary envelopes get a fresh random position and direction. The gold
/// envelope keeps its position; its velocity resets to the boss speed.
pub fn reinitialize(state: &mut GameState, viewport: Viewport) {
    state.viewport = viewport;
    state.envelope_size = envelope_size(&state.settings, viewport);

    let base_speed = state.base_speed();
    let bounds = (viewport.size() - state.envelope_size).max(Vec2::ZERO);

    for i in 0..state.envelopes.len() {
        let rng = state.rng();
        let pos = Vec2::new(rng.random::<f32>() * bounds.x, rng.random::<f32>() * bounds.y);
        let vel = random_diagonal(rng, base_speed);
        let env = &mut state.envelopes[i];
        env.pos = pos;
        env.vel = vel;
    }

    state.gold.vel = Vec2::splat(base_speed * state.settings.gold_speed_multiplier);

    log::debug!(
        "Layout {}x{}: envelope {}x{}, base speed {:.3}",
        viewport.width,
        viewport.height,
        state.envelope_size.x,
        state.envelope_size.y,
        base_speed
    );
}

/// Advance one envelope by one frame and bounce it off the viewport edges
pub fn advance(env: &mut Envelope, size: Vec2, viewport: Viewport) {
    env.pos += env.vel;

    let max = (viewport.size() - size).max(Vec2::ZERO);

    if env.pos.x >= max.x {
        env.vel.x = -env.vel.x.abs();
        env.pos.x = max.x;
    } else if env.pos.x <= 0.0 {
        env.vel.x = env.vel.x.abs();
        env.pos.x = 0.0;
    }

    if env.pos.y >= max.y {
        env.vel.y = -env.vel.y.abs();
        env.pos.y = max.y;
    } else if env.pos.y <= 0.0 {
        env.vel.y = env.vel.y.abs();
        env.pos.y = 0.0;
    }
}

/// Whether the motion engine runs this frame
pub fn motion_active(state: &GameState) -> bool {
    !state.paused && matches!(state.phase, GamePhase::Phase1 | GamePhase::Boss)
}

/// Move the active envelopes: the gold one alone in the boss phase,
/// the ordinary ones otherwise
pub fn step(state: &mut GameState) {
    if !motion_active(state) {
        return;
    }

    let size = state.envelope_size;
    let viewport = state.viewport;

    if state.phase == GamePhase::Boss {
        if state.gold.state != EnvelopeState::Hidden {
            advance(&mut state.gold, size, viewport);
        }
    } else {
        for env in &mut state.envelopes {
            advance(env, size, viewport);
        }
    }
}
