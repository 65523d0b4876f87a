//! Envelope-vs-envelope collisions
//!
//! Not physics: equal implicit mass, so colliding envelopes simply trade
//! velocities and get pushed a couple of pixels apart so the same pair is
//! not re-detected next frame.

use glam::Vec2;

use super::state::{Envelope, GamePhase, GameState};

/// Check whether two same-sized envelopes overlap
#[inline]
pub fn envelopes_overlap(a: &Envelope, b: &Envelope, size: Vec2) -> bool {
    a.rect(size).overlaps(&b.rect(size))
}

/// Swap velocities and nudge both envelopes away from each other
///
/// Ties (equal coordinate) push `a` toward +axis and `b` toward -axis.
pub fn resolve_pair(a: &mut Envelope, b: &mut Envelope, nudge: f32) {
    std::mem::swap(&mut a.vel, &mut b.vel);

    if a.pos.x < b.pos.x {
        a.pos.x -= nudge;
        b.pos.x += nudge;
    } else {
        a.pos.x += nudge;
        b.pos.x -= nudge;
    }

    if a.pos.y < b.pos.y {
        a.pos.y -= nudge;
        b.pos.y += nudge;
    } else {
        a.pos.y += nudge;
        b.pos.y -= nudge;
    }
}

/// Resolve all overlapping pairs of ordinary envelopes (phase1 only)
///
/// Nudged positions stay inside the viewport, so the frame drawn after a
/// collision at a wall is still on screen. Returns the number of collisions
/// handled this frame.
pub fn resolve_collisions(state: &mut GameState) -> usize {
    if state.phase != GamePhase::Phase1 {
        return 0;
    }

    let size = state.envelope_size;
    let nudge = state.settings.separation_nudge;
    let max = (state.viewport.size() - size).max(Vec2::ZERO);
    let mut hits = 0;

    for i in 0..state.envelopes.len() {
        for j in (i + 1)..state.envelopes.len() {
            let (left, right) = state.envelopes.split_at_mut(j);
            let a = &mut left[i];
            let b = &mut right[0];
            if envelopes_overlap(a, b, size) {
                resolve_pair(a, b, nudge);
                a.pos = a.pos.clamp(Vec2::ZERO, max);
                b.pos = b.pos.clamp(Vec2::ZERO, max);
                hits += 1;
            }
        }
    }

    hits
}
