//! Deterministic simulation module
//!
//! All game logic lives here. This module must be pure and deterministic:
//! - Host time comes in as an argument, never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (ordinary envelopes by index, gold last)
//! - No DOM, canvas or platform dependencies

pub mod collision;
pub mod confetti;
pub mod geom;
pub mod interaction;
pub mod motion;
pub mod phase;
pub mod schedule;
pub mod state;
pub mod tick;

pub use collision::{envelopes_overlap, resolve_collisions, resolve_pair};
pub use confetti::{Confetti, Particle};
pub use geom::Rect;
pub use interaction::{
    IgnoreReason, PointerOutcome, dismiss, envelope_pointer_up, hit_test, overlay_pointer_up,
    pointer_up,
};
pub use schedule::{Scheduler, Task, TimerHandle};
pub use state::{
    Envelope, EnvelopeId, EnvelopeState, GamePhase, GameState, Transition, TransitionError,
    Viewport,
};
pub use tick::{resize, tick};
