//! Rendering module
//!
//! Envelopes are DOM elements positioned from a per-frame [`FrameView`];
//! the finale confetti is drawn on a 2D canvas.

pub mod confetti;
pub mod view;

pub use confetti::{ConfettiCanvas, draw_confetti};
pub use view::{EnvelopeView, FrameView, OverlayView};
