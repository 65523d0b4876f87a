//! Envelope Chase - catch the bouncing envelopes, read every letter,
//! then chase down the gold one
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, envelope states, phases)
//! - `renderer`: Per-frame view model and confetti drawing
//! - `platform`: Browser DOM glue (wasm32 only)
//! - `settings`: Data-driven tuning

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{ConfettiSettings, Settings, SettingsError, Timings};

/// Game configuration constants (defaults for [`Settings`])
pub mod consts {
    /// Base speed as a fraction of viewport width, in px per frame
    pub const SPEED_SCALE: f32 = 0.0015;
    /// Gold envelope speed relative to the base speed
    pub const GOLD_SPEED_MULTIPLIER: f32 = 2.5;

    /// Envelope size as a fraction of the viewport's smaller dimension
    pub const ENVELOPE_WIDTH_FRACTION: f32 = 0.22;
    pub const ENVELOPE_HEIGHT_FRACTION: f32 = 0.14;

    /// Number of ordinary envelopes
    pub const ENVELOPE_COUNT: usize = 5;
    /// Letters that must be read before the boss shows up
    pub const READ_THRESHOLD: u32 = 5;

    /// Focused envelope scale relative to its moving size
    pub const ZOOM_SCALE: f32 = 2.5;
    /// Focused envelope never exceeds this share of the viewport
    pub const MAX_FOCUS_FRACTION: f32 = 0.9;

    /// Pixels each envelope is pushed apart after a collision
    pub const SEPARATION_NUDGE: f32 = 2.0;

    /// Paper close animation before zooming out
    pub const CLOSE_ANIMATION_MS: f64 = 600.0;
    /// Grace period after zoom-out before motion resumes
    pub const PAUSE_GRACE_MS: f64 = 500.0;
    /// Boss intro panel hold time
    pub const INTRO_HOLD_MS: f64 = 3000.0;
    /// Boss intro fade-out time
    pub const INTRO_FADE_MS: f64 = 1000.0;
    /// Delay between opening the gold envelope and the finale
    pub const FINALE_DELAY_MS: f64 = 3000.0;

    /// Confetti pieces spawned at finale entry
    pub const CONFETTI_COUNT: usize = 150;
}
