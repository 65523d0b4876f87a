//! Game tuning
//!
//! Every knob has a default from [`crate::consts`]. On the web the page can
//! override any subset through a JSON `data-tuning` attribute on `<body>`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Rejected tuning overrides
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value: {0}")]
    Invalid(String),
}

/// Delays used by the choreography (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub close_animation_ms: f64,
    pub pause_grace_ms: f64,
    pub intro_hold_ms: f64,
    pub intro_fade_ms: f64,
    pub finale_delay_ms: f64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            close_animation_ms: CLOSE_ANIMATION_MS,
            pause_grace_ms: PAUSE_GRACE_MS,
            intro_hold_ms: INTRO_HOLD_MS,
            intro_fade_ms: INTRO_FADE_MS,
            finale_delay_ms: FINALE_DELAY_MS,
        }
    }
}

/// Confetti spawn ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfettiSettings {
    pub count: usize,
    pub min_size: f32,
    pub max_size: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Rotation added per frame (radians)
    pub spin: f32,
    /// Where wrapped pieces re-enter (just above the top edge)
    pub wrap_y: f32,
}

impl Default for ConfettiSettings {
    fn default() -> Self {
        Self {
            count: CONFETTI_COUNT,
            min_size: 5.0,
            max_size: 15.0,
            min_speed: 2.0,
            max_speed: 7.0,
            spin: 0.1,
            wrap_y: -20.0,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base speed as a fraction of viewport width
    pub speed_scale: f32,
    pub envelope_width_fraction: f32,
    pub envelope_height_fraction: f32,
    pub gold_speed_multiplier: f32,
    /// Reads needed to summon the boss
    pub read_threshold: u32,
    /// Focused envelope scale
    pub zoom_scale: f32,
    pub separation_nudge: f32,
    pub timings: Timings,
    pub confetti: ConfettiSettings,
    /// Fixed RNG seed (random per page load when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed_scale: SPEED_SCALE,
            envelope_width_fraction: ENVELOPE_WIDTH_FRACTION,
            envelope_height_fraction: ENVELOPE_HEIGHT_FRACTION,
            gold_speed_multiplier: GOLD_SPEED_MULTIPLIER,
            read_threshold: READ_THRESHOLD,
            zoom_scale: ZOOM_SCALE,
            separation_nudge: SEPARATION_NUDGE,
            timings: Timings::default(),
            confetti: ConfettiSettings::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would break layout or motion
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("speed_scale", self.speed_scale),
            ("envelope_width_fraction", self.envelope_width_fraction),
            ("envelope_height_fraction", self.envelope_height_fraction),
            ("gold_speed_multiplier", self.gold_speed_multiplier),
            ("zoom_scale", self.zoom_scale),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.envelope_width_fraction > 1.0 || self.envelope_height_fraction > 1.0 {
            return Err(SettingsError::Invalid(
                "envelope fractions must not exceed 1.0".to_string(),
            ));
        }
        // Only distinct envelopes count as read
        let max_reads = ENVELOPE_COUNT as u32;
        if self.read_threshold == 0 || self.read_threshold > max_reads {
            return Err(SettingsError::Invalid(format!(
                "read_threshold must be in 1..={max_reads}, got {}",
                self.read_threshold
            )));
        }
        let c = &self.confetti;
        if c.min_size > c.max_size || c.min_speed > c.max_speed {
            return Err(SettingsError::Invalid(
                "confetti ranges must have min <= max".to_string(),
            ));
        }
        Ok(())
    }

    /// Attribute on `<body>` holding JSON overrides
    #[allow(dead_code)]
    const TUNING_ATTRIBUTE: &'static str = "data-tuning";

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
            .and_then(|b| b.get_attribute(Self::TUNING_ATTRIBUTE));

        if let Some(json) = json {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded tuning from {}", Self::TUNING_ATTRIBUTE);
                    return settings;
                }
                Err(e) => log::warn!("Ignoring tuning overrides: {e}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
