//! Finale confetti
//!
//! Seeded once when the finale starts, then falls forever: pieces that leave
//! the bottom edge re-enter just above the top at a new random column.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Viewport;
use crate::settings::ConfettiSettings;

/// A confetti piece
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    /// Center position
    pub pos: Vec2,
    /// Hue in degrees (saturation and lightness are fixed)
    pub hue: f32,
    /// Square side length
    pub size: f32,
    /// Fall speed in px per frame
    pub speed: f32,
    /// Rotation in radians
    pub angle: f32,
}

impl Particle {
    /// CSS fill colour
    pub fn color(&self) -> String {
        format!("hsl({}, 100%, 50%)", self.hue)
    }
}

/// The finale particle field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Confetti {
    pub particles: Vec<Particle>,
    /// Drawing surface size
    pub bounds: Viewport,
    pub settings: ConfettiSettings,
}

impl Confetti {
    /// Spawn `settings.count` pieces; starting heights span one screen above the top
    pub fn seed<R: Rng>(rng: &mut R, bounds: Viewport, settings: ConfettiSettings) -> Self {
        let particles = (0..settings.count)
            .map(|_| Particle {
                pos: Vec2::new(
                    rng.random::<f32>() * bounds.width,
                    rng.random::<f32>() * bounds.height - bounds.height,
                ),
                hue: rng.random::<f32>() * 360.0,
                size: lerp(settings.min_size, settings.max_size, rng.random::<f32>()),
                speed: lerp(settings.min_speed, settings.max_speed, rng.random::<f32>()),
                angle: rng.random::<f32>() * 6.2,
            })
            .collect();

        Self {
            particles,
            bounds,
            settings,
        }
    }

    /// Advance one frame: fall, spin, wrap
    pub fn step<R: Rng>(&mut self, rng: &mut R) {
        for p in &mut self.particles {
            p.pos.y += p.speed;
            p.angle += self.settings.spin;

            if p.pos.y > self.bounds.height {
                p.pos.y = self.settings.wrap_y;
                p.pos.x = rng.random::<f32>() * self.bounds.width;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
