//! The ember particle.
//!
//! A particle is a plain value: it is constructed, mutated in place every
//! frame, and overwritten when it leaves the surface. The pool that owns it
//! never grows or shrinks between rebuilds.

use rand::Rng;

use crate::color::Hsla;
use crate::config::{EmberConfig, Span};
use crate::render::Glow;

/// Where a freshly constructed particle is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnPlacement {
    /// Anywhere on the surface (initial population).
    Scattered,
    /// In the band near and below the bottom edge (respawn).
    BottomBand,
}

/// A single ember.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Horizontal position (logical px).
    pub x: f32,
    /// Vertical position (logical px, down is positive).
    pub y: f32,
    /// Core radius (logical px).
    pub radius: f32,
    /// Upward speed per frame.
    pub vy: f32,
    /// Lateral speed per frame.
    pub vx: f32,
    /// Opacity multiplier, fixed for the particle's lifetime.
    pub life: f32,
    /// Opacity multiplier, jittered every frame.
    pub flicker: f32,
    /// Hue in degrees.
    pub hue: f32,
    /// Saturation in percent.
    pub saturation: f32,
    /// Lightness in percent.
    pub lightness: f32,
}

impl Particle {
    /// Constructs a particle for a `width` × `height` surface.
    pub fn spawn<R: Rng + ?Sized>(
        config: &EmberConfig,
        width: f32,
        height: f32,
        placement: SpawnPlacement,
        rng: &mut R,
    ) -> Self {
        let x = Span::new(0.0, width).sample(rng);
        let y = match placement {
            SpawnPlacement::Scattered => Span::new(0.0, height).sample(rng),
            SpawnPlacement::BottomBand => respawn_band(config, height).sample(rng),
        };

        Self {
            x,
            y,
            radius: config.radius.sample(rng),
            vy: config.vy.sample(rng),
            vx: config.vx.sample(rng),
            life: config.life.sample(rng),
            flicker: config.flicker_band.clamp(config.flicker_initial.sample(rng)),
            hue: config.hue.sample(rng),
            saturation: config.saturation.sample(rng),
            lightness: config.lightness.sample(rng),
        }
    }

    /// Drifts one frame: straight up, sideways with a position-dependent sway.
    #[inline]
    pub fn advance(&mut self, config: &EmberConfig) {
        self.y -= self.vy;
        self.x += self.vx + ((self.y + self.x) * config.sway_frequency).sin() * config.sway_amplitude;
    }

    /// Jitters the flicker and clamps it back into the band.
    #[inline]
    pub fn jitter<R: Rng + ?Sized>(&mut self, config: &EmberConfig, rng: &mut R) {
        let step = config.flicker_step;
        if step > 0.0 {
            self.flicker += rng.gen_range(-step..step);
        }
        self.flicker = config.flicker_band.clamp(self.flicker);
    }

    /// True once the particle is above the top margin or beyond a side margin.
    #[inline]
    #[must_use]
    pub fn has_exited(&self, config: &EmberConfig, width: f32) -> bool {
        self.y < -config.top_margin
            || self.x < -config.side_margin
            || self.x > width + config.side_margin
    }

    /// Center opacity of the glow.
    #[inline]
    #[must_use]
    pub fn opacity(&self, base_alpha: f32) -> f32 {
        base_alpha * self.life * self.flicker
    }

    /// The glow this particle paints this frame.
    #[must_use]
    pub fn glow(&self, config: &EmberConfig) -> Glow {
        Glow {
            x: self.x,
            y: self.y,
            radius: self.radius * config.glow_radius_multiplier,
            color: Hsla::new(
                self.hue,
                self.saturation,
                self.lightness,
                self.opacity(config.base_alpha),
            ),
        }
    }
}

/// Vertical range used for respawned particles.
#[must_use]
pub fn respawn_band(config: &EmberConfig, height: f32) -> Span {
    Span::new(height * config.respawn_band_start, height + config.respawn_overshoot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_scattered_spawn_inside_surface() {
        let config = EmberConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..500 {
            let p = Particle::spawn(&config, 400.0, 300.0, SpawnPlacement::Scattered, &mut rng);
            assert!((0.0..400.0).contains(&p.x));
            assert!((0.0..300.0).contains(&p.y));
            assert!(config.flicker_band.contains(p.flicker));
            assert!(config.hue.contains(p.hue));
        }
    }

    #[test]
    fn test_bottom_band_spawn() {
        let config = EmberConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..500 {
            let p = Particle::spawn(&config, 400.0, 300.0, SpawnPlacement::BottomBand, &mut rng);
            assert!((195.0..360.0).contains(&p.y), "y = {}", p.y);
        }
    }

    #[test]
    fn test_advance_moves_up() {
        let config = EmberConfig {
            sway_amplitude: 0.0,
            ..EmberConfig::default()
        };
        let mut p = Particle::spawn(&config, 400.0, 300.0, SpawnPlacement::Scattered, &mut ChaCha8Rng::seed_from_u64(9));
        let (x0, y0) = (p.x, p.y);
        p.advance(&config);
        assert!((p.y - (y0 - p.vy)).abs() < 1e-5);
        assert!((p.x - (x0 + p.vx)).abs() < 1e-5);
    }

    #[test]
    fn test_sway_uses_advanced_y() {
        let config = EmberConfig::default();
        let mut p = Particle::spawn(&config, 400.0, 300.0, SpawnPlacement::Scattered, &mut ChaCha8Rng::seed_from_u64(4));
        let (x0, y0) = (p.x, p.y);
        p.advance(&config);
        let y1 = y0 - p.vy;
        let expected = x0 + p.vx + ((y1 + x0) * config.sway_frequency).sin() * config.sway_amplitude;
        assert!((p.x - expected).abs() < 1e-5);
    }

    #[test]
    fn test_exit_boundaries() {
        let config = EmberConfig::default();
        let mut p = Particle::spawn(&config, 400.0, 300.0, SpawnPlacement::Scattered, &mut ChaCha8Rng::seed_from_u64(5));
        p.x = 200.0;
        p.y = -29.0;
        assert!(!p.has_exited(&config, 400.0));
        p.y = -31.0;
        assert!(p.has_exited(&config, 400.0));
        p.y = 100.0;
        p.x = -51.0;
        assert!(p.has_exited(&config, 400.0));
        p.x = 451.0;
        assert!(p.has_exited(&config, 400.0));
        p.x = 449.0;
        assert!(!p.has_exited(&config, 400.0));
    }

    #[test]
    fn test_glow_opacity_and_radius() {
        let config = EmberConfig::default();
        let mut p = Particle::spawn(&config, 400.0, 300.0, SpawnPlacement::Scattered, &mut ChaCha8Rng::seed_from_u64(6));
        p.life = 0.5;
        p.flicker = 0.8;
        p.radius = 1.5;
        let glow = p.glow(&config);
        assert!((glow.color.a - 0.16 * 0.5 * 0.8).abs() < 1e-6);
        assert!((glow.radius - 9.0).abs() < 1e-6);
    }
}
