//! # Ember Field
//!
//! Owns the particle pool and the cached surface geometry.
//!
//! ```text
//! initialize/resize ──► rebuild pool (Scattered)
//!        │
//!  update (per frame):
//!    Clear → SetBlend(Lighter) → for each particle:
//!        advance → jitter → exited? respawn(BottomBand) → Glow
//!    → SetBlend(SourceOver)
//! ```
//!
//! The pool size is fixed between rebuilds. Randomness is injected, so a
//! seeded generator reproduces a field exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::EmberConfig;
use crate::error::EffectsResult;
use crate::geometry::{HostMetrics, SurfaceGeometry, ViewportClass};
use crate::particle::{Particle, SpawnPlacement};
use crate::render::{BlendMode, DrawCommand, FrameCommands};

/// Outcome of a resize request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// The pool was rebuilt with `count` particles.
    Rebuilt {
        /// New pool size.
        count: usize,
    },
    /// The container was not laid out (or the field is disposed); nothing changed.
    Skipped,
}

/// Counters kept by the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Update steps run.
    pub frames: u64,
    /// Particles respawned during the last update.
    pub respawns_last_frame: u32,
    /// Particles respawned since creation.
    pub total_respawns: u64,
    /// Pool rebuilds since creation.
    pub rebuilds: u64,
}

/// The ember particle field.
#[derive(Debug, Clone)]
pub struct EmberField<R = ChaCha8Rng> {
    config: EmberConfig,
    reduced_motion: bool,
    geometry: SurfaceGeometry,
    particles: Vec<Particle>,
    rng: R,
    stats: FieldStats,
    disposed: bool,
}

impl EmberField<ChaCha8Rng> {
    /// Creates a field seeded from `config.seed`, or from the clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: EmberConfig, reduced_motion: bool) -> EffectsResult<Self> {
        let seed = config.seed.unwrap_or_else(clock_seed);
        Self::with_rng(config, reduced_motion, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> EmberField<R> {
    /// Creates a field driven by the given generator.
    ///
    /// The pool stays empty until [`initialize`](Self::initialize).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn with_rng(config: EmberConfig, reduced_motion: bool, rng: R) -> EffectsResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reduced_motion,
            geometry: SurfaceGeometry::EMPTY,
            particles: Vec::new(),
            rng,
            stats: FieldStats::default(),
            disposed: false,
        })
    }

    /// First sizing of the field. Same contract as [`resize`](Self::resize).
    pub fn initialize(&mut self, metrics: &HostMetrics) -> ResizeOutcome {
        self.resize(metrics)
    }

    /// Re-reads the host and rebuilds the pool from scratch.
    ///
    /// A container that is not laid out leaves everything as it was.
    pub fn resize(&mut self, metrics: &HostMetrics) -> ResizeOutcome {
        if self.disposed {
            return ResizeOutcome::Skipped;
        }
        if !metrics.is_laid_out() {
            debug!(
                width = metrics.container_width,
                height = metrics.container_height,
                "ember container not laid out, resize skipped"
            );
            return ResizeOutcome::Skipped;
        }

        self.geometry = SurfaceGeometry::resolve(metrics, self.config.dpr_min, self.config.dpr_max);
        let class = ViewportClass::classify(metrics.viewport_width, self.config.narrow_breakpoint);
        let count = self.config.particle_count(self.reduced_motion, class);
        self.rebuild(count);

        ResizeOutcome::Rebuilt { count }
    }

    fn rebuild(&mut self, count: usize) {
        let (width, height) = (self.geometry.width, self.geometry.height);
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            self.particles.push(Particle::spawn(
                &self.config,
                width,
                height,
                SpawnPlacement::Scattered,
                &mut self.rng,
            ));
        }
        self.stats.rebuilds += 1;

        debug!(
            count,
            width,
            height,
            scale = self.geometry.scale,
            "ember pool rebuilt"
        );
    }

    /// Advances every particle one frame and records the frame's draw commands.
    pub fn update(&mut self, frame: &mut FrameCommands) {
        frame.begin_frame();
        frame.push(DrawCommand::Clear);
        frame.push(DrawCommand::SetBlend(BlendMode::Lighter));

        let (width, height) = (self.geometry.width, self.geometry.height);
        let mut respawns = 0u32;
        for particle in &mut self.particles {
            particle.advance(&self.config);
            particle.jitter(&self.config, &mut self.rng);

            if particle.has_exited(&self.config, width) {
                *particle = Particle::spawn(
                    &self.config,
                    width,
                    height,
                    SpawnPlacement::BottomBand,
                    &mut self.rng,
                );
                respawns += 1;
            }

            frame.push(DrawCommand::Glow(particle.glow(&self.config)));
        }

        frame.push(DrawCommand::SetBlend(BlendMode::SourceOver));

        self.stats.frames += 1;
        self.stats.respawns_last_frame = respawns;
        self.stats.total_respawns += u64::from(respawns);
    }

    /// Drops the pool; later resizes are ignored.
    pub fn dispose(&mut self) {
        self.particles = Vec::new();
        self.geometry = SurfaceGeometry::EMPTY;
        self.disposed = true;
    }

    /// The pool, in update order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access to pool members. The pool size cannot change through it.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Number of particles in the pool.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Geometry from the last successful resize.
    #[must_use]
    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &EmberConfig {
        &self.config
    }

    /// Whether reduced motion was requested at creation.
    #[must_use]
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Counters.
    #[must_use]
    pub fn stats(&self) -> FieldStats {
        self.stats
    }
}

fn clock_seed() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map_or(0x00E3_B3E5, |elapsed| elapsed.as_nanos() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(config: EmberConfig, reduced_motion: bool) -> EmberField {
        EmberField::with_rng(config, reduced_motion, ChaCha8Rng::seed_from_u64(42)).unwrap()
    }

    #[test]
    fn test_pool_empty_until_initialized() {
        let field = seeded(EmberConfig::default(), false);
        assert_eq!(field.particle_count(), 0);
        assert_eq!(field.stats().rebuilds, 0);
    }

    #[test]
    fn test_initialize_uses_wide_count() {
        let mut field = seeded(EmberConfig::default(), false);
        let outcome = field.initialize(&HostMetrics::new(800.0, 400.0, 1.0, 1280.0));
        assert_eq!(outcome, ResizeOutcome::Rebuilt { count: 90 });
        assert_eq!(field.particle_count(), 90);
    }

    #[test]
    fn test_narrow_viewport_reduces_density() {
        let mut field = seeded(EmberConfig::default(), false);
        field.initialize(&HostMetrics::new(360.0, 400.0, 3.0, 360.0));
        assert_eq!(field.particle_count(), 45);
    }

    #[test]
    fn test_zero_size_skips_and_keeps_pool() {
        let mut field = seeded(EmberConfig::default(), false);
        field.initialize(&HostMetrics::new(800.0, 400.0, 1.0, 1280.0));
        let before = field.particles().to_vec();

        let outcome = field.resize(&HostMetrics::new(0.0, 0.0, 1.0, 1280.0));
        assert_eq!(outcome, ResizeOutcome::Skipped);
        assert_eq!(field.particles(), before.as_slice());
        assert!((field.geometry().width - 800.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_update_records_one_glow_per_particle() {
        let mut field = seeded(EmberConfig::default(), false);
        field.initialize(&HostMetrics::new(400.0, 300.0, 1.0, 1280.0));
        let mut frame = FrameCommands::default();
        field.update(&mut frame);

        let commands = frame.commands();
        assert_eq!(commands[0], DrawCommand::Clear);
        assert_eq!(commands[1], DrawCommand::SetBlend(BlendMode::Lighter));
        assert_eq!(commands[commands.len() - 1], DrawCommand::SetBlend(BlendMode::SourceOver));
        assert_eq!(frame.glows().count(), 90);
    }

    #[test]
    fn test_dispose_blocks_resize() {
        let mut field = seeded(EmberConfig::default(), false);
        field.initialize(&HostMetrics::new(400.0, 300.0, 1.0, 1280.0));
        field.dispose();
        assert!(field.is_disposed());
        assert_eq!(field.particle_count(), 0);
        assert_eq!(
            field.resize(&HostMetrics::new(400.0, 300.0, 1.0, 1280.0)),
            ResizeOutcome::Skipped
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EmberConfig {
            base_alpha: 4.0,
            ..EmberConfig::default()
        };
        assert!(EmberField::new(config, false).is_err());
    }
}
