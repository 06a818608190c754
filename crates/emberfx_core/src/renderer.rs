//! Ember Renderer - the field bound to a surface and a frame loop.
//!
//! ```text
//! host                       EmberRenderer
//! ────                       ─────────────
//! mount ──────────────────►  initialize(metrics)   pool + surface sized
//! start ──────────────────►  start()               Continue / Halt
//! display refresh ────────►  frame()               update + submit
//! window resize ──────────►  signal_resize(now)
//! quiet period elapsed ───►  poll_resize(now, m)   at most one rebuild
//! unmount ────────────────►  dispose()
//! ```
//!
//! With reduced motion the surface is cleared once and `start` returns
//! [`FrameRequest::Halt`]: not a single animation frame is requested.

use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use web_time::Instant;

use crate::config::EmberConfig;
use crate::error::EffectsResult;
use crate::field::{EmberField, ResizeOutcome};
use crate::geometry::HostMetrics;
use crate::render::{FrameCommands, Surface};
use crate::schedule::{FrameLoop, FrameRequest, ResizeDebouncer};

/// Particle field renderer driving a [`Surface`].
pub struct EmberRenderer<S, R = ChaCha8Rng> {
    field: EmberField<R>,
    surface: S,
    commands: FrameCommands,
    frame_loop: FrameLoop,
    debouncer: ResizeDebouncer,
}

impl<S: Surface> EmberRenderer<S> {
    /// Creates a renderer with a field seeded from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn new(config: EmberConfig, reduced_motion: bool, surface: S) -> EffectsResult<Self> {
        Ok(Self::with_field(EmberField::new(config, reduced_motion)?, surface))
    }
}

impl<S: Surface, R: Rng> EmberRenderer<S, R> {
    /// Binds an existing field to a surface.
    #[must_use]
    pub fn with_field(field: EmberField<R>, surface: S) -> Self {
        let config = field.config();
        let frame_loop = FrameLoop::new(config.frame_budget_us);
        let debouncer = ResizeDebouncer::new(Duration::from_millis(config.resize_debounce_ms));
        let commands = FrameCommands::with_capacity(config.count.max(config.narrow_count));
        Self {
            field,
            surface,
            commands,
            frame_loop,
            debouncer,
        }
    }

    /// Sizes the field and the surface to the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects the new geometry.
    pub fn initialize(&mut self, metrics: &HostMetrics) -> EffectsResult<ResizeOutcome> {
        let outcome = self.field.initialize(metrics);
        if outcome != ResizeOutcome::Skipped {
            self.surface.configure(self.field.geometry())?;
            self.surface.clear();
        }
        Ok(outcome)
    }

    /// Resizes immediately, bypassing the debouncer.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects the new geometry.
    pub fn resize(&mut self, metrics: &HostMetrics) -> EffectsResult<ResizeOutcome> {
        self.initialize(metrics)
    }

    /// Starts the animation loop.
    ///
    /// Returns whether the host should request the first frame.
    pub fn start(&mut self) -> FrameRequest {
        if self.field.reduced_motion() {
            self.surface.clear();
            debug!("reduced motion requested, ember loop not started");
            return FrameRequest::Halt;
        }
        if self.field.is_disposed() || !self.frame_loop.start() {
            return FrameRequest::Halt;
        }
        let geometry = self.field.geometry();
        info!(
            particles = self.field.particle_count(),
            width = geometry.width,
            height = geometry.height,
            scale = geometry.scale,
            "ember loop started"
        );
        FrameRequest::Continue
    }

    /// One display-refresh step. Does nothing unless the loop is running.
    pub fn frame(&mut self) -> FrameRequest {
        if !self.frame_loop.is_running() {
            return FrameRequest::Halt;
        }
        let started = Instant::now();
        self.update();
        self.frame_loop.record_frame(started.elapsed())
    }

    /// Advances the field one step and paints it, ignoring the loop state.
    pub fn update(&mut self) {
        self.field.update(&mut self.commands);
        self.surface.submit(&self.commands);
    }

    /// Notes a resize notification at host time `now`.
    pub fn signal_resize(&mut self, now: Duration) {
        if !self.field.is_disposed() {
            self.debouncer.signal(now);
        }
    }

    /// Rebuilds once the resize burst has gone quiet.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects the new geometry.
    pub fn poll_resize(
        &mut self,
        now: Duration,
        metrics: &HostMetrics,
    ) -> EffectsResult<Option<ResizeOutcome>> {
        if self.debouncer.poll(now) {
            self.initialize(metrics).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Rebuilds for a pending burst whose delay the host timer already waited out.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface rejects the new geometry.
    pub fn flush_resize(&mut self, metrics: &HostMetrics) -> EffectsResult<Option<ResizeOutcome>> {
        if self.debouncer.flush() {
            self.initialize(metrics).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Halts frame requests and drops any pending resize.
    pub fn stop(&mut self) {
        self.frame_loop.stop();
        self.debouncer.cancel();
    }

    /// Stops, drops the pool and clears the surface.
    pub fn dispose(&mut self) {
        if self.field.is_disposed() {
            return;
        }
        self.stop();
        self.field.dispose();
        self.surface.clear();
        info!(
            frames = self.frame_loop.stats().frames,
            rebuilds = self.field.stats().rebuilds,
            "ember renderer disposed"
        );
    }

    /// The particle field.
    #[must_use]
    pub fn field(&self) -> &EmberField<R> {
        &self.field
    }

    /// Mutable access to the particle field.
    pub fn field_mut(&mut self) -> &mut EmberField<R> {
        &mut self.field
    }

    /// The surface being painted.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The last recorded frame.
    #[must_use]
    pub fn commands(&self) -> &FrameCommands {
        &self.commands
    }

    /// The frame loop.
    #[must_use]
    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    /// The resize debouncer.
    #[must_use]
    pub fn debouncer(&self) -> &ResizeDebouncer {
        &self.debouncer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixmap::Pixmap;
    use crate::schedule::LoopState;
    use rand::SeedableRng;

    fn renderer(reduced_motion: bool) -> EmberRenderer<Pixmap> {
        let config = EmberConfig {
            seed: Some(11),
            ..EmberConfig::default()
        };
        EmberRenderer::new(config, reduced_motion, Pixmap::new()).unwrap()
    }

    #[test]
    fn test_initialize_sizes_surface() {
        let mut renderer = renderer(false);
        renderer
            .initialize(&HostMetrics::new(200.0, 100.0, 2.0, 1280.0))
            .unwrap();
        assert_eq!((renderer.surface().width(), renderer.surface().height()), (400, 200));
    }

    #[test]
    fn test_frames_paint_only_while_running() {
        let mut renderer = renderer(false);
        renderer
            .initialize(&HostMetrics::new(200.0, 100.0, 1.0, 1280.0))
            .unwrap();

        assert_eq!(renderer.frame(), FrameRequest::Halt);
        assert!(renderer.surface().is_transparent());

        assert_eq!(renderer.start(), FrameRequest::Continue);
        assert_eq!(renderer.frame(), FrameRequest::Continue);
        assert!(renderer.surface().lit_texels() > 0);

        renderer.stop();
        assert_eq!(renderer.frame(), FrameRequest::Halt);
        assert_eq!(renderer.frame_loop().stats().frames, 1);
        assert_eq!(renderer.frame_loop().state(), LoopState::Stopped);
    }

    #[test]
    fn test_stop_drops_pending_resize() {
        let mut renderer = renderer(false);
        let metrics = HostMetrics::new(200.0, 100.0, 1.0, 1280.0);
        renderer.initialize(&metrics).unwrap();
        renderer.signal_resize(Duration::from_millis(0));
        renderer.stop();
        assert_eq!(
            renderer.poll_resize(Duration::from_secs(5), &metrics).unwrap(),
            None
        );
        assert_eq!(renderer.field().stats().rebuilds, 1);
    }

    #[test]
    fn test_dispose_clears_everything() {
        let mut renderer = renderer(false);
        renderer
            .initialize(&HostMetrics::new(200.0, 100.0, 1.0, 1280.0))
            .unwrap();
        renderer.start();
        renderer.frame();
        renderer.dispose();

        assert!(renderer.surface().is_transparent());
        assert_eq!(renderer.field().particle_count(), 0);
        assert_eq!(renderer.start(), FrameRequest::Halt);
        renderer.signal_resize(Duration::ZERO);
        assert!(!renderer.debouncer().is_pending());
    }

    #[test]
    fn test_custom_generator() {
        let field = EmberField::with_rng(
            EmberConfig::default(),
            false,
            rand::rngs::StdRng::seed_from_u64(5),
        )
        .unwrap();
        let mut renderer = EmberRenderer::with_field(field, Pixmap::new());
        renderer
            .initialize(&HostMetrics::new(64.0, 64.0, 1.0, 64.0))
            .unwrap();
        assert_eq!(renderer.field().particle_count(), 45);
    }
}
