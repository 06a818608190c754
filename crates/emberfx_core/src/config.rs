//! # Effects Configuration
//!
//! Every tuning constant lives here. The page variants only ever differed in
//! these numbers, so they are data, not code.
//!
//! ```toml
//! canvas_selector = "#embers"
//!
//! [embers]
//! count = 90
//! narrow_count = 45
//! hue = { min = 18.0, max = 38.0 }
//! base_alpha = 0.16
//!
//! [reveal]
//! threshold = 0.15
//! ```

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EffectsError, EffectsResult};
use crate::geometry::ViewportClass;

/// Closed interval used for randomized particle attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draws a uniform sample from `[min, max)`.
    ///
    /// A degenerate span always yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..self.max)
        } else {
            self.min
        }
    }

    /// Returns true if `value` lies inside the closed span.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamps `value` into the span without panicking on odd bounds.
    #[inline]
    #[must_use]
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }

    fn validate(&self, name: &str) -> EffectsResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(EffectsError::invalid(format!("{name}: bounds must be finite")));
        }
        // Sampling needs a representable width.
        if !(self.max - self.min).is_finite() {
            return Err(EffectsError::invalid(format!("{name}: range is too wide")));
        }
        if self.min > self.max {
            return Err(EffectsError::invalid(format!(
                "{name}: min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Tuning for the ember particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmberConfig {
    // --- density ---
    /// Particle count on wide viewports.
    pub count: usize,
    /// Particle count on narrow viewports.
    pub narrow_count: usize,
    /// Viewport widths at or below this (CSS px) count as narrow.
    pub narrow_breakpoint: f32,

    // --- surface ---
    /// Lower clamp for the device pixel ratio.
    pub dpr_min: f32,
    /// Upper clamp for the device pixel ratio.
    pub dpr_max: f32,

    // --- motion ---
    /// Particle radius (logical px).
    pub radius: Span,
    /// Upward speed per frame.
    pub vy: Span,
    /// Lateral speed per frame.
    pub vx: Span,
    /// Spatial frequency of the sinusoidal sway.
    pub sway_frequency: f32,
    /// Amplitude of the sinusoidal sway per frame.
    pub sway_amplitude: f32,

    // --- brightness ---
    /// Fixed opacity multiplier per particle.
    pub life: Span,
    /// Flicker value at spawn.
    pub flicker_initial: Span,
    /// Largest per-frame flicker change.
    pub flicker_step: f32,
    /// Flicker is clamped into this band every frame.
    pub flicker_band: Span,

    // --- color ---
    /// Hue in degrees.
    pub hue: Span,
    /// Saturation in percent.
    pub saturation: Span,
    /// Lightness in percent.
    pub lightness: Span,

    // --- glow ---
    /// Opacity at the glow center before life and flicker.
    pub base_alpha: f32,
    /// Glow radius as a multiple of the particle radius.
    pub glow_radius_multiplier: f32,

    // --- bounds ---
    /// Particles above `-top_margin` respawn.
    pub top_margin: f32,
    /// Particles beyond either side by this much respawn.
    pub side_margin: f32,
    /// Respawn band starts at this fraction of the height.
    pub respawn_band_start: f32,
    /// Respawn band extends this far below the bottom edge.
    pub respawn_overshoot: f32,

    // --- timing ---
    /// Resize signals closer together than this collapse into one rebuild.
    pub resize_debounce_ms: u64,
    /// Frames slower than this are counted and reported.
    pub frame_budget_us: u32,

    /// Fixed RNG seed; `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for EmberConfig {
    fn default() -> Self {
        Self {
            count: 90,
            narrow_count: 45,
            narrow_breakpoint: 720.0,
            dpr_min: 1.0,
            dpr_max: 2.0,
            radius: Span::new(0.7, 2.0),
            vy: Span::new(0.08, 0.38),
            vx: Span::new(-0.12, 0.12),
            sway_frequency: 0.002,
            sway_amplitude: 0.08,
            life: Span::new(0.35, 1.0),
            flicker_initial: Span::new(0.6, 1.0),
            flicker_step: 0.03,
            flicker_band: Span::new(0.55, 1.0),
            hue: Span::new(18.0, 38.0),
            saturation: Span::new(70.0, 95.0),
            lightness: Span::new(55.0, 70.0),
            base_alpha: 0.16,
            glow_radius_multiplier: 6.0,
            top_margin: 30.0,
            side_margin: 50.0,
            respawn_band_start: 0.65,
            respawn_overshoot: 60.0,
            resize_debounce_ms: 120,
            frame_budget_us: 16_666,
            seed: None,
        }
    }
}

impl EmberConfig {
    /// Heavier field with brighter glows.
    #[must_use]
    pub fn dense() -> Self {
        Self {
            count: 140,
            narrow_count: 70,
            base_alpha: 0.18,
            ..Self::default()
        }
    }

    /// Sparse, slow, dim field for busy pages.
    #[must_use]
    pub fn subtle() -> Self {
        Self {
            count: 60,
            narrow_count: 30,
            vy: Span::new(0.06, 0.28),
            base_alpha: 0.12,
            ..Self::default()
        }
    }

    /// Resolves the pool size for a host.
    ///
    /// Reduced motion always wins: no particles at all.
    #[must_use]
    pub fn particle_count(&self, reduced_motion: bool, class: ViewportClass) -> usize {
        if reduced_motion {
            return 0;
        }
        match class {
            ViewportClass::Narrow => self.narrow_count,
            ViewportClass::Wide => self.count,
        }
    }

    /// Checks every range and multiplier.
    ///
    /// # Errors
    ///
    /// Returns [`EffectsError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> EffectsResult<()> {
        for (name, span) in [
            ("radius", &self.radius),
            ("vy", &self.vy),
            ("vx", &self.vx),
            ("life", &self.life),
            ("flicker_initial", &self.flicker_initial),
            ("flicker_band", &self.flicker_band),
            ("hue", &self.hue),
            ("saturation", &self.saturation),
            ("lightness", &self.lightness),
        ] {
            span.validate(name)?;
        }

        if self.flicker_band.min < 0.0 || self.flicker_band.max > 1.0 {
            return Err(EffectsError::invalid("flicker_band must lie within [0, 1]"));
        }
        if !(self.dpr_min > 0.0 && self.dpr_min <= self.dpr_max && self.dpr_max.is_finite()) {
            return Err(EffectsError::invalid(format!(
                "dpr bounds [{}, {}] are not a positive range",
                self.dpr_min, self.dpr_max
            )));
        }
        if !(0.0..=1.0).contains(&self.base_alpha) {
            return Err(EffectsError::invalid("base_alpha must lie within [0, 1]"));
        }
        if !(self.glow_radius_multiplier > 0.0 && self.glow_radius_multiplier.is_finite()) {
            return Err(EffectsError::invalid("glow_radius_multiplier must be positive"));
        }
        if self.radius.min < 0.0 {
            return Err(EffectsError::invalid("radius must not be negative"));
        }
        if !(self.flicker_step >= 0.0 && (2.0 * self.flicker_step).is_finite()) {
            return Err(EffectsError::invalid("flicker_step must be non-negative and finite"));
        }
        if !(self.top_margin >= 0.0 && self.side_margin >= 0.0 && self.respawn_overshoot >= 0.0) {
            return Err(EffectsError::invalid("margins must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.respawn_band_start) {
            return Err(EffectsError::invalid("respawn_band_start must lie within [0, 1]"));
        }
        if !(self.sway_frequency.is_finite() && self.sway_amplitude.is_finite()) {
            return Err(EffectsError::invalid("sway parameters must be finite"));
        }
        if !self.narrow_breakpoint.is_finite() {
            return Err(EffectsError::invalid("narrow_breakpoint must be finite"));
        }
        Ok(())
    }
}

/// One element moved by the parallax effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxLayer {
    /// CSS selector of the element.
    pub selector: String,
    /// Translation per scrolled pixel.
    pub speed: f32,
    /// Optional constant scale applied with the translation.
    #[serde(default)]
    pub scale: Option<f32>,
}

/// Parallax tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Layers, applied independently.
    pub layers: Vec<ParallaxLayer>,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            layers: vec![
                ParallaxLayer {
                    selector: ".hero-bg".into(),
                    speed: 0.10,
                    scale: None,
                },
                ParallaxLayer {
                    selector: ".hero-image".into(),
                    speed: 0.16,
                    scale: Some(1.02),
                },
            ],
        }
    }
}

impl ParallaxConfig {
    fn validate(&self) -> EffectsResult<()> {
        for layer in &self.layers {
            if !layer.speed.is_finite() {
                return Err(EffectsError::invalid(format!(
                    "parallax layer {}: speed must be finite",
                    layer.selector
                )));
            }
            if layer.scale.is_some_and(|s| !(s > 0.0 && s.is_finite())) {
                return Err(EffectsError::invalid(format!(
                    "parallax layer {}: scale must be positive",
                    layer.selector
                )));
            }
        }
        Ok(())
    }
}

/// Reveal-on-scroll tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// CSS selector of the tagged elements.
    pub selector: String,
    /// Class added once an element is revealed.
    pub visible_class: String,
    /// Visible fraction that triggers the reveal.
    pub threshold: f32,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selector: ".reveal".into(),
            visible_class: "is-visible".into(),
            threshold: 0.15,
        }
    }
}

/// Configuration for every effect on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Selector of the ember canvas.
    pub canvas_selector: String,
    /// Ember field tuning.
    pub embers: EmberConfig,
    /// Parallax tuning.
    pub parallax: ParallaxConfig,
    /// Reveal tuning.
    pub reveal: RevealConfig,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            canvas_selector: "#embers".into(),
            embers: EmberConfig::default(),
            parallax: ParallaxConfig::default(),
            reveal: RevealConfig::default(),
        }
    }
}

impl EffectsConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or out-of-range values.
    pub fn from_toml_str(text: &str) -> EffectsResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not validate.
    pub fn load(path: impl AsRef<Path>) -> EffectsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EffectsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> EffectsResult<()> {
        if self.canvas_selector.trim().is_empty() {
            return Err(EffectsError::invalid("canvas_selector must not be empty"));
        }
        self.embers.validate()?;
        self.parallax.validate()?;
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(EffectsError::invalid("reveal threshold must lie within [0, 1]"));
        }
        if self.reveal.visible_class.trim().is_empty() {
            return Err(EffectsError::invalid("reveal visible_class must not be empty"));
        }
        Ok(())
    }
}
