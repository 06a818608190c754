//! Scroll-driven parallax for hero layers.
//!
//! Scroll events can arrive many times per frame; a `ticking` latch makes
//! sure transforms are written at most once per display refresh.

use std::fmt::Write;

use crate::config::ParallaxLayer;

/// Transform for one layer at a scroll offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerTransform {
    /// Vertical translation (CSS px).
    pub translate_y: f32,
    /// Optional constant scale.
    pub scale: Option<f32>,
}

impl LayerTransform {
    /// CSS `transform` value.
    #[must_use]
    pub fn css(&self) -> String {
        let mut out = String::new();
        self.write_css(&mut out);
        out
    }

    /// Writes the CSS `transform` value into `out`, replacing its contents.
    pub fn write_css(&self, out: &mut String) {
        out.clear();
        // Formatting into a String cannot fail.
        let _ = match self.scale {
            Some(scale) => write!(out, "translateY({}px) scale({scale})", self.translate_y),
            None => write!(out, "translateY({}px)", self.translate_y),
        };
    }
}

/// Parallax state for a set of layers.
#[derive(Debug, Clone)]
pub struct Parallax {
    layers: Vec<ParallaxLayer>,
    transforms: Vec<LayerTransform>,
    enabled: bool,
    ticking: bool,
    applications: u64,
}

impl Parallax {
    /// Creates the effect for the layers present on the page.
    ///
    /// Disabled with reduced motion or when no layer is present.
    #[must_use]
    pub fn new(layers: Vec<ParallaxLayer>, reduced_motion: bool) -> Self {
        let enabled = !reduced_motion && !layers.is_empty();
        Self {
            transforms: Vec::with_capacity(layers.len()),
            layers,
            enabled,
            ticking: false,
            applications: 0,
        }
    }

    /// Returns true if the effect does anything at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Handles a scroll event.
    ///
    /// Returns true if the caller must request an animation frame that will
    /// call [`apply`](Self::apply).
    pub fn on_scroll(&mut self) -> bool {
        if !self.enabled || self.ticking {
            return false;
        }
        self.ticking = true;
        true
    }

    /// Computes every layer's transform for `scroll_y` and releases the latch.
    ///
    /// The returned slice is rewritten in place on the next call.
    pub fn apply(&mut self, scroll_y: f32) -> &[LayerTransform] {
        self.ticking = false;
        self.transforms.clear();
        if !self.enabled {
            return &self.transforms;
        }
        self.applications += 1;
        let scroll_y = if scroll_y.is_finite() { scroll_y } else { 0.0 };
        self.transforms
            .extend(self.layers.iter().map(|layer| LayerTransform {
                translate_y: scroll_y * layer.speed,
                scale: layer.scale,
            }));
        &self.transforms
    }

    /// Times transforms were computed.
    #[must_use]
    pub fn applications(&self) -> u64 {
        self.applications
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParallaxConfig;

    fn hero() -> Parallax {
        Parallax::new(ParallaxConfig::default().layers, false)
    }

    #[test]
    fn test_scroll_burst_requests_one_frame() {
        let mut parallax = hero();
        assert!(parallax.on_scroll());
        assert!(!parallax.on_scroll());
        assert!(!parallax.on_scroll());
        parallax.apply(10.0);
        assert!(parallax.on_scroll());
        assert_eq!(parallax.applications(), 1);
    }

    #[test]
    fn test_transforms_scale_with_offset() {
        let mut parallax = hero();
        let transforms = parallax.apply(200.0);
        assert_eq!(transforms.len(), 2);
        assert!((transforms[0].translate_y - 20.0).abs() < 1e-4);
        assert!((transforms[1].translate_y - 32.0).abs() < 1e-4);
        assert_eq!(transforms[0].scale, None);
        assert_eq!(transforms[1].scale, Some(1.02));
    }

    #[test]
    fn test_css_values() {
        let plain = LayerTransform {
            translate_y: 12.5,
            scale: None,
        };
        assert_eq!(plain.css(), "translateY(12.5px)");
        let scaled = LayerTransform {
            translate_y: 0.0,
            scale: Some(1.02),
        };
        assert_eq!(scaled.css(), "translateY(0px) scale(1.02)");
    }

    #[test]
    fn test_apply_reuses_transform_buffer() {
        let mut parallax = hero();
        let first = parallax.apply(100.0).as_ptr();
        let second = parallax.apply(300.0);
        assert_eq!(second.as_ptr(), first);
        assert!((second[0].translate_y - 30.0).abs() < 1e-4);

        let mut buffer = String::from("stale");
        second[1].write_css(&mut buffer);
        assert!(buffer.starts_with("translateY(48"));
        assert!(buffer.ends_with("scale(1.02)"));
    }

    #[test]
    fn test_reduced_motion_disables() {
        let mut parallax = Parallax::new(ParallaxConfig::default().layers, true);
        assert!(!parallax.is_enabled());
        assert!(!parallax.on_scroll());
        assert!(parallax.apply(100.0).is_empty());
    }

    #[test]
    fn test_no_layers_disables() {
        let parallax = Parallax::new(Vec::new(), false);
        assert!(!parallax.is_enabled());
    }
}
