//! Warm glow colors.
//!
//! Particles carry their color as HSL because that is the space the tuning
//! ranges are written in; rasterization needs linear RGBA.

use std::fmt::Write;

/// RGBA color with straight (non-premultiplied) alpha, components 0-1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Rgba {
    /// Creates a color.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns `[r·a, g·a, b·a, a]`.
    #[must_use]
    pub fn premultiplied(self) -> [f32; 4] {
        [self.r * self.a, self.g * self.a, self.b * self.a, self.a]
    }
}

/// HSL color with alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    /// Hue in degrees.
    pub h: f32,
    /// Saturation in percent (0-100).
    pub s: f32,
    /// Lightness in percent (0-100).
    pub l: f32,
    /// Alpha (0-1).
    pub a: f32,
}

impl Hsla {
    /// Creates a color.
    #[must_use]
    pub const fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    /// Same hue, saturation and lightness at another alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Converts to RGBA (CSS Color 4 `hsl()` algorithm).
    #[must_use]
    pub fn to_rgba(self) -> Rgba {
        let h = self.h.rem_euclid(360.0);
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);
        let amount = s * l.min(1.0 - l);
        let channel = |n: f32| {
            let k = (n + h / 30.0).rem_euclid(12.0);
            l - amount * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
        };
        Rgba::new(channel(0.0), channel(8.0), channel(4.0), self.a.clamp(0.0, 1.0))
    }

    /// CSS `hsla(...)` form, as handed to a canvas gradient stop.
    #[must_use]
    pub fn css(&self) -> String {
        let mut out = String::with_capacity(40);
        self.write_css(&mut out);
        out
    }

    /// Writes the CSS form into `out`, replacing its contents.
    pub fn write_css(&self, out: &mut String) {
        out.clear();
        // Formatting into a String cannot fail.
        let _ = write!(
            out,
            "hsla({:.2}, {:.2}%, {:.2}%, {:.4})",
            self.h,
            self.s,
            self.l,
            self.a.clamp(0.0, 1.0)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_primary_hues() {
        let red = Hsla::new(0.0, 100.0, 50.0, 1.0).to_rgba();
        assert!(close(red.r, 1.0) && close(red.g, 0.0) && close(red.b, 0.0));

        let green = Hsla::new(120.0, 100.0, 50.0, 1.0).to_rgba();
        assert!(close(green.r, 0.0) && close(green.g, 1.0) && close(green.b, 0.0));

        let orange = Hsla::new(30.0, 100.0, 50.0, 1.0).to_rgba();
        assert!(close(orange.r, 1.0) && close(orange.g, 0.5) && close(orange.b, 0.0));
    }

    #[test]
    fn test_grey_when_unsaturated() {
        let grey = Hsla::new(200.0, 0.0, 40.0, 1.0).to_rgba();
        assert!(close(grey.r, 0.4) && close(grey.g, 0.4) && close(grey.b, 0.4));
    }

    #[test]
    fn test_ember_range_is_warm() {
        let ember = Hsla::new(28.0, 85.0, 62.0, 0.1).to_rgba();
        assert!(ember.r > ember.g && ember.g > ember.b);
    }

    #[test]
    fn test_premultiplied() {
        let p = Rgba::new(1.0, 0.5, 0.0, 0.5).premultiplied();
        assert_eq!(p, [0.5, 0.25, 0.0, 0.5]);
    }

    #[test]
    fn test_css_form() {
        let css = Hsla::new(18.5, 70.0, 55.0, 0.16).css();
        assert_eq!(css, "hsla(18.50, 70.00%, 55.00%, 0.1600)");
        assert_eq!(Hsla::new(18.5, 70.0, 55.0, 0.16).with_alpha(0.0).css(), "hsla(18.50, 70.00%, 55.00%, 0.0000)");
    }

    #[test]
    fn test_write_css_reuses_buffer() {
        let mut buffer = String::from("stale");
        Hsla::new(18.5, 70.0, 55.0, 0.16).write_css(&mut buffer);
        assert_eq!(buffer, "hsla(18.50, 70.00%, 55.00%, 0.1600)");
        let capacity = buffer.capacity();
        Hsla::new(30.0, 80.0, 60.0, 0.0).write_css(&mut buffer);
        assert_eq!(buffer, "hsla(30.00, 80.00%, 60.00%, 0.0000)");
        assert_eq!(buffer.capacity(), capacity);
    }
}
