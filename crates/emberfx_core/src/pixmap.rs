//! Software raster surface.
//!
//! Premultiplied RGBA texels in physical pixels. Used for headless previews
//! and to assert what a frame actually put on screen.

use std::io::{self, Write};

use bytemuck::{Pod, Zeroable};

use crate::color::Rgba;
use crate::error::EffectsResult;
use crate::geometry::SurfaceGeometry;
use crate::render::{BlendMode, Glow, Surface};

/// One premultiplied RGBA texel.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Texel {
    /// Red, premultiplied.
    pub r: f32,
    /// Green, premultiplied.
    pub g: f32,
    /// Blue, premultiplied.
    pub b: f32,
    /// Coverage.
    pub a: f32,
}

impl Texel {
    /// Fully transparent.
    pub const CLEAR: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Returns true if nothing has been painted here.
    #[inline]
    #[must_use]
    pub fn is_clear(&self) -> bool {
        *self == Self::CLEAR
    }

    /// Straight-alpha RGBA8, as a canvas `getImageData` would report it.
    #[must_use]
    pub fn to_rgba8(&self) -> [u8; 4] {
        let a = self.a.clamp(0.0, 1.0);
        if a <= 0.0 {
            return [0; 4];
        }
        let unmul = |c: f32| ((c / a).clamp(0.0, 1.0) * 255.0).round() as u8;
        [unmul(self.r), unmul(self.g), unmul(self.b), (a * 255.0).round() as u8]
    }
}

/// CPU-side drawing surface.
#[derive(Debug, Clone)]
pub struct Pixmap {
    width: u32,
    height: u32,
    scale: f32,
    blend: BlendMode,
    texels: Vec<Texel>,
}

impl Pixmap {
    /// Creates an unsized pixmap; [`Surface::configure`] allocates it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            scale: 1.0,
            blend: BlendMode::SourceOver,
            texels: Vec::new(),
        }
    }

    /// Backing width in physical pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Backing height in physical pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Physical pixels per logical pixel.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Texel at a physical coordinate.
    #[must_use]
    pub fn texel(&self, x: u32, y: u32) -> Option<Texel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.texels.get((y * self.width + x) as usize).copied()
    }

    /// All texels, row-major.
    #[must_use]
    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    /// Returns true if every texel is fully transparent.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.texels.iter().all(Texel::is_clear)
    }

    /// Number of texels with any coverage.
    #[must_use]
    pub fn lit_texels(&self) -> usize {
        self.texels.iter().filter(|t| t.a > 0.0).count()
    }

    /// Straight-alpha RGBA8 bytes, row-major.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let pixels: Vec<[u8; 4]> = self.texels.iter().map(Texel::to_rgba8).collect();
        bytemuck::cast_slice(&pixels).to_vec()
    }

    /// Writes a binary PPM (P6), composited over black.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        let mut row = Vec::with_capacity(self.width as usize * 3);
        for line in self.texels.chunks(self.width.max(1) as usize) {
            row.clear();
            for texel in line {
                for c in [texel.r, texel.g, texel.b] {
                    row.push((c.clamp(0.0, 1.0) * 255.0).round() as u8);
                }
            }
            out.write_all(&row)?;
        }
        out.flush()
    }

    #[inline]
    fn composite(&mut self, index: usize, src: [f32; 4]) {
        let Some(dst) = self.texels.get_mut(index) else {
            return;
        };
        match self.blend {
            BlendMode::Lighter => {
                dst.r = (dst.r + src[0]).min(1.0);
                dst.g = (dst.g + src[1]).min(1.0);
                dst.b = (dst.b + src[2]).min(1.0);
                dst.a = (dst.a + src[3]).min(1.0);
            }
            BlendMode::SourceOver => {
                let keep = 1.0 - src[3];
                dst.r = src[0] + dst.r * keep;
                dst.g = src[1] + dst.g * keep;
                dst.b = src[2] + dst.b * keep;
                dst.a = src[3] + dst.a * keep;
            }
        }
    }
}

impl Default for Pixmap {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for Pixmap {
    fn configure(&mut self, geometry: &SurfaceGeometry) -> EffectsResult<()> {
        self.width = geometry.backing_width;
        self.height = geometry.backing_height;
        self.scale = geometry.scale;
        self.texels.clear();
        self.texels
            .resize(self.width as usize * self.height as usize, Texel::CLEAR);
        Ok(())
    }

    fn clear(&mut self) {
        self.texels.fill(Texel::CLEAR);
    }

    fn set_blend(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn fill_glow(&mut self, glow: &Glow) {
        let radius = glow.radius * self.scale;
        if radius.is_nan() || radius <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let cx = glow.x * self.scale;
        let cy = glow.y * self.scale;

        let x0 = (cx - radius).floor().max(0.0) as u32;
        let y0 = (cy - radius).floor().max(0.0) as u32;
        let x1 = ((cx + radius).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((cy + radius).ceil().max(0.0) as u32).min(self.height);

        let color = glow.color.to_rgba();
        for py in y0..y1 {
            let dy = py as f32 + 0.5 - cy;
            for px in x0..x1 {
                let dx = px as f32 + 0.5 - cx;
                let distance = (dx * dx + dy * dy).sqrt() / radius;
                if distance >= 1.0 {
                    continue;
                }
                // Linear falloff between the two gradient stops.
                let src = Rgba {
                    a: color.a * (1.0 - distance),
                    ..color
                }
                .premultiplied();
                let index = (py * self.width + px) as usize;
                self.composite(index, src);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Hsla;
    use crate::geometry::HostMetrics;

    fn sized(w: f32, h: f32, dpr: f32) -> Pixmap {
        let mut pixmap = Pixmap::new();
        let geometry = SurfaceGeometry::resolve(&HostMetrics::new(w, h, dpr, w), 1.0, 2.0);
        pixmap.configure(&geometry).unwrap();
        pixmap
    }

    fn glow(x: f32, y: f32, radius: f32, alpha: f32) -> Glow {
        Glow {
            x,
            y,
            radius,
            color: Hsla::new(25.0, 90.0, 60.0, alpha),
        }
    }

    #[test]
    fn test_configure_allocates_backing() {
        let pixmap = sized(40.0, 30.0, 2.0);
        assert_eq!((pixmap.width(), pixmap.height()), (80, 60));
        assert_eq!(pixmap.texels().len(), 80 * 60);
        assert!(pixmap.is_transparent());
    }

    #[test]
    fn test_glow_center_brightest() {
        let mut pixmap = sized(40.0, 40.0, 1.0);
        pixmap.set_blend(BlendMode::Lighter);
        pixmap.fill_glow(&glow(20.0, 20.0, 6.0, 0.5));

        let center = pixmap.texel(19, 19).unwrap();
        let edge = pixmap.texel(24, 19).unwrap();
        let outside = pixmap.texel(30, 19).unwrap();
        assert!(center.a > edge.a);
        assert!(edge.a > 0.0);
        assert!(outside.is_clear());
        assert!(center.a <= 0.5);
    }

    #[test]
    fn test_additive_never_darkens() {
        let mut pixmap = sized(20.0, 20.0, 1.0);
        pixmap.set_blend(BlendMode::Lighter);
        pixmap.fill_glow(&glow(10.0, 10.0, 8.0, 0.6));
        let before = pixmap.texels().to_vec();
        pixmap.fill_glow(&glow(12.0, 9.0, 8.0, 0.3));

        for (old, new) in before.iter().zip(pixmap.texels()) {
            assert!(new.r >= old.r && new.g >= old.g && new.b >= old.b && new.a >= old.a);
        }
    }

    #[test]
    fn test_glow_honors_scale() {
        let mut pixmap = sized(20.0, 20.0, 2.0);
        pixmap.fill_glow(&glow(10.0, 10.0, 2.0, 1.0));
        // 2 logical px at scale 2 is a 4 physical px radius
        assert!(pixmap.texel(22, 20).unwrap().a > 0.0);
        assert!(pixmap.texel(25, 20).unwrap().is_clear());
    }

    #[test]
    fn test_clear_resets() {
        let mut pixmap = sized(10.0, 10.0, 1.0);
        pixmap.fill_glow(&glow(5.0, 5.0, 3.0, 1.0));
        assert!(!pixmap.is_transparent());
        pixmap.clear();
        assert!(pixmap.is_transparent());
    }

    #[test]
    fn test_offscreen_glow_is_clipped() {
        let mut pixmap = sized(10.0, 10.0, 1.0);
        pixmap.fill_glow(&glow(-40.0, -40.0, 6.0, 1.0));
        pixmap.fill_glow(&glow(60.0, 5.0, 6.0, 1.0));
        assert!(pixmap.is_transparent());
    }

    #[test]
    fn test_rgba8_export_and_ppm() {
        let mut pixmap = sized(4.0, 2.0, 1.0);
        pixmap.fill_glow(&glow(2.0, 1.0, 3.0, 1.0));
        let bytes = pixmap.to_rgba8();
        assert_eq!(bytes.len(), 4 * 2 * 4);

        let mut ppm = Vec::new();
        pixmap.write_ppm(&mut ppm).unwrap();
        assert!(ppm.starts_with(b"P6\n4 2\n255\n"));
        assert_eq!(ppm.len(), b"P6\n4 2\n255\n".len() + 4 * 2 * 3);
    }
}
