//! Surface sizing: container box, device pixel ratio, viewport class.

/// Density class of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewportClass {
    /// Phone-sized viewport, fewer particles.
    Narrow,
    /// Everything else.
    #[default]
    Wide,
}

impl ViewportClass {
    /// Classifies a viewport width (CSS px) against a breakpoint.
    #[must_use]
    pub fn classify(viewport_width: f32, breakpoint: f32) -> Self {
        if viewport_width <= breakpoint {
            Self::Narrow
        } else {
            Self::Wide
        }
    }
}

/// One sample of the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HostMetrics {
    /// Container layout width (CSS px).
    pub container_width: f32,
    /// Container layout height (CSS px).
    pub container_height: f32,
    /// Device pixel ratio reported by the host.
    pub device_pixel_ratio: f32,
    /// Viewport width (CSS px).
    pub viewport_width: f32,
}

impl HostMetrics {
    /// Creates a sample.
    #[must_use]
    pub const fn new(
        container_width: f32,
        container_height: f32,
        device_pixel_ratio: f32,
        viewport_width: f32,
    ) -> Self {
        Self {
            container_width,
            container_height,
            device_pixel_ratio,
            viewport_width,
        }
    }

    /// Returns true once the container has a non-empty box.
    #[must_use]
    pub fn is_laid_out(&self) -> bool {
        self.container_width.is_finite()
            && self.container_height.is_finite()
            && self.container_width > 0.0
            && self.container_height > 0.0
    }
}

/// Clamps a host-reported device pixel ratio.
///
/// Missing or nonsensical ratios count as 1.
#[must_use]
pub fn clamp_device_pixel_ratio(dpr: f32, min: f32, max: f32) -> f32 {
    let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
    dpr.max(min).min(max)
}

/// Resolved size of a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    /// Displayed width (CSS px).
    pub width: f32,
    /// Displayed height (CSS px).
    pub height: f32,
    /// Physical pixels per logical pixel.
    pub scale: f32,
    /// Backing store width in physical pixels.
    pub backing_width: u32,
    /// Backing store height in physical pixels.
    pub backing_height: u32,
}

impl SurfaceGeometry {
    /// Nothing laid out yet.
    pub const EMPTY: Self = Self {
        width: 0.0,
        height: 0.0,
        scale: 1.0,
        backing_width: 0,
        backing_height: 0,
    };

    /// Resolves the geometry for a host sample.
    #[must_use]
    pub fn resolve(metrics: &HostMetrics, dpr_min: f32, dpr_max: f32) -> Self {
        let scale = clamp_device_pixel_ratio(metrics.device_pixel_ratio, dpr_min, dpr_max);
        let width = metrics.container_width.max(0.0);
        let height = metrics.container_height.max(0.0);
        Self {
            width,
            height,
            scale,
            backing_width: (width * scale).floor() as u32,
            backing_height: (height * scale).floor() as u32,
        }
    }

    /// Returns true if there is nothing to draw on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backing_width == 0 || self.backing_height == 0
    }
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dpr_clamped_to_bounds() {
        assert!((clamp_device_pixel_ratio(3.0, 1.0, 2.0) - 2.0).abs() < f32::EPSILON);
        assert!((clamp_device_pixel_ratio(0.5, 1.0, 2.0) - 1.0).abs() < f32::EPSILON);
        assert!((clamp_device_pixel_ratio(1.5, 1.0, 2.0) - 1.5).abs() < f32::EPSILON);
        assert!((clamp_device_pixel_ratio(f32::NAN, 1.0, 2.0) - 1.0).abs() < f32::EPSILON);
        assert!((clamp_device_pixel_ratio(0.0, 1.0, 2.0) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_backing_size_floors() {
        let metrics = HostMetrics::new(401.0, 300.5, 1.5, 1280.0);
        let geometry = SurfaceGeometry::resolve(&metrics, 1.0, 2.0);
        assert_eq!(geometry.backing_width, 601);
        assert_eq!(geometry.backing_height, 450);
        assert!((geometry.width - 401.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_high_density_display_capped() {
        let metrics = HostMetrics::new(400.0, 300.0, 3.0, 1280.0);
        let geometry = SurfaceGeometry::resolve(&metrics, 1.0, 2.0);
        assert_eq!((geometry.backing_width, geometry.backing_height), (800, 600));
    }

    #[test]
    fn test_layout_detection() {
        assert!(HostMetrics::new(10.0, 10.0, 1.0, 10.0).is_laid_out());
        assert!(!HostMetrics::new(0.0, 10.0, 1.0, 10.0).is_laid_out());
        assert!(!HostMetrics::new(10.0, 0.0, 1.0, 10.0).is_laid_out());
        assert!(!HostMetrics::default().is_laid_out());
    }

    #[test]
    fn test_viewport_class() {
        assert_eq!(ViewportClass::classify(375.0, 720.0), ViewportClass::Narrow);
        assert_eq!(ViewportClass::classify(720.0, 720.0), ViewportClass::Narrow);
        assert_eq!(ViewportClass::classify(1280.0, 720.0), ViewportClass::Wide);
    }
}
