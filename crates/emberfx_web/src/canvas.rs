//! Canvas 2D backend for [`Surface`].
//!
//! The context transform is set to the device scale, so glows are painted in
//! logical coordinates exactly as the field records them.

use std::f64::consts::TAU;

use emberfx_core::{BlendMode, EffectsError, EffectsResult, Glow, Surface, SurfaceGeometry};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::dom::host_error;

pub(crate) struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    geometry: SurfaceGeometry,
    stop: String,
    paint_failures: u32,
}

impl CanvasSurface {
    /// Opens a 2D context with an alpha channel.
    pub(crate) fn new(canvas: HtmlCanvasElement) -> EffectsResult<Self> {
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &JsValue::from_str("alpha"), &JsValue::TRUE)
            .map_err(host_error)?;
        let context = canvas
            .get_context_with_context_options("2d", &options)
            .map_err(host_error)?
            .ok_or(EffectsError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EffectsError::ContextUnavailable)?;
        Ok(Self {
            canvas,
            context,
            geometry: SurfaceGeometry::EMPTY,
            stop: String::with_capacity(40),
            paint_failures: 0,
        })
    }

    fn paint(&mut self, glow: &Glow) -> Result<(), JsValue> {
        let (x, y, radius) = (f64::from(glow.x), f64::from(glow.y), f64::from(glow.radius));
        let gradient = self.context.create_radial_gradient(x, y, 0.0, x, y, radius)?;
        glow.color.write_css(&mut self.stop);
        gradient.add_color_stop(0.0, &self.stop)?;
        glow.color.with_alpha(0.0).write_css(&mut self.stop);
        gradient.add_color_stop(1.0, &self.stop)?;

        self.context.set_fill_style_canvas_gradient(&gradient);
        self.context.begin_path();
        self.context.arc(x, y, radius, 0.0, TAU)?;
        self.context.fill();
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn configure(&mut self, geometry: &SurfaceGeometry) -> EffectsResult<()> {
        let style = self.canvas.style();
        style
            .set_property("width", &format!("{}px", geometry.width))
            .map_err(host_error)?;
        style
            .set_property("height", &format!("{}px", geometry.height))
            .map_err(host_error)?;
        self.canvas.set_width(geometry.backing_width);
        self.canvas.set_height(geometry.backing_height);

        let scale = f64::from(geometry.scale);
        self.context
            .set_transform(scale, 0.0, 0.0, scale, 0.0, 0.0)
            .map_err(host_error)?;
        self.geometry = *geometry;
        Ok(())
    }

    fn clear(&mut self) {
        self.context.clear_rect(
            0.0,
            0.0,
            f64::from(self.geometry.width),
            f64::from(self.geometry.height),
        );
    }

    fn set_blend(&mut self, mode: BlendMode) {
        if let Err(err) = self
            .context
            .set_global_composite_operation(mode.composite_operation())
        {
            debug!(error = ?err, "composite operation rejected");
        }
    }

    fn fill_glow(&mut self, glow: &Glow) {
        if let Err(err) = self.paint(glow) {
            // Logged once.
            if self.paint_failures == 0 {
                debug!(error = ?err, "ember glow could not be painted");
            }
            self.paint_failures = self.paint_failures.saturating_add(1);
        }
    }
}
