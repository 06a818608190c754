//! Ember canvas glue: animation frames, debounced resize, teardown.
//!
//! ```text
//! requestAnimationFrame ──► EmberRenderer::frame ──► Continue? request again
//! window "resize" ───────► signal_resize + (re)arm setTimeout(delay)
//! timeout fires ─────────► flush_resize (one rebuild per burst)
//! dispose ───────────────► cancel frame + timeout, remove listener, clear
//! ```
//!
//! The frame closure holds a handle to its own slot so it can re-request
//! itself; [`EmberEffect::dispose`] empties the slot to break that cycle.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use emberfx_core::{EffectsConfig, EffectsError, EffectsResult, EmberRenderer, FrameRequest, HostMetrics};
use tracing::{debug, trace};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, Window};

use crate::canvas::CanvasSurface;
use crate::dom::{host_error, host_metrics, now_ms, passive_listener, query};

type Callback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

struct EmberState {
    renderer: EmberRenderer<CanvasSurface>,
    window: Window,
    container: Element,
    animation_id: Option<i32>,
    timeout_id: Option<i32>,
}

impl EmberState {
    fn metrics(&self) -> HostMetrics {
        let mut metrics = host_metrics(&self.window, &self.container);
        // The static reduced-motion canvas is sized in CSS pixels.
        if self.renderer.field().reduced_motion() {
            metrics.device_pixel_ratio = 1.0;
        }
        metrics
    }

    fn request_frame(&mut self, callback: &Callback) {
        let requested = match callback.borrow().as_ref() {
            Some(closure) => self
                .window
                .request_animation_frame(closure.as_ref().unchecked_ref()),
            None => return,
        };
        match requested {
            Ok(id) => self.animation_id = Some(id),
            Err(err) => {
                debug!(error = ?err, "animation frame request failed, embers stopped");
                self.renderer.stop();
            }
        }
    }

    fn on_frame(&mut self, callback: &Callback) {
        self.animation_id = None;
        if self.renderer.frame() == FrameRequest::Continue {
            self.request_frame(callback);
        }
        let stats = self.renderer.field().stats();
        trace!(
            frame = stats.frames,
            respawns = stats.respawns_last_frame,
            "ember frame"
        );
    }

    fn on_resize(&mut self, debounce: &Callback) {
        let now = Duration::from_secs_f64(now_ms(&self.window).max(0.0) / 1000.0);
        self.renderer.signal_resize(now);

        if let Some(id) = self.timeout_id.take() {
            self.window.clear_timeout_with_handle(id);
        }
        let delay = i32::try_from(self.renderer.debouncer().delay().as_millis()).unwrap_or(i32::MAX);
        let armed = match debounce.borrow().as_ref() {
            Some(closure) => self
                .window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    delay,
                ),
            None => return,
        };
        match armed {
            Ok(id) => self.timeout_id = Some(id),
            Err(err) => debug!(error = ?err, "resize timer could not be armed"),
        }
    }

    fn on_quiet(&mut self) {
        self.timeout_id = None;
        let metrics = self.metrics();
        if let Err(err) = self.renderer.flush_resize(&metrics) {
            debug!(%err, "ember resize failed");
        }
    }
}

/// A mounted ember canvas.
pub(crate) struct EmberEffect {
    state: Rc<RefCell<EmberState>>,
    frame: Callback,
    debounce: Callback,
    resize: Option<Closure<dyn FnMut()>>,
}

impl EmberEffect {
    /// Binds the canvas named by `config.canvas_selector` and starts animating.
    ///
    /// Returns `Ok(None)` when the page has no such canvas.
    pub(crate) fn mount(
        window: &Window,
        document: &Document,
        config: &EffectsConfig,
        reduced_motion: bool,
    ) -> EffectsResult<Option<Self>> {
        let Some(element) = query(document, &config.canvas_selector)? else {
            debug!(selector = %config.canvas_selector, "no ember canvas on page");
            return Ok(None);
        };
        let container = element
            .parent_element()
            .ok_or_else(|| EffectsError::MissingElement("ember canvas parent".into()))?;
        let canvas = element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| EffectsError::MissingElement(format!("{} is not a canvas", config.canvas_selector)))?;

        let surface = CanvasSurface::new(canvas)?;
        let renderer = EmberRenderer::new(config.embers.clone(), reduced_motion, surface)?;
        let state = Rc::new(RefCell::new(EmberState {
            renderer,
            window: window.clone(),
            container,
            animation_id: None,
            timeout_id: None,
        }));

        let frame: Callback = Rc::new(RefCell::new(None));
        {
            let state = Rc::clone(&state);
            let slot = Rc::clone(&frame);
            *frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                state.borrow_mut().on_frame(&slot);
            }) as Box<dyn FnMut()>));
        }

        let debounce: Callback = Rc::new(RefCell::new(None));
        {
            let state = Rc::clone(&state);
            *debounce.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                state.borrow_mut().on_quiet();
            }) as Box<dyn FnMut()>));
        }

        let resize = {
            let state = Rc::clone(&state);
            let debounce = Rc::clone(&debounce);
            Closure::wrap(Box::new(move || {
                state.borrow_mut().on_resize(&debounce);
            }) as Box<dyn FnMut()>)
        };
        window
            .add_event_listener_with_callback_and_add_event_listener_options(
                "resize",
                resize.as_ref().unchecked_ref(),
                &passive_listener(),
            )
            .map_err(host_error)?;

        let mut effect = Self {
            state,
            frame,
            debounce,
            resize: Some(resize),
        };
        effect.start()?;
        Ok(Some(effect))
    }

    fn start(&mut self) -> EffectsResult<()> {
        let mut state = self.state.borrow_mut();
        let metrics = state.metrics();
        state.renderer.initialize(&metrics)?;
        if state.renderer.start() == FrameRequest::Continue {
            state.request_frame(&self.frame);
        }
        Ok(())
    }

    /// Stops the loop and releases every browser resource. Idempotent.
    pub(crate) fn dispose(&mut self) {
        {
            let mut state = self.state.borrow_mut();
            if let Some(id) = state.animation_id.take() {
                if let Err(err) = state.window.cancel_animation_frame(id) {
                    debug!(error = ?err, "animation frame could not be cancelled");
                }
            }
            if let Some(id) = state.timeout_id.take() {
                state.window.clear_timeout_with_handle(id);
            }
            if let Some(resize) = self.resize.take() {
                if let Err(err) = state
                    .window
                    .remove_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())
                {
                    debug!(error = ?err, "resize listener could not be removed");
                }
            }
            state.renderer.dispose();
        }
        self.frame.borrow_mut().take();
        self.debounce.borrow_mut().take();
    }
}

impl Drop for EmberEffect {
    fn drop(&mut self) {
        self.dispose();
    }
}
