//! Scroll parallax glue.

use std::cell::RefCell;
use std::rc::Rc;

use emberfx_core::{EffectsResult, Parallax, ParallaxConfig};
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::dom::{host_error, passive_listener, query_html, scroll_y};

struct ParallaxState {
    parallax: Parallax,
    elements: Vec<HtmlElement>,
    window: Window,
    pending_frame: Option<i32>,
    css: String,
}

impl ParallaxState {
    fn apply(&mut self) {
        self.pending_frame = None;
        let transforms = self.parallax.apply(scroll_y(&self.window));
        for (element, transform) in self.elements.iter().zip(transforms) {
            transform.write_css(&mut self.css);
            if let Err(err) = element.style().set_property("transform", &self.css) {
                debug!(error = ?err, "parallax transform rejected");
            }
        }
    }

    fn on_scroll(&mut self, apply: &Closure<dyn FnMut()>) {
        if !self.parallax.on_scroll() {
            return;
        }
        match self.window.request_animation_frame(apply.as_ref().unchecked_ref()) {
            Ok(id) => self.pending_frame = Some(id),
            Err(_) => self.apply(),
        }
    }
}

/// Parallax bound to the hero layers found on the page.
///
/// The frame callback lives inside the scroll listener and is released with it.
pub(crate) struct ParallaxEffect {
    state: Rc<RefCell<ParallaxState>>,
    scroll: Option<Closure<dyn FnMut()>>,
}

impl ParallaxEffect {
    /// Returns `Ok(None)` with reduced motion or when no layer is on the page.
    pub(crate) fn mount(
        window: &Window,
        document: &Document,
        config: &ParallaxConfig,
        reduced_motion: bool,
    ) -> EffectsResult<Option<Self>> {
        let mut layers = Vec::new();
        let mut elements = Vec::new();
        for layer in &config.layers {
            if let Some(element) = query_html(document, &layer.selector)? {
                layers.push(layer.clone());
                elements.push(element);
            }
        }

        let parallax = Parallax::new(layers, reduced_motion);
        if !parallax.is_enabled() {
            debug!(reduced_motion, layers = elements.len(), "parallax disabled");
            return Ok(None);
        }

        let state = Rc::new(RefCell::new(ParallaxState {
            parallax,
            elements,
            window: window.clone(),
            pending_frame: None,
            css: String::with_capacity(48),
        }));

        let apply = {
            let state = Rc::clone(&state);
            Closure::wrap(Box::new(move || {
                state.borrow_mut().apply();
            }) as Box<dyn FnMut()>)
        };
        let scroll = {
            let state = Rc::clone(&state);
            Closure::wrap(Box::new(move || {
                state.borrow_mut().on_scroll(&apply);
            }) as Box<dyn FnMut()>)
        };
        window
            .add_event_listener_with_callback_and_add_event_listener_options(
                "scroll",
                scroll.as_ref().unchecked_ref(),
                &passive_listener(),
            )
            .map_err(host_error)?;

        state.borrow_mut().apply();
        Ok(Some(Self {
            state,
            scroll: Some(scroll),
        }))
    }

    /// Removes the scroll listener and any pending frame. Idempotent.
    pub(crate) fn dispose(&mut self) {
        let mut state = self.state.borrow_mut();
        if let Some(id) = state.pending_frame.take() {
            if let Err(err) = state.window.cancel_animation_frame(id) {
                debug!(error = ?err, "parallax frame could not be cancelled");
            }
        }
        if let Some(scroll) = self.scroll.take() {
            if let Err(err) = state
                .window
                .remove_event_listener_with_callback("scroll", scroll.as_ref().unchecked_ref())
            {
                debug!(error = ?err, "scroll listener could not be removed");
            }
            debug!(applications = state.parallax.applications(), "parallax disposed");
        }
    }
}

impl Drop for ParallaxEffect {
    fn drop(&mut self) {
        self.dispose();
    }
}
