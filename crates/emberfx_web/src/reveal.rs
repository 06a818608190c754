//! Reveal-on-scroll glue over `IntersectionObserver`.

use std::cell::RefCell;
use std::rc::Rc;

use emberfx_core::{EffectsResult, RevealConfig, RevealMode, RevealTracker};
use js_sys::Array;
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    Window,
};

use crate::dom::{host_error, query_all};

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

fn mark_visible(element: &Element, class: &str) {
    if let Err(err) = element.class_list().add_1(class) {
        debug!(error = ?err, "reveal class could not be added");
    }
}

fn observer_supported(window: &Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

/// Observed reveal targets. Absent when everything was revealed up front.
pub(crate) struct RevealEffect {
    observer: IntersectionObserver,
    tracker: Rc<RefCell<RevealTracker<Element>>>,
    callback: Option<ObserverCallback>,
}

impl RevealEffect {
    /// Tags every matching element, immediately or as it scrolls into view.
    pub(crate) fn mount(
        window: &Window,
        document: &Document,
        config: &RevealConfig,
        reduced_motion: bool,
    ) -> EffectsResult<Option<Self>> {
        let elements = query_all(document, &config.selector)?;
        if elements.is_empty() {
            return Ok(None);
        }

        let mut tracker = RevealTracker::new(
            elements.iter().cloned(),
            config,
            reduced_motion,
            observer_supported(window),
        );
        let RevealMode::Observe { threshold } = tracker.mode() else {
            for element in tracker.initial_reveals() {
                mark_visible(&element, &config.visible_class);
            }
            return Ok(None);
        };

        let tracker = Rc::new(RefCell::new(tracker));
        let callback: ObserverCallback = {
            let tracker = Rc::clone(&tracker);
            let class = config.visible_class.clone();
            Closure::wrap(Box::new(move |entries: Array, observer: IntersectionObserver| {
                let mut tracker = tracker.borrow_mut();
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    let target = entry.target();
                    if tracker.on_intersection(&target, entry.is_intersecting()) {
                        mark_visible(&target, &class);
                        observer.unobserve(&target);
                    }
                }
                if tracker.is_complete() {
                    observer.disconnect();
                }
            }) as Box<dyn FnMut(Array, IntersectionObserver)>)
        };

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(f64::from(threshold)));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .map_err(host_error)?;
        for element in &elements {
            observer.observe(element);
        }
        debug!(targets = elements.len(), threshold, "reveal observing");

        Ok(Some(Self {
            observer,
            tracker,
            callback: Some(callback),
        }))
    }

    /// Stops observing. Elements already revealed keep their class.
    pub(crate) fn dispose(&mut self) {
        if let Some(callback) = self.callback.take() {
            self.observer.disconnect();
            drop(callback);
            debug!(
                revealed = self.tracker.borrow().revealed_count(),
                pending = self.tracker.borrow().pending_count(),
                "reveal disposed"
            );
        }
    }
}

impl Drop for RevealEffect {
    fn drop(&mut self) {
        self.dispose();
    }
}
