//! Small DOM helpers shared by the effects.

use emberfx_core::{EffectsError, EffectsResult, HostMetrics};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{AddEventListenerOptions, Document, Element, HtmlElement, Window};

pub(crate) fn window() -> EffectsResult<Window> {
    web_sys::window().ok_or_else(|| EffectsError::MissingElement("window".into()))
}

pub(crate) fn document(window: &Window) -> EffectsResult<Document> {
    window
        .document()
        .ok_or_else(|| EffectsError::MissingElement("document".into()))
}

/// Stringifies a thrown JS value.
pub(crate) fn host_error(value: JsValue) -> EffectsError {
    EffectsError::Host(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

pub(crate) fn query(document: &Document, selector: &str) -> EffectsResult<Option<Element>> {
    document.query_selector(selector).map_err(host_error)
}

pub(crate) fn query_html(document: &Document, selector: &str) -> EffectsResult<Option<HtmlElement>> {
    Ok(query(document, selector)?.and_then(|element| element.dyn_into::<HtmlElement>().ok()))
}

pub(crate) fn query_all(document: &Document, selector: &str) -> EffectsResult<Vec<Element>> {
    let nodes = document.query_selector_all(selector).map_err(host_error)?;
    Ok((0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

/// Reads `prefers-reduced-motion` once. No media query support means no preference.
pub(crate) fn prefers_reduced_motion(window: &Window) -> bool {
    window
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .is_some_and(|query| query.matches())
}

/// Host clock in milliseconds.
pub(crate) fn now_ms(window: &Window) -> f64 {
    window.performance().map_or(0.0, |performance| performance.now())
}

pub(crate) fn scroll_y(window: &Window) -> f32 {
    window.scroll_y().unwrap_or(0.0) as f32
}

/// Samples the container box, pixel ratio and viewport width.
pub(crate) fn host_metrics(window: &Window, container: &Element) -> HostMetrics {
    let viewport_width = window
        .inner_width()
        .ok()
        .and_then(|width| width.as_f64())
        .unwrap_or(0.0);
    HostMetrics::new(
        container.client_width() as f32,
        container.client_height() as f32,
        window.device_pixel_ratio() as f32,
        viewport_width as f32,
    )
}

pub(crate) fn passive_listener() -> AddEventListenerOptions {
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    options
}
