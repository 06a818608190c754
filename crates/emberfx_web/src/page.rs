//! Page-level mounting and the exported entry points.

use std::cell::RefCell;

use emberfx_core::{EffectsConfig, EffectsResult};
use tracing::{debug, info, warn};
use wasm_bindgen::prelude::*;

use crate::dom;
use crate::embers::EmberEffect;
use crate::parallax::ParallaxEffect;
use crate::reveal::RevealEffect;

thread_local! {
    static DEFAULT_EFFECTS: RefCell<Option<PageEffects>> = const { RefCell::new(None) };
}

/// Every effect mounted on one page.
struct PageEffects {
    embers: Option<EmberEffect>,
    parallax: Option<ParallaxEffect>,
    reveal: Option<RevealEffect>,
}

fn settle<T>(effect: &str, mounted: EffectsResult<Option<T>>) -> Option<T> {
    match mounted {
        Ok(value) => value,
        Err(err) => {
            debug!(effect, %err, "effect disabled");
            None
        }
    }
}

impl PageEffects {
    fn mount(config: &EffectsConfig) -> Self {
        let (window, document) = match dom::window().and_then(|w| dom::document(&w).map(|d| (w, d))) {
            Ok(pair) => pair,
            Err(err) => {
                warn!(%err, "no document, page effects disabled");
                return Self::none();
            }
        };

        let reduced_motion = dom::prefers_reduced_motion(&window);
        let effects = Self {
            parallax: settle(
                "parallax",
                ParallaxEffect::mount(&window, &document, &config.parallax, reduced_motion),
            ),
            embers: settle(
                "embers",
                EmberEffect::mount(&window, &document, config, reduced_motion),
            ),
            reveal: settle(
                "reveal",
                RevealEffect::mount(&window, &document, &config.reveal, reduced_motion),
            ),
        };
        info!(
            reduced_motion,
            embers = effects.embers.is_some(),
            parallax = effects.parallax.is_some(),
            reveal = effects.reveal.is_some(),
            "page effects mounted"
        );
        effects
    }

    fn none() -> Self {
        Self {
            embers: None,
            parallax: None,
            reveal: None,
        }
    }

    fn dispose(&mut self) {
        if let Some(mut embers) = self.embers.take() {
            embers.dispose();
        }
        if let Some(mut parallax) = self.parallax.take() {
            parallax.dispose();
        }
        if let Some(mut reveal) = self.reveal.take() {
            reveal.dispose();
        }
    }
}

/// Handle to effects mounted with [`mount`].
#[wasm_bindgen]
pub struct EffectsHandle {
    effects: PageEffects,
}

#[wasm_bindgen]
impl EffectsHandle {
    /// Stops every effect and releases its listeners, timers and frames.
    pub fn dispose(&mut self) {
        self.effects.dispose();
    }
}

/// Module start: installs the panic hook and mounts the default effects.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let effects = PageEffects::mount(&EffectsConfig::default());
    let previous = DEFAULT_EFFECTS.with(|cell| cell.borrow_mut().replace(effects));
    if let Some(mut previous) = previous {
        previous.dispose();
    }
}

/// Mounts the effects described by a TOML document (defaults when absent).
///
/// The auto-started default effects are disposed first.
///
/// # Errors
///
/// Returns the validation message when the configuration is invalid.
#[wasm_bindgen]
pub fn mount(config_toml: Option<String>) -> Result<EffectsHandle, JsValue> {
    let config = match config_toml {
        Some(text) => EffectsConfig::from_toml_str(&text),
        None => Ok(EffectsConfig::default()),
    }
    .map_err(|err| JsValue::from_str(&err.to_string()))?;

    dispose_default();
    Ok(EffectsHandle {
        effects: PageEffects::mount(&config),
    })
}

/// Disposes the effects mounted at module start, if still running.
#[wasm_bindgen]
pub fn dispose_default() {
    let effects = DEFAULT_EFFECTS.with(|cell| cell.borrow_mut().take());
    if let Some(mut effects) = effects {
        effects.dispose();
    }
}
