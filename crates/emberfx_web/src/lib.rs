//! # EMBERFX Web
//!
//! Binds the `emberfx_core` effects to a live page:
//! - `#embers` canvas painted through the Canvas 2D API
//! - `.hero-bg` / `.hero-image` parallax on scroll
//! - `.reveal` elements tagged `is-visible` as they enter the viewport
//!
//! ## Entry points
//!
//! ```text
//! module load ──► start()            panic hook + default effects
//! mount(toml?) ──► EffectsHandle     replaces the default effects
//! handle.dispose() / dispose_default()
//! ```
//!
//! Every effect degrades to a no-op on its own: a missing element, a missing
//! drawing context or a failed listener only disables that effect.

#![deny(missing_docs)]
// Note: #[wasm_bindgen] expands exports into unsafe ABI glue
#![allow(unsafe_code)]
#![warn(clippy::pedantic)]

#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod embers;
#[cfg(target_arch = "wasm32")]
mod page;
#[cfg(target_arch = "wasm32")]
mod parallax;
#[cfg(target_arch = "wasm32")]
mod reveal;

#[cfg(target_arch = "wasm32")]
pub use page::{dispose_default, mount, start, EffectsHandle};
