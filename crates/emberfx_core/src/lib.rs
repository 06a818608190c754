//! # EMBERFX Core
//!
//! Ambient page effects for a landing page hero:
//! - A full-bleed field of drifting, flickering ember glows
//! - Scroll parallax on the hero layers
//! - One-shot reveal of content as it scrolls into view
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     EMBER PIPELINE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  HostMetrics → SurfaceGeometry → EmberField (fixed pool)     │
//! │                                      ↓                       │
//! │               FrameCommands ← update (drift, flicker, respawn)│
//! │                     ↓                                        │
//! │        Surface::submit  (canvas 2D  |  software Pixmap)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure Rust and host-driven: the browser crate owns the
//! DOM, the clock and the animation frame callbacks.
//!
//! ## Quick start
//!
//! ```
//! use emberfx_core::{EmberConfig, EmberRenderer, FrameRequest, HostMetrics, Pixmap};
//!
//! let config = EmberConfig { seed: Some(7), ..EmberConfig::default() };
//! let mut renderer = EmberRenderer::new(config, false, Pixmap::new())?;
//! renderer.initialize(&HostMetrics::new(320.0, 180.0, 1.0, 1280.0))?;
//! assert_eq!(renderer.start(), FrameRequest::Continue);
//! renderer.frame();
//! assert!(renderer.surface().lit_texels() > 0);
//! # Ok::<(), emberfx_core::EffectsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod color;
pub mod config;
pub mod error;
pub mod field;
pub mod geometry;
pub mod parallax;
pub mod particle;
pub mod pixmap;
pub mod render;
pub mod renderer;
pub mod reveal;
pub mod schedule;

pub use color::{Hsla, Rgba};
pub use config::{EffectsConfig, EmberConfig, ParallaxConfig, ParallaxLayer, RevealConfig, Span};
pub use error::{EffectsError, EffectsResult};
pub use field::{EmberField, FieldStats, ResizeOutcome};
pub use geometry::{clamp_device_pixel_ratio, HostMetrics, SurfaceGeometry, ViewportClass};
pub use parallax::{LayerTransform, Parallax};
pub use particle::{respawn_band, Particle, SpawnPlacement};
pub use pixmap::{Pixmap, Texel};
pub use render::{BlendMode, DrawCommand, FrameCommands, Glow, Surface};
pub use renderer::EmberRenderer;
pub use reveal::{RevealMode, RevealTracker};
pub use schedule::{FrameLoop, FrameRequest, LoopState, LoopStats, ResizeDebouncer};
