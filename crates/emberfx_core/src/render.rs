//! Draw command recording.
//!
//! The field never touches a surface directly: it records a frame of
//! commands, and a [`Surface`] backend replays them. The browser canvas and
//! the software [`Pixmap`](crate::pixmap::Pixmap) consume the same stream.
//!
//! ## Blending
//!
//! Embers use **additive** compositing: overlapping glows brighten, never
//! darken, and no sorting is needed (A+B = B+A). Normal source-over is
//! restored at the end of every frame.

use crate::color::Hsla;
use crate::error::EffectsResult;
use crate::geometry::SurfaceGeometry;

/// Compositing mode for subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Classic alpha blending (ONE + ONE_MINUS_SRC_ALPHA, premultiplied).
    #[default]
    SourceOver,
    /// Additive blending (ONE + ONE), for glows.
    Lighter,
}

impl BlendMode {
    /// Canvas 2D `globalCompositeOperation` name.
    #[must_use]
    pub const fn composite_operation(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::Lighter => "lighter",
        }
    }

    /// Returns true if overlapping draws can only brighten.
    #[must_use]
    pub const fn is_additive(self) -> bool {
        matches!(self, Self::Lighter)
    }
}

/// A soft radial glow: `color` at the center fading to transparent at `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    /// Center x (logical px).
    pub x: f32,
    /// Center y (logical px).
    pub y: f32,
    /// Outer radius (logical px).
    pub radius: f32,
    /// Center color; `color.a` is the center opacity.
    pub color: Hsla,
}

/// A render command for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Clear the whole surface to transparent.
    Clear,
    /// Switch compositing mode.
    SetBlend(BlendMode),
    /// Paint a glow.
    Glow(Glow),
}

/// The commands of one frame, reused across frames.
#[derive(Debug, Clone, Default)]
pub struct FrameCommands {
    commands: Vec<DrawCommand>,
}

impl FrameCommands {
    /// Creates an empty recording sized for `glows` glows.
    #[must_use]
    pub fn with_capacity(glows: usize) -> Self {
        Self {
            commands: Vec::with_capacity(glows + 3),
        }
    }

    /// Drops the previous frame, keeping the allocation.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
    }

    /// Adds a command.
    #[inline]
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Recorded commands, in order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates over recorded glows only.
    pub fn glows(&self) -> impl Iterator<Item = &Glow> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Glow(glow) => Some(glow),
            _ => None,
        })
    }
}

/// A raster target the ember field can paint on.
///
/// Coordinates in commands are logical; the surface applies its own scale.
pub trait Surface {
    /// Sizes the backing store and display size to `geometry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the new size or transform.
    fn configure(&mut self, geometry: &SurfaceGeometry) -> EffectsResult<()>;

    /// Clears everything to transparent.
    fn clear(&mut self);

    /// Switches the compositing mode for subsequent glows.
    fn set_blend(&mut self, mode: BlendMode);

    /// Paints one glow.
    fn fill_glow(&mut self, glow: &Glow);

    /// Replays a recorded frame.
    fn submit(&mut self, frame: &FrameCommands) {
        for command in frame.commands() {
            match command {
                DrawCommand::Clear => self.clear(),
                DrawCommand::SetBlend(mode) => self.set_blend(*mode),
                DrawCommand::Glow(glow) => self.fill_glow(glow),
            }
        }
    }
}
