//! Render backend capability interface.
//!
//! The event loop and the reconfiguration algorithm drive a concrete
//! graphics stack only through [`RenderBackend`], so they stay agnostic of
//! the windowing system in use. An implementation owns the window, the
//! output surface and all textures; the trait is only ever called from the
//! render thread.
//!
//! [`HeadlessBackend`] is the in-memory software implementation used by the
//! test suite and for development without a display.

mod headless;

pub use headless::{BackendOp, HeadlessBackend, Probe};

use crate::error::Result;
use crate::format::NativeFormat;

/// Opaque handle of a renderer-native texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Window creation flags, user-requested bits plus the ones the
/// reconfiguration algorithm always sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowFlags {
    /// Window can be resized by the user.
    pub resizable: bool,
    /// Request a high-DPI capable surface.
    pub high_dpi: bool,
    /// Borderless window.
    pub borderless: bool,
    /// Desktop fullscreen.
    pub fullscreen: bool,
    /// Raw backend-specific flag bits passed through unchanged.
    pub raw: u32,
}

/// Initial window placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPos {
    /// Centered on the given display.
    Centered {
        /// Display index.
        display: u32,
    },
    /// Explicit position in desktop coordinates.
    At {
        /// X coordinate.
        x: i32,
        /// Y coordinate.
        y: i32,
    },
}

/// Everything needed to create the window and output surface.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Window title.
    pub title: String,
    /// Initial placement.
    pub pos: WindowPos,
    /// Window width in pixels.
    pub width: u32,
    /// Window height in pixels.
    pub height: u32,
    /// Creation flags.
    pub flags: WindowFlags,
    /// Sync presentation to vertical blank.
    pub vsync: bool,
    /// Specific renderer to use, backend-defined indexing.
    pub renderer_index: Option<u32>,
    /// Video driver name override.
    pub driver: Option<String>,
}

/// Capability interface to the concrete graphics stack.
///
/// All methods are called from the render thread only. Creation calls are
/// fallible; presentation calls report failures so the loop can log them,
/// but a failed present never stops the loop.
pub trait RenderBackend: Send {
    /// Create the window and accelerated output surface, destroying any
    /// previous output first. Implementations configure the surface with
    /// linear scaling quality and the requested vsync. Returns the
    /// identity of the renderer in use.
    fn create_output(&mut self, opts: &OutputOptions) -> Result<String>;

    /// Destroy the window and surface if present.
    fn destroy_output(&mut self);

    /// Whether an output currently exists.
    fn has_output(&self) -> bool;

    /// Set the logical content size the surface scales from.
    fn set_logical_size(&mut self, width: u32, height: u32) -> Result<()>;

    /// Resize the window.
    fn set_window_size(&mut self, width: u32, height: u32);

    /// Set the window title.
    fn set_title(&mut self, title: &str);

    /// Switch desktop fullscreen on or off.
    fn set_fullscreen(&mut self, fullscreen: bool);

    /// Create a streaming texture. Returns its handle and row pitch.
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: NativeFormat,
    ) -> Result<(TextureId, usize)>;

    /// Destroy a texture. Unknown handles are ignored.
    fn destroy_texture(&mut self, id: TextureId);

    /// Upload a frame's pixels into its texture.
    fn upload(&mut self, id: TextureId, data: &[u8], pitch: usize) -> Result<()>;

    /// Clear the output surface.
    fn clear(&mut self);

    /// Copy a texture to the surface and flip.
    fn present(&mut self, id: TextureId) -> Result<()>;
}
