//! Frame buffers and output descriptors.
//!
//! A [`FrameBuffer`] is a reusable block of pixel storage paired with the
//! renderer-native texture it is presented through. Exactly one side owns a
//! buffer at any time: the producer between `acquire` and `submit`, the
//! render thread while it sits in the free pool or is being displayed.
//! Buffers move by value through the event channel; there is no shared
//! ownership.

use crate::backend::TextureId;
use crate::format::PixelFormat;

/// Scan mode of the incoming video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interlacing {
    /// Full frames, no field structure.
    #[default]
    Progressive,
    /// Both fields merged into one frame, alternating lines.
    InterlacedMerged,
}

/// Geometry and format of the output, as requested by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDesc {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Pixel format of the frame data.
    pub pixel_format: PixelFormat,
    /// Scan mode.
    pub interlacing: Interlacing,
}

impl VideoDesc {
    /// Create a progressive descriptor.
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            pixel_format,
            interlacing: Interlacing::Progressive,
        }
    }

    /// Same descriptor with the given scan mode.
    pub fn with_interlacing(mut self, interlacing: Interlacing) -> Self {
        self.interlacing = interlacing;
        self
    }
}

/// Row stride of the frame buffers currently in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pitch {
    /// Planar layout, rows are densely packed per plane.
    Default,
    /// Packed layout with the given bytes per row.
    Bytes(usize),
}

/// A reusable frame buffer with its attached renderer texture.
#[derive(Debug)]
pub struct FrameBuffer {
    desc: VideoDesc,
    pitch: usize,
    data: Vec<u8>,
    texture: TextureId,
    generation: u64,
}

impl FrameBuffer {
    /// Allocate storage for one frame of `desc`, rows padded to `pitch`
    /// for packed formats.
    pub(crate) fn new(desc: VideoDesc, pitch: usize, texture: TextureId, generation: u64) -> Self {
        let size = if desc.pixel_format.is_planar() {
            desc.pixel_format.frame_size(desc.width, desc.height)
        } else {
            pitch * desc.height as usize
        };
        Self {
            desc,
            pitch,
            data: vec![0; size],
            texture,
            generation,
        }
    }

    /// The descriptor this buffer was allocated for.
    #[inline]
    pub fn desc(&self) -> VideoDesc {
        self.desc
    }

    /// Row stride of the pixel data in bytes.
    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// The pixel data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The pixel data, writable.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Handle of the attached renderer texture.
    #[inline]
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// Pool generation this buffer was allocated under.
    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }
}
