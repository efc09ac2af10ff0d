//! Fixed-capacity pool of reusable frame buffers.
//!
//! The pool owns every buffer the producer is not currently holding. It is
//! plain data: the session wraps it in the shared mutex, and the render
//! thread performs all texture creation/destruction while (re)building it.
//! Each rebuild bumps the generation counter; buffers carry the generation
//! they were allocated under so frames surviving across a rebuild can be
//! recognized and dropped instead of touching a destroyed texture.

use std::collections::VecDeque;

use crate::backend::RenderBackend;
use crate::error::{Error, Result};
use crate::format::native_format;
use crate::frame::{FrameBuffer, VideoDesc};

/// Number of buffers in the pool. Two is the double-buffering minimum: one
/// frame being filled while the other is displayed.
pub const BUFFER_COUNT: usize = 2;

/// The free-buffer queue plus the layout of the buffers in it.
#[derive(Debug, Default)]
pub(crate) struct FramePool {
    free: VecDeque<FrameBuffer>,
    desc: Option<VideoDesc>,
    pitch: usize,
    generation: u64,
    /// Frames posted to the render thread and not yet returned by it.
    in_flight: usize,
}

impl FramePool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Destroy any existing buffers, then allocate `BUFFER_COUNT` fresh
    /// ones sized per `desc`, each with its own streaming texture.
    ///
    /// All-or-nothing: if any texture creation fails, buffers created so
    /// far are destroyed again and the pool is left empty.
    pub(crate) fn initialize<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        desc: VideoDesc,
    ) -> Result<()> {
        // In-flight frames posted before the rebuild keep draining through
        // the render thread; the counter is left alone.
        self.teardown(backend);

        let native = native_format(desc.pixel_format).ok_or_else(|| {
            tracing::error!("no native format for {}", desc.pixel_format);
            Error::Format(desc.pixel_format)
        })?;

        self.generation += 1;
        for _ in 0..BUFFER_COUNT {
            let (texture, pitch) = match backend.create_texture(desc.width, desc.height, native) {
                Ok(created) => created,
                Err(e) => {
                    tracing::error!("unable to create texture: {}", e);
                    self.teardown(backend);
                    return Err(e);
                }
            };
            self.pitch = pitch;
            self.free
                .push_back(FrameBuffer::new(desc, pitch, texture, self.generation));
        }
        self.desc = Some(desc);

        Ok(())
    }

    /// Pop one free buffer. Callers needing to block wait on the session
    /// condvar and retry.
    pub(crate) fn acquire_free(&mut self) -> Option<FrameBuffer> {
        self.free.pop_front()
    }

    /// Return a buffer to the free queue, visible to the next acquire.
    pub(crate) fn release(&mut self, frame: FrameBuffer) {
        debug_assert!(self.free.len() < BUFFER_COUNT);
        debug_assert_eq!(frame.generation(), self.generation);
        self.free.push_back(frame);
    }

    /// Drain the free queue, destroying every buffer's texture.
    pub(crate) fn teardown<B: RenderBackend>(&mut self, backend: &mut B) {
        while let Some(frame) = self.free.pop_front() {
            backend.destroy_texture(frame.texture());
        }
        self.desc = None;
    }

    /// Whether `frame` was allocated by the latest rebuild.
    pub(crate) fn is_current(&self, frame: &FrameBuffer) -> bool {
        frame.generation() == self.generation
    }

    pub(crate) fn free_count(&self) -> usize {
        self.free.len()
    }

    /// A frame was posted on the event queue.
    pub(crate) fn note_posted(&mut self) {
        self.in_flight += 1;
    }

    /// A posted frame came back from the render thread.
    pub(crate) fn note_returned(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Frames handed to the render thread and not yet returned. A blocking
    /// submit only waits while this is nonzero; with nothing in flight no
    /// slot can ever free and waiting would deadlock the producer.
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Layout of the buffers currently in the pool.
    pub(crate) fn desc(&self) -> Option<VideoDesc> {
        self.desc
    }

    pub(crate) fn pitch(&self) -> usize {
        self.pitch
    }
}
