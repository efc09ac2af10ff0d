//! Session construction and the producer-facing handle.
//!
//! [`open`] wires up the shared state and returns the two halves of a
//! display session: a cloneable [`DisplayHandle`] for the producer threads
//! and a [`RenderLoop`] to be run on a dedicated render thread. The handle
//! implements the acquire/submit protocol, the synchronous reconfiguration
//! call and the control channel; everything it does crosses over to the
//! render thread through the serialized event queue.
//!
//! # Example
//!
//! ```rust,ignore
//! use vitrine::prelude::*;
//!
//! let (handle, render) = vitrine::open(
//!     DisplayConfig::default(),
//!     HeadlessBackend::new(),
//!     NullKeySink,
//! );
//! let render_thread = std::thread::spawn(move || render.run());
//!
//! handle.reconfigure(VideoDesc::new(1920, 1080, PixelFormat::Uyvy))?;
//! let mut frame = handle.acquire();
//! // ... fill frame.data_mut() ...
//! handle.submit(frame, SubmitMode::Blocking)?;
//!
//! handle.shutdown()?;
//! render_thread.join().unwrap();
//! ```

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::backend::RenderBackend;
use crate::config::DisplayConfig;
use crate::control::{ControlRequest, ControlResponse, KeySink};
use crate::error::{Error, Result};
use crate::event::{self, Event, EventSender, ReconfigureRequest, ReconfigureStatus};
use crate::format::{self, PixelFormat};
use crate::frame::{FrameBuffer, Pitch, VideoDesc};
use crate::handshake::Completion;
use crate::pool::FramePool;
use crate::render::RenderLoop;

/// State shared between the producer handle and the render loop.
pub(crate) struct Shared {
    /// Free-buffer queue; one lock for submit/acquire/rebuild.
    pub(crate) pool: Mutex<FramePool>,
    /// Signalled whenever a buffer returns to the free queue.
    pub(crate) frame_consumed: Condvar,
    /// The serialized event source.
    pub(crate) events: EventSender,
    /// Queued control commands, drained by the render thread.
    pub(crate) control_tx: kanal::Sender<ControlRequest>,
    /// Formats advertised to the pipeline; fixed at session start.
    pub(crate) capabilities: SmallVec<[PixelFormat; 8]>,
}

/// How `submit` behaves when the free pool is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Return the frame to the free pool without displaying it.
    Discard,
    /// Wait until a pool slot frees before posting the frame.
    Blocking,
    /// Wait up to the given duration, then drop the incoming frame.
    Timed(Duration),
    /// Post without waiting. For redraws of an already-held frame, not for
    /// new producer frames.
    NonBlocking,
}

/// Outcome of a `submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// The frame was handed to the render thread (or recycled, for
    /// `Discard`).
    Accepted,
    /// The pool stayed exhausted past the timeout; the frame was recycled
    /// undisplayed.
    Dropped,
}

/// Producer-facing half of a display session.
#[derive(Clone)]
pub struct DisplayHandle {
    shared: Arc<Shared>,
}

impl DisplayHandle {
    /// Take a free frame buffer, blocking until one is available.
    ///
    /// Ownership transfers to the caller until the buffer is passed back
    /// through [`DisplayHandle::submit`].
    pub fn acquire(&self) -> FrameBuffer {
        let mut pool = self.shared.pool.lock().unwrap();
        loop {
            if let Some(frame) = pool.acquire_free() {
                return frame;
            }
            pool = self.shared.frame_consumed.wait(pool).unwrap();
        }
    }

    /// Hand a filled frame to the render thread.
    ///
    /// Ownership transfers at post time; the buffer reappears in the free
    /// pool after it has been displayed. `Blocking` and `Timed` gate the
    /// post on a free pool slot, bounding the number of frames in flight.
    pub fn submit(&self, frame: FrameBuffer, mode: SubmitMode) -> Result<SubmitStatus> {
        let mut pool = self.shared.pool.lock().unwrap();
        match mode {
            SubmitMode::Discard => {
                if pool.is_current(&frame) {
                    pool.release(frame);
                    drop(pool);
                    self.shared.frame_consumed.notify_all();
                    return Ok(SubmitStatus::Accepted);
                }
                // Stale frame: its texture is owned by the render thread,
                // so it crosses over to be destroyed there.
                pool.note_posted();
                drop(pool);
                self.shared.events.send(Event::NewFrame(Some(frame)))?;
                return Ok(SubmitStatus::Accepted);
            }
            SubmitMode::Blocking => {
                while pool.free_count() == 0 && pool.in_flight() > 0 {
                    pool = self.shared.frame_consumed.wait(pool).unwrap();
                }
            }
            SubmitMode::Timed(timeout) => {
                let deadline = Instant::now() + timeout;
                while pool.free_count() == 0 && pool.in_flight() > 0 {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        break;
                    }
                    let (guard, _) = self
                        .shared
                        .frame_consumed
                        .wait_timeout(pool, remaining)
                        .unwrap();
                    pool = guard;
                }
                if pool.free_count() == 0 && pool.in_flight() > 0 {
                    if pool.is_current(&frame) {
                        pool.release(frame);
                        drop(pool);
                        self.shared.frame_consumed.notify_all();
                    } else {
                        // Stale texture; the render thread must destroy it.
                        pool.note_posted();
                        drop(pool);
                        self.shared.events.send(Event::NewFrame(Some(frame)))?;
                    }
                    tracing::info!("1 frame dropped");
                    return Ok(SubmitStatus::Dropped);
                }
            }
            SubmitMode::NonBlocking => {}
        }
        pool.note_posted();
        drop(pool);

        self.shared.events.send(Event::NewFrame(Some(frame)))?;
        Ok(SubmitStatus::Accepted)
    }

    /// Post the shutdown sentinel. Frames already queued are displayed
    /// first; the render loop then stops.
    pub fn shutdown(&self) -> Result<()> {
        self.shared.events.send(Event::NewFrame(None))
    }

    /// Change output geometry/format.
    ///
    /// Blocks until the render thread has torn down and rebuilt its
    /// resources. On failure the previous configuration, if any, stays in
    /// effect, but the buffer pool is empty and frames acquired before
    /// the call must not be submitted for display.
    pub fn reconfigure(&self, desc: VideoDesc) -> Result<()> {
        let done = Completion::new();
        self.shared.events.send(Event::Reconfigure(ReconfigureRequest {
            desc,
            done: done.clone(),
        }))?;
        match done.wait() {
            ReconfigureStatus::Applied => Ok(()),
            ReconfigureStatus::Failed => {
                Err(Error::Resource("reconfiguration failed".into()))
            }
        }
    }

    /// The pixel formats this consumer accepts.
    pub fn capabilities(&self) -> &[PixelFormat] {
        &self.shared.capabilities
    }

    /// Row stride of the buffers in the current configuration.
    ///
    /// Planar formats report [`Pitch::Default`]: the producer writes
    /// densely packed lines. Before the first successful reconfiguration
    /// this also reports `Default`.
    pub fn pitch(&self) -> Pitch {
        let pool = self.shared.pool.lock().unwrap();
        match pool.desc() {
            Some(desc) if !desc.pixel_format.is_planar() => Pitch::Bytes(pool.pitch()),
            _ => Pitch::Default,
        }
    }

    /// Number of buffers currently in the free pool.
    pub fn free_frames(&self) -> usize {
        self.shared.pool.lock().unwrap().free_count()
    }

    /// Send a control-channel command and wait for the structured reply.
    ///
    /// Recognized commands: `win-title <text>` and a lone integer logical
    /// key code.
    pub fn send_command(&self, text: &str) -> Result<ControlResponse> {
        let done = Completion::new();
        self.shared
            .control_tx
            .send(ControlRequest {
                text: text.to_string(),
                done: done.clone(),
            })
            .map_err(|_| Error::ChannelClosed)?;
        self.shared.events.send(Event::Control)?;
        Ok(done.wait())
    }

    /// The event sender, for the platform layer to inject input events.
    pub fn events(&self) -> EventSender {
        self.shared.events.clone()
    }
}

/// Create a display session.
///
/// Returns the producer handle and the render loop; the loop must be moved
/// to a dedicated thread and [`RenderLoop::run`] called there. No window
/// exists until the first [`DisplayHandle::reconfigure`].
pub fn open<B, K>(config: DisplayConfig, backend: B, key_sink: K) -> (DisplayHandle, RenderLoop<B>)
where
    B: RenderBackend,
    K: KeySink + 'static,
{
    let (event_tx, event_rx) = event::channel();
    let (control_tx, control_rx) = kanal::unbounded();

    let shared = Arc::new(Shared {
        pool: Mutex::new(FramePool::new()),
        frame_consumed: Condvar::new(),
        events: event_tx,
        control_tx,
        capabilities: format::supported_formats(config.extended_formats),
    });

    let handle = DisplayHandle {
        shared: shared.clone(),
    };
    let render = RenderLoop::new(shared, backend, event_rx, control_rx, config, Box::new(key_sink));
    (handle, render)
}
