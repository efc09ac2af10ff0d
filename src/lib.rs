//! # Vitrine
//!
//! The display-output stage of a real-time video transport pipeline.
//!
//! A producer (decoder/receiver threads) acquires frame buffers from a
//! bounded pool, fills them, and submits them for display; a dedicated
//! render thread owns the window, the output surface and every texture,
//! and serializes rendering, cross-thread reconfiguration, control-channel
//! commands and input translation over one event queue.
//!
//! ## Protocol
//!
//! - [`DisplayHandle::acquire`] blocks until a pool buffer is free and
//!   transfers it to the producer.
//! - [`DisplayHandle::submit`] hands a filled buffer back, with blocking,
//!   timed-drop, discard and non-blocking policies.
//! - [`DisplayHandle::reconfigure`] changes output geometry/format: a
//!   synchronous handshake that rebuilds GPU-backed resources on the
//!   render thread while the requester blocks.
//! - [`DisplayHandle::shutdown`] posts a sentinel through the frame path;
//!   the render loop drains everything queued before it, then stops.
//!
//! The concrete graphics stack sits behind the [`backend::RenderBackend`]
//! capability trait; [`backend::HeadlessBackend`] is the in-memory
//! implementation used for tests and development.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use vitrine::prelude::*;
//!
//! let (handle, render) = vitrine::open(
//!     DisplayConfig::default(),
//!     HeadlessBackend::new(),
//!     NullKeySink,
//! );
//! std::thread::spawn(move || render.run());
//!
//! handle.reconfigure(VideoDesc::new(1920, 1080, PixelFormat::Uyvy))?;
//! loop {
//!     let mut frame = handle.acquire();
//!     fill(frame.data_mut());
//!     handle.submit(frame, SubmitMode::Blocking)?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod control;
pub mod error;
pub mod event;
pub mod format;
pub mod frame;
pub mod handshake;
pub mod input;
pub mod render;
pub mod session;

mod deint;
mod pool;

pub use pool::BUFFER_COUNT;
pub use session::{open, DisplayHandle};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::backend::{HeadlessBackend, RenderBackend};
    pub use crate::config::{DeintMode, DisplayConfig};
    pub use crate::control::{ControlResponse, KeySink, NullKeySink};
    pub use crate::error::{Error, Result};
    pub use crate::format::PixelFormat;
    pub use crate::frame::{FrameBuffer, Interlacing, Pitch, VideoDesc};
    pub use crate::render::RenderLoop;
    pub use crate::session::{open, DisplayHandle, SubmitMode, SubmitStatus};
}

pub use error::{Error, Result};
