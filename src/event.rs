//! The serialized event source feeding the render loop.
//!
//! Everything that reaches the render thread (new frames, reconfiguration
//! requests, control-channel wake-ups, translated platform input, quit)
//! travels through one multi-producer/single-consumer channel as a tagged
//! [`Event`]. Ordering across event kinds is FIFO relative to post time;
//! there is no priority reordering. A `NewFrame(None)` is the shutdown
//! sentinel.

use crate::error::{Error, Result};
use crate::frame::{FrameBuffer, VideoDesc};
use crate::handshake::Completion;
use crate::input::KeySym;

/// Outcome of a reconfiguration handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconfigureStatus {
    /// The output now matches the requested descriptor.
    Applied,
    /// Resource creation failed; the prior configuration (if any) stands.
    Failed,
}

/// A cross-thread reconfiguration request, resolved exactly once by the
/// render thread.
#[derive(Debug)]
pub struct ReconfigureRequest {
    /// Target output descriptor.
    pub desc: VideoDesc,
    /// Handshake slot the requester blocks on.
    pub done: Completion<ReconfigureStatus>,
}

/// Raw platform input forwarded into the event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press.
    Key(KeySym),
    /// The window was resized by the user.
    Resized {
        /// New width in pixels.
        width: i32,
        /// New height in pixels.
        height: i32,
    },
    /// The window was exposed and needs a redraw.
    Exposed,
    /// The window size changed (programmatically or by the user).
    SizeChanged,
}

/// Events consumed by the render loop.
#[derive(Debug)]
pub enum Event {
    /// A filled frame to display, or `None` as the shutdown sentinel.
    NewFrame(Option<FrameBuffer>),
    /// Synchronous reconfiguration request.
    Reconfigure(ReconfigureRequest),
    /// Control requests are pending on the control channel.
    Control,
    /// Raw platform input.
    Input(InputEvent),
    /// External quit signal.
    Quit,
}

impl Event {
    /// Human-readable name of the event kind.
    pub fn name(&self) -> &'static str {
        match self {
            Event::NewFrame(Some(_)) => "new-frame",
            Event::NewFrame(None) => "shutdown-sentinel",
            Event::Reconfigure(_) => "reconfigure",
            Event::Control => "control",
            Event::Input(_) => "input",
            Event::Quit => "quit",
        }
    }
}

/// Create the event channel: many producers, one render-thread consumer.
pub(crate) fn channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = kanal::unbounded();
    (EventSender { inner: tx }, EventReceiver { inner: rx })
}

/// Sending half of the event queue. Cloneable; used by the producer-facing
/// handle and by the platform layer injecting input events.
#[derive(Clone)]
pub struct EventSender {
    inner: kanal::Sender<Event>,
}

impl EventSender {
    /// Post an event, FIFO with respect to all other posters.
    pub fn send(&self, event: Event) -> Result<()> {
        self.inner.send(event).map_err(|_| Error::ChannelClosed)
    }
}

/// Receiving half, owned by the render loop.
pub struct EventReceiver {
    inner: kanal::Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event. `None` once every sender is gone.
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Non-blocking receive, used when draining after shutdown.
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;
    use std::thread;

    #[test]
    fn test_fifo_across_threads() {
        let (tx, rx) = channel();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let tx = tx.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    tx.send(Event::Control).unwrap();
                }
                tx.send(Event::Quit).unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut controls = 0;
        let mut quits = 0;
        while let Some(event) = rx.try_recv() {
            match event {
                Event::Control => controls += 1,
                Event::Quit => quits += 1,
                other => panic!("unexpected event {}", other.name()),
            }
        }
        assert_eq!(controls, 200);
        assert_eq!(quits, 4);
    }

    #[test]
    fn test_sentinel_name() {
        assert_eq!(Event::NewFrame(None).name(), "shutdown-sentinel");
        let desc = VideoDesc::new(2, 2, PixelFormat::Rgba32);
        let request = ReconfigureRequest {
            desc,
            done: Completion::new(),
        };
        assert_eq!(Event::Reconfigure(request).name(), "reconfigure");
    }
}
