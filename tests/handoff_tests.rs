//! Integration tests for the producer/render-thread frame handoff.
//!
//! These tests verify that:
//! - The pool invariant holds at every quiescent point
//! - Blocking submission backpressures instead of growing memory
//! - Timed submission drops the incoming frame within its bound
//! - The shutdown sentinel stops the loop in FIFO order

use std::thread;
use std::time::{Duration, Instant};

use vitrine::backend::{
    HeadlessBackend, OutputOptions, Probe, RenderBackend, TextureId,
};
use vitrine::config::DisplayConfig;
use vitrine::control::NullKeySink;
use vitrine::format::{NativeFormat, PixelFormat};
use vitrine::frame::VideoDesc;
use vitrine::session::{open, DisplayHandle, SubmitMode, SubmitStatus};
use vitrine::{Result, BUFFER_COUNT};

fn desc() -> VideoDesc {
    VideoDesc::new(1920, 1080, PixelFormat::Uyvy)
}

fn start<B: RenderBackend + 'static>(
    config: DisplayConfig,
    backend: B,
) -> (DisplayHandle, thread::JoinHandle<()>) {
    let (handle, render) = open(config, backend, NullKeySink);
    let render_thread = thread::spawn(move || render.run());
    (handle, render_thread)
}

fn wait_for(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        thread::sleep(Duration::from_millis(1));
    }
}

/// Headless backend that takes a while to present, so the pool can be
/// driven to exhaustion deterministically.
struct SlowBackend {
    inner: HeadlessBackend,
    present_delay: Duration,
}

impl SlowBackend {
    fn new(present_delay: Duration) -> Self {
        Self {
            inner: HeadlessBackend::new(),
            present_delay,
        }
    }

    fn probe(&self) -> Probe {
        self.inner.probe()
    }
}

impl RenderBackend for SlowBackend {
    fn create_output(&mut self, opts: &OutputOptions) -> Result<String> {
        self.inner.create_output(opts)
    }

    fn destroy_output(&mut self) {
        self.inner.destroy_output()
    }

    fn has_output(&self) -> bool {
        self.inner.has_output()
    }

    fn set_logical_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.inner.set_logical_size(width, height)
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.inner.set_window_size(width, height)
    }

    fn set_title(&mut self, title: &str) {
        self.inner.set_title(title)
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.inner.set_fullscreen(fullscreen)
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: NativeFormat,
    ) -> Result<(TextureId, usize)> {
        self.inner.create_texture(width, height, format)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.inner.destroy_texture(id)
    }

    fn upload(&mut self, id: TextureId, data: &[u8], pitch: usize) -> Result<()> {
        self.inner.upload(id, data, pitch)
    }

    fn clear(&mut self) {
        self.inner.clear()
    }

    fn present(&mut self, id: TextureId) -> Result<()> {
        thread::sleep(self.present_delay);
        self.inner.present(id)
    }
}

#[test]
fn test_acquire_submit_drain_end_to_end() {
    let backend = HeadlessBackend::new();
    let probe = backend.probe();
    let (handle, render_thread) = start(DisplayConfig::default(), backend);

    handle.reconfigure(desc()).unwrap();
    assert_eq!(handle.free_frames(), BUFFER_COUNT);

    let mut a = handle.acquire();
    let mut b = handle.acquire();
    assert_eq!(handle.free_frames(), 0);

    a.data_mut().fill(0x40);
    b.data_mut().fill(0x80);

    assert_eq!(
        handle.submit(a, SubmitMode::Blocking).unwrap(),
        SubmitStatus::Accepted
    );
    assert_eq!(
        handle.submit(b, SubmitMode::Blocking).unwrap(),
        SubmitStatus::Accepted
    );

    wait_for(|| handle.free_frames() == BUFFER_COUNT);
    assert_eq!(probe.presented(), 2);

    handle.shutdown().unwrap();
    render_thread.join().unwrap();
}

#[test]
fn test_pool_invariant_over_many_cycles() {
    let backend = HeadlessBackend::new();
    let (handle, render_thread) = start(DisplayConfig::default(), backend);
    handle.reconfigure(desc()).unwrap();

    for _ in 0..50 {
        let frame = handle.acquire();
        assert!(handle.free_frames() < BUFFER_COUNT);
        handle.submit(frame, SubmitMode::Blocking).unwrap();
    }

    wait_for(|| handle.free_frames() == BUFFER_COUNT);
    handle.shutdown().unwrap();
    render_thread.join().unwrap();
}

#[test]
fn test_discard_recycles_without_display() {
    let backend = HeadlessBackend::new();
    let probe = backend.probe();
    let (handle, render_thread) = start(DisplayConfig::default(), backend);
    handle.reconfigure(desc()).unwrap();

    let frame = handle.acquire();
    assert_eq!(handle.free_frames(), BUFFER_COUNT - 1);

    assert_eq!(
        handle.submit(frame, SubmitMode::Discard).unwrap(),
        SubmitStatus::Accepted
    );
    assert_eq!(handle.free_frames(), BUFFER_COUNT);
    assert_eq!(probe.presented(), 0);

    handle.shutdown().unwrap();
    render_thread.join().unwrap();
}

#[test]
fn test_blocking_submit_backpressures() {
    let backend = SlowBackend::new(Duration::from_millis(100));
    let (handle, render_thread) = start(DisplayConfig::default(), backend);
    handle.reconfigure(desc()).unwrap();

    let a = handle.acquire();
    let b = handle.acquire();

    // Nothing in flight yet: the first submit must not wait.
    let start_t = Instant::now();
    handle.submit(a, SubmitMode::Blocking).unwrap();
    assert!(start_t.elapsed() < Duration::from_millis(50));

    // The second submit waits for the first frame to come back.
    let start_t = Instant::now();
    handle.submit(b, SubmitMode::Blocking).unwrap();
    assert!(start_t.elapsed() >= Duration::from_millis(50));

    wait_for(|| handle.free_frames() == BUFFER_COUNT);
    handle.shutdown().unwrap();
    render_thread.join().unwrap();
}

#[test]
fn test_timed_submit_drops_within_bound() {
    let backend = SlowBackend::new(Duration::from_millis(300));
    let probe = backend.probe();
    let (handle, render_thread) = start(DisplayConfig::default(), backend);
    handle.reconfigure(desc()).unwrap();

    let a = handle.acquire();
    let b = handle.acquire();

    handle.submit(a, SubmitMode::NonBlocking).unwrap();

    let start_t = Instant::now();
    let status = handle
        .submit(b, SubmitMode::Timed(Duration::from_millis(30)))
        .unwrap();
    assert_eq!(status, SubmitStatus::Dropped);
    assert!(start_t.elapsed() < Duration::from_millis(200));

    // The dropped frame went straight back to the free queue.
    assert_eq!(handle.free_frames(), 1);

    wait_for(|| handle.free_frames() == BUFFER_COUNT);
    assert_eq!(probe.presented(), 1);

    handle.shutdown().unwrap();
    render_thread.join().unwrap();
}

#[test]
fn test_sentinel_stops_loop_after_queued_frames() {
    let backend = HeadlessBackend::new();
    let probe = backend.probe();
    let (handle, render_thread) = start(DisplayConfig::default(), backend);
    handle.reconfigure(desc()).unwrap();

    let a = handle.acquire();
    handle.submit(a, SubmitMode::Blocking).unwrap();
    let b = handle.acquire();
    handle.submit(b, SubmitMode::Blocking).unwrap();

    // FIFO: both frames are displayed before the sentinel is seen.
    handle.shutdown().unwrap();
    render_thread.join().unwrap();
    assert_eq!(probe.presented(), 2);
}

#[test]
fn test_requests_behind_sentinel_still_resolve() {
    let (handle, render) = open(
        DisplayConfig::default(),
        HeadlessBackend::new(),
        NullKeySink,
    );

    handle.shutdown().unwrap();

    // Queue a reconfiguration behind the sentinel before the loop starts.
    let requester = {
        let handle = handle.clone();
        thread::spawn(move || handle.reconfigure(desc()))
    };
    thread::sleep(Duration::from_millis(100));

    render.run();
    assert!(requester.join().unwrap().is_err());
}
