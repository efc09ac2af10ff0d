//! The render event loop.
//!
//! One thread owns the window, the output surface and every texture, and
//! serializes all work on them by draining the event queue: new frames,
//! reconfiguration handshakes, control commands, translated input, quit.
//! Nothing here blocks except the idle wait for the next event; all
//! blocking waits live on the producer side.

use smallvec::SmallVec;

use std::sync::Arc;

use crate::backend::{OutputOptions, RenderBackend, TextureId, WindowFlags, WindowPos};
use crate::config::{DeintMode, DisplayConfig};
use crate::control::{Command, ControlRequest, ControlResponse, KeySink};
use crate::deint;
use crate::error::Result;
use crate::event::{Event, EventReceiver, InputEvent, ReconfigureStatus};
use crate::format::PixelFormat;
use crate::frame::{FrameBuffer, Interlacing, VideoDesc};
use crate::input::{self, KeySym, LogicalKey, Translation};
use crate::session::Shared;

/// Render-thread session state. Only ever touched between events.
#[derive(Debug)]
struct DisplayState {
    deinterlace: DeintMode,
    fullscreen: bool,
    keep_aspect: bool,
    vsync: bool,
    fixed_size: bool,
    fixed_width: u32,
    fixed_height: u32,
    display_index: u32,
    position: Option<(i32, i32)>,
    renderer_index: Option<u32>,
    window_flags: u32,
    borderless: bool,
    driver: Option<String>,
    title: String,
    current_desc: Option<VideoDesc>,
}

impl DisplayState {
    fn from_config(config: DisplayConfig) -> Self {
        Self {
            deinterlace: config.deinterlace,
            fullscreen: config.fullscreen,
            keep_aspect: config.keep_aspect,
            vsync: config.vsync,
            fixed_size: config.fixed_size,
            fixed_width: config.fixed_width,
            fixed_height: config.fixed_height,
            display_index: config.display_index,
            position: config.position,
            renderer_index: config.renderer_index,
            window_flags: config.window_flags,
            borderless: config.borderless,
            driver: config.driver,
            title: config.title.unwrap_or_else(|| "vitrine output".to_string()),
            current_desc: None,
        }
    }
}

/// The single-threaded dispatcher owning all renderer resources.
///
/// Runs until it dequeues the shutdown sentinel or an external quit event,
/// then resolves anything still queued behind the stop and tears down.
pub struct RenderLoop<B: RenderBackend> {
    shared: Arc<Shared>,
    backend: B,
    events: EventReceiver,
    control_rx: kanal::Receiver<ControlRequest>,
    state: DisplayState,
    key_sink: Box<dyn KeySink>,
    last_texture: Option<TextureId>,
    deint_failed: SmallVec<[PixelFormat; 4]>,
}

impl<B: RenderBackend> RenderLoop<B> {
    pub(crate) fn new(
        shared: Arc<Shared>,
        backend: B,
        events: EventReceiver,
        control_rx: kanal::Receiver<ControlRequest>,
        config: DisplayConfig,
        key_sink: Box<dyn KeySink>,
    ) -> Self {
        Self {
            shared,
            backend,
            events,
            control_rx,
            state: DisplayState::from_config(config),
            key_sink,
            last_texture: None,
            deint_failed: SmallVec::new(),
        }
    }

    /// Process events until the shutdown sentinel or a quit event arrives.
    ///
    /// Consumes the loop; dropping it tears down the pool and the output.
    pub fn run(mut self) {
        while let Some(event) = self.events.recv() {
            if !self.handle_event(event) {
                break;
            }
        }
        self.drain_pending();
    }

    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Reconfigure(request) => {
                let status = self.reconfigure(request.desc);
                request.done.complete(status);
                true
            }
            Event::NewFrame(Some(frame)) => {
                self.display_frame(frame);
                true
            }
            Event::NewFrame(None) => false,
            Event::Control => {
                self.drain_control();
                true
            }
            Event::Input(input) => {
                self.handle_input(input);
                true
            }
            Event::Quit => false,
        }
    }

    /// Requests queued behind the stop event must still resolve: waiting
    /// reconfigurers get a failure, frames go back to the pool so a
    /// blocked producer can finish.
    fn drain_pending(&mut self) {
        while let Some(event) = self.events.try_recv() {
            match event {
                Event::Reconfigure(request) => request.done.complete(ReconfigureStatus::Failed),
                Event::NewFrame(Some(frame)) => self.recycle(frame),
                _ => {}
            }
        }
        while let Ok(Some(request)) = self.control_rx.try_recv() {
            request
                .done
                .complete(ControlResponse::BadRequest("display stopped".into()));
        }
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    fn display_frame(&mut self, mut frame: FrameBuffer) {
        {
            let pool = self.shared.pool.lock().unwrap();
            if !pool.is_current(&frame) {
                drop(pool);
                tracing::debug!("dropping frame from a previous configuration");
                self.recycle(frame);
                return;
            }
        }

        let desc = frame.desc();
        if self.state.deinterlace == DeintMode::Force
            || (self.state.deinterlace == DeintMode::On
                && desc.interlacing == Interlacing::InterlacedMerged)
        {
            let pitch = frame.pitch();
            if !deint::deinterlace_in_place(
                desc.pixel_format,
                frame.data_mut(),
                pitch,
                desc.height as usize,
            ) {
                self.report_deint_unsupported(desc.pixel_format);
            }
        }

        let texture = frame.texture();
        if let Err(e) = self.backend.upload(texture, frame.data(), frame.pitch()) {
            tracing::error!("texture upload failed: {}", e);
        }
        self.backend.clear();
        if let Err(e) = self.backend.present(texture) {
            tracing::error!("present failed: {}", e);
        }
        self.last_texture = Some(texture);

        self.recycle(frame);
    }

    fn recycle(&mut self, frame: FrameBuffer) {
        let mut pool = self.shared.pool.lock().unwrap();
        pool.note_returned();
        if pool.is_current(&frame) {
            pool.release(frame);
            drop(pool);
            // Both acquirers and blocked submitters wait on this condvar
            // with different predicates; wake them all.
            self.shared.frame_consumed.notify_all();
        } else {
            drop(pool);
            // Waiters watch the in-flight count too.
            self.shared.frame_consumed.notify_all();
            self.backend.destroy_texture(frame.texture());
        }
    }

    /// Re-present the last displayed texture without consuming a buffer.
    fn redraw_last(&mut self) {
        if let Some(texture) = self.last_texture {
            self.backend.clear();
            if let Err(e) = self.backend.present(texture) {
                tracing::error!("redraw failed: {}", e);
            }
        }
    }

    fn report_deint_unsupported(&mut self, format: PixelFormat) {
        if !self.deint_failed.contains(&format) {
            self.deint_failed.push(format);
            tracing::error!("cannot deinterlace {}: unsupported pixel format", format);
        }
    }

    // ------------------------------------------------------------------
    // Reconfiguration
    // ------------------------------------------------------------------

    fn reconfigure(&mut self, desc: VideoDesc) -> ReconfigureStatus {
        tracing::info!(
            "reconfiguring output to {}x{} {}",
            desc.width,
            desc.height,
            desc.pixel_format
        );
        if desc.interlacing == Interlacing::InterlacedMerged
            && self.state.deinterlace == DeintMode::Off
        {
            tracing::warn!(
                "receiving interlaced video but deinterlacing is off - press 'd' or pass the d option"
            );
        }

        match self.reconfigure_inner(desc) {
            Ok(()) => {
                self.state.current_desc = Some(desc);
                ReconfigureStatus::Applied
            }
            Err(e) => {
                tracing::error!("reconfiguration failed: {}", e);
                ReconfigureStatus::Failed
            }
        }
    }

    fn reconfigure_inner(&mut self, desc: VideoDesc) -> Result<()> {
        // Pinned-size outputs keep their window; only the logical content
        // size and the buffer pool change.
        if self.state.fixed_size && self.backend.has_output() {
            self.backend.set_logical_size(desc.width, desc.height)?;
            return self.rebuild_pool(desc);
        }

        let opts = self.output_options(desc);
        let renderer = self.backend.create_output(&opts)?;
        tracing::info!("using renderer '{}'", renderer);
        self.backend.set_logical_size(desc.width, desc.height)?;
        self.rebuild_pool(desc)
    }

    fn output_options(&self, desc: VideoDesc) -> OutputOptions {
        let width = if self.state.fixed_width != 0 {
            self.state.fixed_width
        } else {
            desc.width
        };
        let height = if self.state.fixed_height != 0 {
            self.state.fixed_height
        } else {
            desc.height
        };
        let pos = match self.state.position {
            Some((x, y)) => WindowPos::At { x, y },
            None => WindowPos::Centered {
                display: self.state.display_index,
            },
        };
        OutputOptions {
            title: self.state.title.clone(),
            pos,
            width,
            height,
            flags: WindowFlags {
                resizable: true,
                high_dpi: true,
                borderless: self.state.borderless,
                fullscreen: self.state.fullscreen,
                raw: self.state.window_flags,
            },
            vsync: self.state.vsync,
            renderer_index: self.state.renderer_index,
            driver: self.state.driver.clone(),
        }
    }

    fn rebuild_pool(&mut self, desc: VideoDesc) -> Result<()> {
        self.last_texture = None;
        let mut pool = self.shared.pool.lock().unwrap();
        let result = pool.initialize(&mut self.backend, desc);
        drop(pool);
        if result.is_ok() {
            self.shared.frame_consumed.notify_all();
        }
        result
    }

    // ------------------------------------------------------------------
    // Control and input
    // ------------------------------------------------------------------

    fn drain_control(&mut self) {
        while let Ok(Some(request)) = self.control_rx.try_recv() {
            tracing::debug!("received control message '{}'", request.text);
            let response = match Command::parse(&request.text) {
                Command::WinTitle(title) => {
                    self.backend.set_title(&title);
                    ControlResponse::Ok
                }
                Command::Key(key) => {
                    if self.process_key(key) {
                        ControlResponse::Ok
                    } else {
                        ControlResponse::BadRequest("unsupported key".into())
                    }
                }
                Command::UnknownKey => ControlResponse::BadRequest("unsupported key".into()),
                Command::Unknown => ControlResponse::BadRequest("wrong command".into()),
            };
            request.done.complete(response);
        }
    }

    fn handle_input(&mut self, input: InputEvent) {
        match input {
            InputEvent::Key(sym) => self.handle_key(sym),
            InputEvent::Resized { width, height } => self.handle_resize(width, height),
            InputEvent::Exposed | InputEvent::SizeChanged => {
                // clear both swap-chain buffers
                self.redraw_last();
                self.redraw_last();
            }
        }
    }

    fn handle_key(&mut self, sym: KeySym) {
        tracing::debug!("pressed key {:?}", sym);
        match input::translate(sym) {
            Translation::Key(key) => {
                if !self.process_key(key) {
                    self.key_sink.forward_key(key);
                }
            }
            Translation::Ignored => {}
            Translation::Untranslatable => tracing::warn!("cannot translate key {:?}", sym),
        }
    }

    /// Local key handlers. Returns `false` for keys this loop does not
    /// handle, so the caller can forward them.
    fn process_key(&mut self, key: LogicalKey) -> bool {
        match key {
            LogicalKey::Char('d') => {
                self.state.deinterlace = match self.state.deinterlace {
                    DeintMode::Off => DeintMode::On,
                    DeintMode::On | DeintMode::Force => DeintMode::Off,
                };
                tracing::info!("deinterlacing {}", self.state.deinterlace.name());
                true
            }
            LogicalKey::Char('f') => {
                self.state.fullscreen = !self.state.fullscreen;
                self.backend.set_fullscreen(self.state.fullscreen);
                true
            }
            LogicalKey::Char('q') => {
                self.key_sink.request_exit();
                true
            }
            _ => false,
        }
    }

    fn handle_resize(&mut self, width: i32, height: i32) {
        let Some(desc) = self.state.current_desc else {
            return;
        };
        if !self.state.keep_aspect || width <= 0 || height <= 0 {
            return;
        }
        let area = width as f64 * height as f64;
        let new_width = (area / (desc.height as f64 / desc.width as f64)).sqrt() as u32;
        let new_height = (area / (desc.width as f64 / desc.height as f64)).sqrt() as u32;
        self.backend.set_window_size(new_width, new_height);
        tracing::debug!("resizing to {}x{} to keep aspect", new_width, new_height);
    }
}

impl<B: RenderBackend> Drop for RenderLoop<B> {
    fn drop(&mut self) {
        let mut pool = self.shared.pool.lock().unwrap();
        pool.teardown(&mut self.backend);
        drop(pool);
        self.backend.destroy_output();
    }
}
