//! In-memory software render backend.
//!
//! Stores textures as byte vectors and records every operation in a journal
//! the test suite can inspect through a [`Probe`]. Failure injection flips
//! the next creation call into an error, which is how the reconfiguration
//! failure paths are exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::backend::{OutputOptions, RenderBackend, TextureId};
use crate::error::{Error, Result};
use crate::format::NativeFormat;

/// One recorded backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOp {
    /// Window + surface created.
    CreateOutput,
    /// Window + surface destroyed.
    DestroyOutput,
    /// Logical content size set.
    SetLogicalSize(u32, u32),
    /// Window resized.
    SetWindowSize(u32, u32),
    /// Title changed.
    SetTitle(String),
    /// Fullscreen toggled.
    SetFullscreen(bool),
    /// Texture created.
    CreateTexture(TextureId),
    /// Texture destroyed.
    DestroyTexture(TextureId),
    /// Pixels uploaded into a texture.
    Upload(TextureId),
    /// Surface cleared.
    Clear,
    /// Texture presented.
    Present(TextureId),
}

#[derive(Debug, Default)]
struct Inner {
    ops: Mutex<Vec<BackendOp>>,
    fail_output: AtomicBool,
    fail_texture: AtomicBool,
}

/// Test-side handle onto a [`HeadlessBackend`] moved to the render thread.
#[derive(Debug, Clone)]
pub struct Probe {
    inner: Arc<Inner>,
}

impl Probe {
    /// Snapshot of all recorded operations.
    pub fn ops(&self) -> Vec<BackendOp> {
        self.inner.ops.lock().unwrap().clone()
    }

    /// Number of presents recorded so far.
    pub fn presented(&self) -> usize {
        self.inner
            .ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| matches!(op, BackendOp::Present(_)))
            .count()
    }

    /// Make the next output creation fail.
    pub fn fail_output(&self, fail: bool) {
        self.inner.fail_output.store(fail, Ordering::SeqCst);
    }

    /// Make texture creation fail until reset.
    pub fn fail_texture(&self, fail: bool) {
        self.inner.fail_texture.store(fail, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct TextureStore {
    pixels: Vec<u8>,
    pitch: usize,
}

/// Software backend with no display attached.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    inner: Arc<Inner>,
    has_output: bool,
    textures: HashMap<TextureId, TextureStore>,
    next_texture: u64,
}

impl HeadlessBackend {
    /// Create a backend with an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a probe sharing this backend's journal and failure switches.
    pub fn probe(&self) -> Probe {
        Probe {
            inner: self.inner.clone(),
        }
    }

    fn record(&self, op: BackendOp) {
        self.inner.ops.lock().unwrap().push(op);
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_output(&mut self, _opts: &OutputOptions) -> Result<String> {
        if self.inner.fail_output.swap(false, Ordering::SeqCst) {
            return Err(Error::Resource("injected output failure".into()));
        }
        if self.has_output {
            self.record(BackendOp::DestroyOutput);
        }
        self.has_output = true;
        self.record(BackendOp::CreateOutput);
        Ok("headless".into())
    }

    fn destroy_output(&mut self) {
        if self.has_output {
            self.has_output = false;
            self.record(BackendOp::DestroyOutput);
        }
    }

    fn has_output(&self) -> bool {
        self.has_output
    }

    fn set_logical_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.record(BackendOp::SetLogicalSize(width, height));
        Ok(())
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.record(BackendOp::SetWindowSize(width, height));
    }

    fn set_title(&mut self, title: &str) {
        self.record(BackendOp::SetTitle(title.to_string()));
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.record(BackendOp::SetFullscreen(fullscreen));
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        format: NativeFormat,
    ) -> Result<(TextureId, usize)> {
        if self.inner.fail_texture.load(Ordering::SeqCst) {
            return Err(Error::Resource("injected texture failure".into()));
        }
        let pitch = match format {
            NativeFormat::Iyuv => width as usize,
            NativeFormat::Uyvy | NativeFormat::Yuy2 => width as usize * 2,
            NativeFormat::Rgb24 | NativeFormat::Bgr24 => width as usize * 3,
            NativeFormat::Rgba32 | NativeFormat::Argb2101010 => width as usize * 4,
        };
        let size = match format {
            NativeFormat::Iyuv => width as usize * height as usize * 3 / 2,
            _ => pitch * height as usize,
        };
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        self.textures.insert(
            id,
            TextureStore {
                pixels: vec![0; size],
                pitch,
            },
        );
        self.record(BackendOp::CreateTexture(id));
        Ok((id, pitch))
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if self.textures.remove(&id).is_some() {
            self.record(BackendOp::DestroyTexture(id));
        }
    }

    fn upload(&mut self, id: TextureId, data: &[u8], pitch: usize) -> Result<()> {
        let texture = self
            .textures
            .get_mut(&id)
            .ok_or_else(|| Error::Resource("upload to unknown texture".into()))?;
        if pitch != texture.pitch {
            return Err(Error::Resource("pitch mismatch".into()));
        }
        let n = data.len().min(texture.pixels.len());
        texture.pixels[..n].copy_from_slice(&data[..n]);
        self.record(BackendOp::Upload(id));
        Ok(())
    }

    fn clear(&mut self) {
        self.record(BackendOp::Clear);
    }

    fn present(&mut self, id: TextureId) -> Result<()> {
        if !self.textures.contains_key(&id) {
            return Err(Error::Resource("present of unknown texture".into()));
        }
        self.record(BackendOp::Present(id));
        Ok(())
    }
}
