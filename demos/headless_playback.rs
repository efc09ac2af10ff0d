//! Headless playback example.
//!
//! This example drives a complete display session against the in-memory
//! backend: it opens the session, configures the output, pushes a short
//! sequence of gradient frames through the acquire/submit protocol,
//! reconfigures to a new geometry mid-stream, and shuts down cleanly.
//!
//! Run with: cargo run --example headless_playback

use std::thread;
use std::time::Duration;

use vitrine::backend::HeadlessBackend;
use vitrine::config::{DisplayConfig, Parsed};
use vitrine::control::NullKeySink;
use vitrine::error::Result;
use vitrine::format::PixelFormat;
use vitrine::frame::VideoDesc;
use vitrine::session::{open, SubmitMode};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("vitrine=debug")
        .init();

    println!("Headless Playback Example");
    println!("=========================\n");

    let config = match DisplayConfig::parse("keep-aspect:title=headless demo")? {
        Parsed::Session(config) => config,
        Parsed::Help => unreachable!(),
    };

    let backend = HeadlessBackend::new();
    let probe = backend.probe();
    let (handle, render) = open(config, backend, NullKeySink);
    let render_thread = thread::spawn(move || render.run());

    // First configuration creates the window and the buffer pool.
    handle.reconfigure(VideoDesc::new(1280, 720, PixelFormat::Uyvy))?;
    println!("configured 1280x720 uyvy, pitch {:?}", handle.pitch());

    for seq in 0..30u8 {
        let mut frame = handle.acquire();
        for (i, byte) in frame.data_mut().iter_mut().enumerate() {
            *byte = seq.wrapping_add(i as u8);
        }
        handle.submit(frame, SubmitMode::Timed(Duration::from_millis(40)))?;
    }

    // Change geometry mid-stream; the producer blocks until the render
    // thread has rebuilt its resources.
    handle.reconfigure(VideoDesc::new(640, 360, PixelFormat::Rgb24))?;
    println!("reconfigured to 640x360 rgb24");

    let mut frame = handle.acquire();
    frame.data_mut().fill(0x80);
    handle.submit(frame, SubmitMode::Blocking)?;

    handle.shutdown()?;
    render_thread.join().unwrap();

    println!("\nbackend processed {} presents", probe.presented());
    Ok(())
}
