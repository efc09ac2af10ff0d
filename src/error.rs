//! Error types for Vitrine.

use crate::format::PixelFormat;
use thiserror::Error;

/// Result type alias using Vitrine's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Vitrine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad option string at session start.
    #[error("invalid option: {0}")]
    Config(String),

    /// Window, output surface or texture creation failed.
    #[error("output resource failure: {0}")]
    Resource(String),

    /// The requested operation does not support this pixel format.
    #[error("unsupported pixel format: {0}")]
    Format(PixelFormat),

    /// Malformed control-channel command.
    #[error("bad control command: {0}")]
    Protocol(String),

    /// Key event that cannot be mapped to the logical key space.
    #[error("untranslatable key event")]
    Input,

    /// The event queue was torn down while still in use.
    #[error("event channel closed")]
    ChannelClosed,
}
