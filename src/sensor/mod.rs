//! Sensor link module.
//!
//! The serial-attached board emits one frame per line; this module provides
//! the line source abstraction, the real serial implementation, a scripted
//! replay implementation for hardware-free runs, and the frame parser.

pub mod frame;
pub mod scripted;
pub mod serial;
pub mod types;

// Re-export commonly used items
pub use frame::{parse_frame, FrameError, Sample, HUMIDITY_MARKER, TEMPERATURE_MARKER};
pub use scripted::ScriptedSource;
pub use serial::{SerialLink, DEFAULT_BAUD_RATE, READ_TIMEOUT};
pub use types::Reading;

/// A blocking, line-oriented source of sensor frames.
///
/// `Ok(Some(line))` is one complete line; `Ok(None)` means the bounded read
/// timeout expired (or an undecodable line was dropped) and the caller should
/// re-check for cancellation; `Err(_)` is fatal to ingestion.
pub trait LineSource: Send {
    fn read_line(&mut self) -> Result<Option<String>, SourceError>;
}

/// Errors on the sensor link.
#[derive(Debug)]
pub enum SourceError {
    /// The port could not be opened at startup
    Open { port: String, message: String },
    /// Unrecoverable I/O error on an open link
    Io(std::io::Error),
    /// The stream was closed by the far end
    Disconnected,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Open { port, message } => {
                write!(f, "could not open serial port {port}: {message}")
            }
            SourceError::Io(e) => write!(f, "serial link I/O error: {e}"),
            SourceError::Disconnected => write!(f, "serial stream closed"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(e) => Some(e),
            _ => None,
        }
    }
}
