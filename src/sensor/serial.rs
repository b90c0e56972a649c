//! Serial implementation of the sensor link.
//!
//! Opens the configured port and reads line-oriented frames with a bounded
//! per-read timeout, so the ingestion loop can check for cancellation even
//! when the board is silent.

use crate::sensor::{LineSource, SourceError};
use std::io::{BufRead, BufReader, ErrorKind};
use std::time::Duration;
use tracing::debug;

/// Baud rate the stock sensor sketch is flashed with.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Bounded per-read timeout on the serial port.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// A line source backed by a physical serial port.
pub struct SerialLink {
    reader: BufReader<Box<dyn serialport::SerialPort>>,
    // Bytes of a line that straddled a read timeout; kept for the next attempt.
    pending: Vec<u8>,
    path: String,
}

impl SerialLink {
    /// Open the port at the given path and baud rate.
    ///
    /// Fails if the port cannot be opened; there is no retry at this layer.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, SourceError> {
        let port = serialport::new(path, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| SourceError::Open {
                port: path.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            reader: BufReader::new(port),
            pending: Vec::new(),
            path: path.to_string(),
        })
    }

    /// Path of the underlying port.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl LineSource for SerialLink {
    fn read_line(&mut self) -> Result<Option<String>, SourceError> {
        match self.reader.read_until(b'\n', &mut self.pending) {
            Ok(0) => Err(SourceError::Disconnected),
            Ok(_) => {
                let raw = std::mem::take(&mut self.pending);
                match String::from_utf8(raw) {
                    Ok(line) => Ok(Some(line)),
                    Err(_) => {
                        // Undecodable bytes: treat like a malformed frame.
                        debug!(port = %self.path, "discarding line with invalid utf-8");
                        Ok(None)
                    }
                }
            }
            // Timed out with no complete line; partial bytes stay buffered.
            Err(e) if e.kind() == ErrorKind::TimedOut || e.kind() == ErrorKind::WouldBlock => {
                Ok(None)
            }
            Err(e) => Err(SourceError::Io(e)),
        }
    }
}
