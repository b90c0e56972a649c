//! Scripted implementation of the sensor link.
//!
//! Replays a fixed list of lines and then reports stream closure. Exists so
//! the pipeline can run and be tested without a board attached.

use crate::sensor::{LineSource, SourceError};
use std::collections::VecDeque;

/// A line source that replays a prepared script.
pub struct ScriptedSource {
    lines: VecDeque<String>,
}

impl ScriptedSource {
    /// Create a source that yields the given lines in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of lines left in the script.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedSource {
    fn read_line(&mut self) -> Result<Option<String>, SourceError> {
        match self.lines.pop_front() {
            Some(line) => Ok(Some(line)),
            // Script exhausted: behaves like the far end closing the stream.
            None => Err(SourceError::Disconnected),
        }
    }
}
