//! Ingestion loop.
//!
//! A dedicated thread reads line-oriented frames from the sensor link,
//! parses them, stamps accepted readings with the current time, and pushes
//! them into the shared rolling history. Accepted readings are also handed
//! off to the presentation thread over a bounded channel; the hand-off never
//! blocks on a slow consumer.

use crate::history::SharedHistory;
use crate::sensor::{parse_frame, LineSource, Reading};
use crate::stats::SharedPipelineStats;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

/// Errors starting the ingestion loop.
#[derive(Debug)]
pub enum IngestError {
    AlreadyRunning,
    /// The link was consumed by an earlier start; ingestion cannot restart
    LinkConsumed,
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::AlreadyRunning => write!(f, "ingestion is already running"),
            IngestError::LinkConsumed => {
                write!(f, "the sensor link was already consumed by a previous start")
            }
        }
    }
}

impl std::error::Error for IngestError {}

/// The ingestion worker. Sole writer of the shared history.
pub struct Ingestor {
    source: Option<Box<dyn LineSource>>,
    history: SharedHistory,
    stats: SharedPipelineStats,
    sender: Sender<Reading>,
    receiver: Receiver<Reading>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Ingestor {
    /// Create an ingestor over the given link.
    pub fn new(
        source: Box<dyn LineSource>,
        history: SharedHistory,
        stats: SharedPipelineStats,
    ) -> Self {
        // Bounded so a stalled presentation thread cannot grow memory
        let (sender, receiver) = bounded(256);

        Self {
            source: Some(source),
            history,
            stats,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start reading frames in a background thread.
    pub fn start(&mut self) -> Result<(), IngestError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(IngestError::AlreadyRunning);
        }
        let source = self.source.take().ok_or(IngestError::LinkConsumed)?;

        self.running.store(true, Ordering::SeqCst);

        let history = self.history.clone();
        let stats = self.stats.clone();
        let sender = self.sender.clone();
        let running = self.running.clone();

        let handle = thread::spawn(move || {
            run_ingest_loop(source, history, stats, sender, running.clone());
            running.store(false, Ordering::SeqCst);
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            // The thread exits within one bounded read timeout
            let _ = handle.join();
        }
    }

    /// Whether the loop is still running.
    ///
    /// Flips to false on its own when the link fails; the presentation layer
    /// uses this to surface staleness.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Receiver for the latest-reading hand-off to the presentation thread.
    pub fn receiver(&self) -> &Receiver<Reading> {
        &self.receiver
    }
}

impl Drop for Ingestor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One iteration per physical line; transient failures never end the loop.
fn run_ingest_loop(
    mut source: Box<dyn LineSource>,
    history: SharedHistory,
    stats: SharedPipelineStats,
    sender: Sender<Reading>,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        match source.read_line() {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                stats.record_frame_received();
                match parse_frame(line) {
                    Ok(sample) => {
                        let reading = Reading::new(sample.temperature_c, sample.humidity_pct);
                        history.push(reading.clone());
                        stats.record_reading();

                        // Don't block if the presentation thread lags; it can
                        // always fall back to the latest snapshot.
                        let _ = sender.try_send(reading);
                    }
                    Err(e) => {
                        stats.record_frame_rejected();
                        debug!(error = %e, line, "discarding frame");
                    }
                }
            }
            // Read timeout; loop back and re-check the running flag.
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "sensor link failed, stopping ingestion");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::ScriptedSource;
    use crate::stats::create_shared_stats;
    use std::time::Duration;

    fn wait_until_stopped(ingestor: &Ingestor) {
        for _ in 0..100 {
            if !ingestor.is_running() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("ingestion did not stop");
    }

    #[test]
    fn test_start_twice_fails() {
        let history = SharedHistory::new(10);
        let stats = create_shared_stats();
        let source = ScriptedSource::new(Vec::<String>::new());
        let mut ingestor = Ingestor::new(Box::new(source), history, stats);

        ingestor.start().unwrap();
        wait_until_stopped(&ingestor);
        assert!(matches!(ingestor.start(), Err(IngestError::LinkConsumed)));
    }

    #[test]
    fn test_blank_lines_are_not_counted() {
        let history = SharedHistory::new(10);
        let stats = create_shared_stats();
        let source = ScriptedSource::new(["", "   ", "\r\n"]);
        let mut ingestor = Ingestor::new(Box::new(source), history.clone(), stats.clone());

        ingestor.start().unwrap();
        wait_until_stopped(&ingestor);
        ingestor.stop();

        assert!(history.is_empty());
        assert_eq!(stats.stats().frames_received, 0);
    }
}
