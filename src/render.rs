//! Render notifier.
//!
//! Wakes on a fixed period, takes a consistent snapshot of the rolling
//! history, and hands it to the presentation layer for redraw over a small
//! bounded channel. If the consumer is still busy with the previous frame
//! the new one is skipped; the notifier never blocks on rendering and never
//! mutates the history.

use crate::history::SharedHistory;
use crate::sensor::Reading;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::trace;

/// Default redraw period.
pub const DEFAULT_RENDER_PERIOD: Duration = Duration::from_secs(1);

// Slice the wait so stop() is honored promptly.
const TICK_SLICE: Duration = Duration::from_millis(100);

/// Errors starting the render notifier.
#[derive(Debug)]
pub enum RenderError {
    AlreadyRunning,
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::AlreadyRunning => write!(f, "render notifier is already running"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Periodic snapshot feed for the presentation layer.
pub struct RenderNotifier {
    history: SharedHistory,
    period: Duration,
    sender: Sender<Vec<Reading>>,
    receiver: Receiver<Vec<Reading>>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl RenderNotifier {
    /// Create a notifier ticking at the given period.
    pub fn new(history: SharedHistory, period: Duration) -> Self {
        // A frame or two of backlog at most; stale frames are useless.
        let (sender, receiver) = bounded(2);

        Self {
            history,
            period,
            sender,
            receiver,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start ticking in a background thread.
    pub fn start(&mut self) -> Result<(), RenderError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(RenderError::AlreadyRunning);
        }

        self.running.store(true, Ordering::SeqCst);

        let history = self.history.clone();
        let period = self.period;
        let sender = self.sender.clone();
        let running = self.running.clone();

        let handle = thread::spawn(move || {
            let mut last_tick = Instant::now();
            while running.load(Ordering::SeqCst) {
                thread::sleep(TICK_SLICE);
                if last_tick.elapsed() >= period {
                    // An empty history still produces an (empty) frame.
                    let frame = history.snapshot();
                    trace!(points = frame.len(), "render tick");
                    if sender.try_send(frame).is_err() {
                        trace!("presentation busy, skipping frame");
                    }
                    last_tick = Instant::now();
                }
            }
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop ticking and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Whether the notifier is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Receiver for redraw frames, oldest reading first within each frame.
    pub fn receiver(&self) -> &Receiver<Vec<Reading>> {
        &self.receiver
    }
}

impl Drop for RenderNotifier {
    fn drop(&mut self) {
        self.stop();
    }
}
