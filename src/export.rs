//! Durable CSV snapshots of the rolling history.
//!
//! A dedicated thread wakes on the configured interval, takes a snapshot,
//! and rewrites the single destination file in full. The file holds exactly
//! one live copy of the window; a failed write is reported and retried on
//! the next tick without disturbing ingestion.

use crate::config::ExportInterval;
use crate::history::SharedHistory;
use crate::sensor::Reading;
use crate::stats::SharedPipelineStats;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Fixed name of the snapshot file.
pub const SNAPSHOT_FILE_NAME: &str = "Environment.csv";

/// Column headers of the snapshot table.
pub const SNAPSHOT_HEADER: [&str; 3] = ["Timestamp", "Temperature (°C)", "Humidity (%)"];

// Second-precision timestamps in the snapshot rows.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TICK_SLICE: Duration = Duration::from_millis(100);

/// Errors starting the exporter.
#[derive(Debug)]
pub enum ExportError {
    AlreadyRunning,
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::AlreadyRunning => write!(f, "exporter is already running"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Periodic snapshot-to-disk worker.
pub struct CsvExporter {
    history: SharedHistory,
    stats: SharedPipelineStats,
    interval: ExportInterval,
    path: PathBuf,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl CsvExporter {
    /// Create an exporter writing `Environment.csv` under `export_dir`.
    pub fn new(
        history: SharedHistory,
        stats: SharedPipelineStats,
        interval: ExportInterval,
        export_dir: &Path,
    ) -> Self {
        Self {
            history,
            stats,
            interval,
            path: export_dir.join(SNAPSHOT_FILE_NAME),
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Destination of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start exporting in a background thread.
    ///
    /// The first snapshot is written immediately; subsequent ones follow at
    /// the configured interval.
    pub fn start(&mut self) -> Result<(), ExportError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(ExportError::AlreadyRunning);
        }

        self.running.store(true, Ordering::SeqCst);

        let history = self.history.clone();
        let stats = self.stats.clone();
        let period = self.interval.period();
        let path = self.path.clone();
        let running = self.running.clone();

        let handle = thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let readings = history.snapshot();
                match write_snapshot(&path, &readings) {
                    Ok(()) => {
                        stats.record_snapshot_written();
                        debug!(path = %path.display(), rows = readings.len(), "snapshot written");
                    }
                    Err(e) => {
                        // Non-fatal; the next tick retries with fresh data.
                        warn!(path = %path.display(), error = %e, "snapshot write failed");
                    }
                }

                let deadline = Instant::now() + period;
                while running.load(Ordering::SeqCst) && Instant::now() < deadline {
                    thread::sleep(TICK_SLICE);
                }
            }
        });

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Stop exporting and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Whether the exporter is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for CsvExporter {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Serialize the given readings to `path`, fully replacing prior content.
///
/// Reads nothing back from the window; exporting twice with no intervening
/// pushes produces byte-identical output.
pub fn write_snapshot(path: &Path, readings: &[Reading]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SNAPSHOT_HEADER)?;

    for reading in readings {
        writer.write_record([
            reading.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            reading.temperature_c.to_string(),
            reading.humidity_pct.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
