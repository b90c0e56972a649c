//! Session statistics for the pipeline.
//!
//! Tracks how many frames arrived, how many were rejected, how many readings
//! were recorded, and how many snapshots reached disk. Counters persist
//! across sessions so `hygrolog status` can show cumulative totals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Pipeline counters for the current session.
#[derive(Debug)]
pub struct PipelineStats {
    /// Non-empty lines received from the link
    frames_received: AtomicU64,
    /// Frames rejected by the parser
    frames_rejected: AtomicU64,
    /// Readings pushed into the rolling window
    readings_recorded: AtomicU64,
    /// Snapshot files written to disk
    snapshots_written: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting counters
    persist_path: Option<PathBuf>,
}

impl PipelineStats {
    /// Create a fresh stats block.
    pub fn new() -> Self {
        Self {
            frames_received: AtomicU64::new(0),
            frames_rejected: AtomicU64::new(0),
            readings_recorded: AtomicU64::new(0),
            snapshots_written: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a stats block that loads and saves cumulative totals at `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            eprintln!("Note: Could not load previous pipeline stats: {e}");
        }

        stats
    }

    /// Record a frame received from the link.
    pub fn record_frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame rejected by the parser.
    pub fn record_frame_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reading pushed into the window.
    pub fn record_reading(&self) {
        self.readings_recorded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a snapshot file written.
    pub fn record_snapshot_written(&self) {
        self.snapshots_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current counters.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            readings_recorded: self.readings_recorded.load(Ordering::Relaxed),
            snapshots_written: self.snapshots_written.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds() as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Frames received: {}\n\
             - Frames rejected: {}\n\
             - Readings recorded: {}\n\
             - Snapshots written: {}\n\
             - Session duration: {} seconds",
            stats.frames_received,
            stats.frames_rejected,
            stats.readings_recorded,
            stats.snapshots_written,
            stats.session_duration_secs
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                frames_received: stats.frames_received,
                frames_rejected: stats.frames_rejected,
                readings_recorded: stats.readings_recorded,
                snapshots_written: stats.snapshots_written,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load counters from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.frames_received
                    .store(persisted.frames_received, Ordering::Relaxed);
                self.frames_rejected
                    .store(persisted.frames_rejected, Ordering::Relaxed);
                self.readings_recorded
                    .store(persisted.readings_recorded, Ordering::Relaxed);
                self.snapshots_written
                    .store(persisted.snapshots_written, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.frames_received.store(0, Ordering::Relaxed);
        self.frames_rejected.store(0, Ordering::Relaxed);
        self.readings_recorded.store(0, Ordering::Relaxed);
        self.snapshots_written.store(0, Ordering::Relaxed);
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the pipeline counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames_received: u64,
    pub frames_rejected: u64,
    pub readings_recorded: u64,
    pub snapshots_written: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Counter format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    frames_received: u64,
    frames_rejected: u64,
    readings_recorded: u64,
    snapshots_written: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared pipeline stats.
pub type SharedPipelineStats = Arc<PipelineStats>;

/// Create a new shared stats block.
pub fn create_shared_stats() -> SharedPipelineStats {
    Arc::new(PipelineStats::new())
}

/// Create a new shared stats block with persistence.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedPipelineStats {
    Arc::new(PipelineStats::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counting() {
        let stats = PipelineStats::new();

        stats.record_frame_received();
        stats.record_frame_received();
        stats.record_frame_rejected();
        stats.record_reading();

        let snapshot = stats.stats();
        assert_eq!(snapshot.frames_received, 2);
        assert_eq!(snapshot.frames_rejected, 1);
        assert_eq!(snapshot.readings_recorded, 1);
        assert_eq!(snapshot.snapshots_written, 0);
    }

    #[test]
    fn test_stats_reset() {
        let stats = PipelineStats::new();

        stats.record_frame_received();
        stats.record_snapshot_written();
        stats.reset();

        let snapshot = stats.stats();
        assert_eq!(snapshot.frames_received, 0);
        assert_eq!(snapshot.snapshots_written, 0);
    }

    #[test]
    fn test_summary_format() {
        let stats = PipelineStats::new();
        let summary = stats.summary();

        assert!(summary.contains("Frames received"));
        assert!(summary.contains("Readings recorded"));
        assert!(summary.contains("Snapshots written"));
    }
}
