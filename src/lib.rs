//! hygrolog - serial DHT22 temperature/humidity monitor.
//!
//! This library ingests line-oriented frames from a serial-attached sensor
//! board, keeps a bounded rolling window of recent readings, and fans the
//! window out to concurrent consumers: a live numeric readout, a periodic
//! redraw feed for a chart, and a durable CSV snapshot on disk.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          hygrolog                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌───────────────────┐    │
//! │  │  Sensor    │──▶│  Ingestor  │──▶│   SharedHistory   │    │
//! │  │ (serial)   │   │ (parse)    │   │ (rolling window)  │    │
//! │  └────────────┘   └────────────┘   └───────────────────┘    │
//! │                         │               │            │      │
//! │                         ▼               ▼            ▼      │
//! │                  ┌────────────┐  ┌────────────┐ ┌─────────┐ │
//! │                  │  Readout   │  │   Render   │ │   CSV   │ │
//! │                  │ (console)  │  │  Notifier  │ │ Export  │ │
//! │                  └────────────┘  └────────────┘ └─────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! One thread writes the window; any number of consumers read consistent
//! point-in-time snapshots of it. All loops stop cooperatively on shutdown.
//!
//! # Example
//!
//! ```no_run
//! use hygrolog::history::SharedHistory;
//! use hygrolog::ingest::Ingestor;
//! use hygrolog::sensor::SerialLink;
//! use hygrolog::stats::create_shared_stats;
//!
//! let link = SerialLink::open("/dev/ttyUSB0", 9600).expect("Failed to open port");
//! let history = SharedHistory::new(100);
//! let mut ingestor = Ingestor::new(Box::new(link), history.clone(), create_shared_stats());
//!
//! ingestor.start().expect("Failed to start ingestion");
//!
//! // Readings accumulate in `history`; consumers call history.snapshot()
//! ```

pub mod config;
pub mod export;
pub mod history;
pub mod ingest;
pub mod render;
pub mod sensor;
pub mod stats;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError, ExportInterval};
pub use export::{write_snapshot, CsvExporter, SNAPSHOT_FILE_NAME};
pub use history::{RollingWindow, SharedHistory, DEFAULT_WINDOW_CAPACITY};
pub use ingest::{IngestError, Ingestor};
pub use render::{RenderNotifier, DEFAULT_RENDER_PERIOD};
pub use sensor::{
    parse_frame, FrameError, LineSource, Reading, Sample, ScriptedSource, SerialLink, SourceError,
};
pub use stats::{
    create_shared_stats, create_shared_stats_with_persistence, PipelineStats, SharedPipelineStats,
    StatsSnapshot,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
