//! hygrolog CLI
//!
//! Serial DHT22 temperature/humidity monitor.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;
use hygrolog::{
    config::{Config, ExportInterval},
    export::{write_snapshot, CsvExporter, SNAPSHOT_FILE_NAME},
    history::SharedHistory,
    ingest::Ingestor,
    render::RenderNotifier,
    sensor::SerialLink,
    stats::create_shared_stats_with_persistence,
    VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hygrolog")]
#[command(version = VERSION)]
#[command(about = "Serial DHT22 temperature/humidity monitor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start monitoring the sensor
    Run {
        /// Serial port to read from (overrides config)
        #[arg(long)]
        port: Option<String>,

        /// Baud rate of the serial link (overrides config)
        #[arg(long)]
        baud: Option<u32>,

        /// Rolling window capacity in readings (overrides config)
        #[arg(long)]
        capacity: Option<usize>,

        /// Redraw period in seconds (overrides config)
        #[arg(long)]
        render_period_secs: Option<u64>,

        /// Snapshot interval (overrides config)
        #[arg(long, value_enum)]
        export_interval: Option<ExportInterval>,

        /// Directory for the snapshot file (overrides config)
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// List serial ports available on this machine
    Ports,

    /// Show configuration and cumulative session statistics
    Status,

    /// Show configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            port,
            baud,
            capacity,
            render_period_secs,
            export_interval,
            export_dir,
        } => cmd_run(
            port,
            baud,
            capacity,
            render_period_secs,
            export_interval,
            export_dir,
        ),
        Commands::Ports => cmd_ports(),
        Commands::Status => {
            cmd_status();
            Ok(())
        }
        Commands::Config => {
            cmd_config();
            Ok(())
        }
    }
}

fn cmd_run(
    port: Option<String>,
    baud: Option<u32>,
    capacity: Option<usize>,
    render_period_secs: Option<u64>,
    export_interval: Option<ExportInterval>,
    export_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    println!("hygrolog v{VERSION}");
    println!();

    let mut config = Config::load().unwrap_or_default();
    if let Some(port) = port {
        config.serial_port = port;
    }
    if let Some(baud) = baud {
        config.baud_rate = baud;
    }
    if let Some(capacity) = capacity {
        config.window_capacity = capacity;
    }
    if let Some(secs) = render_period_secs {
        config.render_period = Duration::from_secs(secs.max(1));
    }
    if let Some(interval) = export_interval {
        config.export_interval = interval;
    }
    if let Some(dir) = export_dir {
        config.export_path = dir;
    }

    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    println!("Starting monitor...");
    println!("  Serial port: {}", config.serial_port);
    println!("  Baud rate: {}", config.baud_rate);
    println!("  Window capacity: {} readings", config.window_capacity);
    println!("  Render period: {}s", config.render_period.as_secs());
    println!(
        "  Snapshot: {} to {:?}",
        config.export_interval,
        config.export_path.join(SNAPSHOT_FILE_NAME)
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let stats = create_shared_stats_with_persistence(config.data_path.join("stats.json"));

    // A dead link at startup is fatal; there is nothing to monitor.
    let link = SerialLink::open(&config.serial_port, config.baud_rate)
        .with_context(|| format!("opening serial port {}", config.serial_port))?;

    let history = SharedHistory::new(config.window_capacity);

    let mut ingestor = Ingestor::new(Box::new(link), history.clone(), stats.clone());
    let mut notifier = RenderNotifier::new(history.clone(), config.render_period);
    let mut exporter = CsvExporter::new(
        history.clone(),
        stats.clone(),
        config.export_interval,
        &config.export_path,
    );
    let snapshot_path = exporter.path().to_path_buf();

    ingestor.start()?;
    notifier.start()?;
    exporter.start()?;

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    // This thread is the presentation layer: it owns the console readout and
    // consumes both hand-off channels.
    let readings = ingestor.receiver().clone();
    let frames = notifier.receiver().clone();
    let mut link_lost_reported = false;

    while running.load(Ordering::SeqCst) {
        match readings.recv_timeout(Duration::from_millis(250)) {
            Ok(reading) => {
                println!(
                    "[{}] Temperature: {:.1} °C | Humidity: {:.1} %",
                    reading.timestamp.format("%H:%M:%S"),
                    reading.temperature_c,
                    reading.humidity_pct
                );
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        // No chart on the console; redraw frames are drained the same way a
        // GUI front end would consume them.
        while let Ok(frame) = frames.try_recv() {
            trace!(points = frame.len(), "redraw frame");
        }

        if !ingestor.is_running() && !link_lost_reported {
            link_lost_reported = true;
            match history.latest() {
                Some(reading) => eprintln!(
                    "Serial link lost. Last reading ({}) stays on display; snapshots continue.",
                    reading.timestamp.format("%Y-%m-%d %H:%M:%S")
                ),
                None => eprintln!("Serial link lost before any reading arrived."),
            }
        }
    }

    println!();
    println!("Stopping monitor...");
    ingestor.stop();
    notifier.stop();
    exporter.stop();

    // Final flush so the on-disk table reflects the end of the session.
    match write_snapshot(&snapshot_path, &history.snapshot()) {
        Ok(()) => stats.record_snapshot_written(),
        Err(e) => eprintln!("Warning: Could not write final snapshot: {e}"),
    }

    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save pipeline stats: {e}");
    }

    println!();
    println!("{}", stats.summary());
    Ok(())
}

fn cmd_ports() -> anyhow::Result<()> {
    let ports = serialport::available_ports().context("enumerating serial ports")?;

    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }

    println!("Available serial ports:");
    for port in ports {
        match port.port_type {
            serialport::SerialPortType::UsbPort(usb) => {
                let product = usb.product.unwrap_or_else(|| "unknown device".to_string());
                println!(
                    "  {} - USB {:04x}:{:04x} ({product})",
                    port.port_name, usb.vid, usb.pid
                );
            }
            other => {
                println!("  {} - {:?}", port.port_name, other);
            }
        }
    }
    Ok(())
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("hygrolog Status");
    println!("===============");
    println!();

    println!("Configuration:");
    println!("  Serial port: {}", config.serial_port);
    println!("  Baud rate: {}", config.baud_rate);
    println!("  Window capacity: {} readings", config.window_capacity);
    println!("  Export interval: {}", config.export_interval);
    println!();

    // Cumulative pipeline stats, if a previous session saved them
    let stats_path = config.data_path.join("stats.json");
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                if let Some(received) = stats.get("frames_received") {
                    println!("  Frames received: {received}");
                }
                if let Some(rejected) = stats.get("frames_rejected") {
                    println!("  Frames rejected: {rejected}");
                }
                if let Some(readings) = stats.get("readings_recorded") {
                    println!("  Readings recorded: {readings}");
                }
                if let Some(snapshots) = stats.get("snapshots_written") {
                    println!("  Snapshots written: {snapshots}");
                }
                println!();
            }
        }
    } else {
        println!("No previous session data found.");
        println!();
    }

    // Current snapshot file, if one exists
    let snapshot_path = config.export_path.join(SNAPSHOT_FILE_NAME);
    if snapshot_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&snapshot_path) {
            let rows = content.lines().count().saturating_sub(1);
            println!("Snapshot file: {snapshot_path:?}");
            println!("  Rows: {rows}");
            if let Some(last) = content.lines().last().filter(|_| rows > 0) {
                println!("  Last: {last}");
            }
        }
    } else {
        println!("No snapshot file at {snapshot_path:?} yet.");
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
