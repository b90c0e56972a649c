//! Demonstration of the hygrolog pipeline without a sensor board.
//!
//! This example shows how to:
//! 1. Build a scripted sensor link from canned frames
//! 2. Run the ingestion loop against it
//! 3. Consume the latest-reading hand-off channel
//! 4. Snapshot the rolling window and export it to CSV
//!
//! Run with: cargo run --example replay_demo

use std::time::Duration;

use hygrolog::{
    export::{write_snapshot, SNAPSHOT_FILE_NAME},
    history::SharedHistory,
    ingest::Ingestor,
    sensor::ScriptedSource,
    stats::create_shared_stats,
};

fn main() {
    println!("hygrolog - Replay Demo");
    println!("======================");
    println!();

    // A short broadcast from an imaginary board, including two frames the
    // parser should reject.
    let script = vec![
        "Humidity: 45.0 %\tTemperature: 23.5 *C".to_string(),
        "Humidity: 45.3 %\tTemperature: 23.6 *C".to_string(),
        "bootloader noise".to_string(),
        "Humidity: 45.9 %\tTemperature: 23.8 *C".to_string(),
        "Humidity: nan %\tTemperature: 23.8 *C".to_string(),
        "Humidity: 46.4 %\tTemperature: 24.0 *C".to_string(),
    ];

    let history = SharedHistory::new(100);
    let stats = create_shared_stats();
    let source = ScriptedSource::new(script);

    println!("Replaying {} scripted lines...", source.remaining());
    println!();

    let mut ingestor = Ingestor::new(Box::new(source), history.clone(), stats.clone());

    if let Err(e) = ingestor.start() {
        eprintln!("Error starting ingestion: {e}");
        return;
    }

    // Consume the readout channel until the script runs out.
    let receiver = ingestor.receiver().clone();
    while ingestor.is_running() || !receiver.is_empty() {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(reading) => {
                println!(
                    "  [{}] Temperature: {:.1} °C | Humidity: {:.1} %",
                    reading.timestamp.format("%H:%M:%S"),
                    reading.temperature_c,
                    reading.humidity_pct
                );
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }
    ingestor.stop();

    println!();
    println!(
        "Window holds {} of {} readings",
        history.len(),
        history.capacity()
    );

    // Export the final window the way the periodic exporter would.
    let export_path = std::env::temp_dir().join(SNAPSHOT_FILE_NAME);
    match write_snapshot(&export_path, &history.snapshot()) {
        Ok(()) => println!("Snapshot written to {export_path:?}"),
        Err(e) => eprintln!("Error writing snapshot: {e}"),
    }

    println!();
    println!("{}", stats.summary());
    println!();
    println!("Demo complete!");
}
