//! Integration tests for the ingestion/rolling-window pipeline

use hygrolog::export::{write_snapshot, CsvExporter, SNAPSHOT_FILE_NAME};
use hygrolog::history::SharedHistory;
use hygrolog::ingest::Ingestor;
use hygrolog::render::RenderNotifier;
use hygrolog::sensor::{Reading, ScriptedSource};
use hygrolog::stats::create_shared_stats;
use hygrolog::ExportInterval;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn frame(temperature_c: f64, humidity_pct: f64) -> String {
    format!("Humidity: {humidity_pct} %\tTemperature: {temperature_c} *C")
}

/// Wait for the ingestion loop to drain its script and terminate.
fn wait_until_stopped(ingestor: &Ingestor) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while ingestor.is_running() {
        assert!(Instant::now() < deadline, "ingestion did not stop in time");
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn scripted_ingestion_end_to_end() {
    let script = vec![
        frame(23.5, 45.0),
        String::new(),
        "garbage".to_string(),
        "Humidity: abc %\tTemperature: 23.5 *C".to_string(),
        frame(23.7, 46.2),
    ];

    let history = SharedHistory::new(100);
    let stats = create_shared_stats();
    let mut ingestor = Ingestor::new(
        Box::new(ScriptedSource::new(script)),
        history.clone(),
        stats.clone(),
    );

    ingestor.start().unwrap();
    wait_until_stopped(&ingestor);

    // Only the two well-formed frames made it into the window, in order.
    let snapshot = history.snapshot();
    let temps: Vec<f64> = snapshot.iter().map(|r| r.temperature_c).collect();
    assert_eq!(temps, vec![23.5, 23.7]);
    assert_eq!(history.latest().unwrap().humidity_pct, 46.2);

    // The blank line is a no-op, the two bad frames are counted as rejected.
    let counters = stats.stats();
    assert_eq!(counters.frames_received, 4);
    assert_eq!(counters.frames_rejected, 2);
    assert_eq!(counters.readings_recorded, 2);

    // Both accepted readings were handed off to the presentation channel.
    let receiver = ingestor.receiver();
    assert_eq!(receiver.recv().unwrap().temperature_c, 23.5);
    assert_eq!(receiver.recv().unwrap().temperature_c, 23.7);
    assert!(receiver.is_empty());

    ingestor.stop();
}

#[test]
fn ingestion_stops_on_stream_closure() {
    let history = SharedHistory::new(10);
    let mut ingestor = Ingestor::new(
        Box::new(ScriptedSource::new([frame(20.0, 50.0)])),
        history.clone(),
        create_shared_stats(),
    );

    ingestor.start().unwrap();
    wait_until_stopped(&ingestor);

    // The loop died on its own, but the window keeps serving readers.
    assert!(!ingestor.is_running());
    assert_eq!(history.len(), 1);
    assert_eq!(history.latest().unwrap().temperature_c, 20.0);
}

#[test]
fn concurrent_snapshots_are_prefix_consistent() {
    const CAPACITY: usize = 50;
    const PUSHES: usize = 500;
    const READERS: usize = 4;

    let history = SharedHistory::new(CAPACITY);
    let done = Arc::new(AtomicBool::new(false));

    // Each reading pairs temperature i with humidity i + 0.5, so a torn or
    // mixed-up sample is detectable from either field.
    let writer = {
        let history = history.clone();
        let done = done.clone();
        thread::spawn(move || {
            for i in 0..PUSHES {
                history.push(Reading::new(i as f64, i as f64 + 0.5));
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let history = history.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut last_len = 0;
                while !done.load(Ordering::SeqCst) {
                    let snapshot = history.snapshot();

                    // Never more than capacity, never shrinking.
                    assert!(snapshot.len() <= CAPACITY);
                    assert!(snapshot.len() >= last_len);
                    last_len = snapshot.len();

                    for (offset, reading) in snapshot.iter().enumerate() {
                        // Field-complete: both values from the same sample.
                        assert_eq!(reading.humidity_pct, reading.temperature_c + 0.5);
                        // Prefix-consistent: contiguous run of pushes.
                        let first = snapshot[0].temperature_c;
                        assert_eq!(reading.temperature_c, first + offset as f64);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    // Final window is exactly the most recent CAPACITY pushes in order.
    let final_snapshot = history.snapshot();
    assert_eq!(final_snapshot.len(), CAPACITY);
    assert_eq!(
        final_snapshot[0].temperature_c,
        (PUSHES - CAPACITY) as f64
    );
    assert_eq!(
        final_snapshot.last().unwrap().temperature_c,
        (PUSHES - 1) as f64
    );
}

#[test]
fn render_notifier_emits_frames() {
    let history = SharedHistory::new(10);
    let mut notifier = RenderNotifier::new(history.clone(), Duration::from_millis(10));

    notifier.start().unwrap();
    let frames = notifier.receiver().clone();

    // An empty store still produces a (possibly empty) frame per tick.
    let first = frames
        .recv_timeout(Duration::from_secs(2))
        .expect("no frame from empty store");
    assert!(first.is_empty());

    history.push(Reading::new(21.0, 55.0));

    // Eventually a frame reflects the pushed reading.
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let frame = frames
            .recv_timeout(Duration::from_secs(2))
            .expect("no frame after push");
        if !frame.is_empty() {
            assert_eq!(frame[0].temperature_c, 21.0);
            break;
        }
        assert!(Instant::now() < deadline, "frames never showed the reading");
    }

    notifier.stop();
    assert!(!notifier.is_running());
}

#[test]
fn exporter_writes_on_startup_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let history = SharedHistory::new(10);
    history.push(Reading::new(19.5, 61.0));

    let stats = create_shared_stats();
    let mut exporter = CsvExporter::new(
        history.clone(),
        stats.clone(),
        ExportInterval::TenMinutes,
        dir.path(),
    );
    let path = exporter.path().to_path_buf();
    assert!(path.ends_with(SNAPSHOT_FILE_NAME));

    exporter.start().unwrap();

    // First write happens immediately, well before the first interval.
    let deadline = Instant::now() + Duration::from_secs(2);
    while !path.exists() {
        assert!(Instant::now() < deadline, "snapshot file never appeared");
        thread::sleep(Duration::from_millis(20));
    }
    exporter.stop();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Timestamp,Temperature (°C),Humidity (%)"
    );
    assert_eq!(lines.count(), 1);
    assert!(stats.stats().snapshots_written >= 1);
}

#[test]
fn export_has_no_side_effect_on_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SNAPSHOT_FILE_NAME);

    let history = SharedHistory::new(10);
    history.push(Reading::new(22.0, 48.0));
    history.push(Reading::new(22.1, 48.2));

    let before = history.snapshot();
    write_snapshot(&path, &before).unwrap();
    let first = std::fs::read(&path).unwrap();
    write_snapshot(&path, &history.snapshot()).unwrap();
    let second = std::fs::read(&path).unwrap();

    // No intervening pushes: byte-identical files, unchanged window.
    assert_eq!(first, second);
    assert_eq!(history.snapshot(), before);
}
