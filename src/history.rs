//! Rolling history of recent readings.
//!
//! A fixed-capacity FIFO window shared between the single ingestion writer
//! and any number of snapshot readers. Readers always get an independent
//! copy taken under the lock, never a live alias into the window.

use crate::sensor::Reading;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Number of readings retained by default.
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// A bounded, time-ordered window of readings, oldest first.
#[derive(Debug)]
pub struct RollingWindow {
    capacity: usize,
    readings: VecDeque<Reading>,
}

impl RollingWindow {
    /// Create an empty window. Capacity is fixed for the window's lifetime.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    /// Append one reading, evicting from the front once over capacity.
    pub fn push(&mut self, reading: Reading) {
        self.readings.push_back(reading);
        while self.readings.len() > self.capacity {
            self.readings.pop_front();
        }
    }

    /// The most recently pushed reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy the current contents, oldest first.
    pub fn to_vec(&self) -> Vec<Reading> {
        self.readings.iter().cloned().collect()
    }
}

/// Thread-safe handle to one [`RollingWindow`].
///
/// Clones share the same window. The intended discipline is one writer (the
/// ingestion loop calls [`push`](Self::push)) and any number of readers.
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<RollingWindow>>,
}

impl SharedHistory {
    /// Create an empty shared window with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RollingWindow::new(capacity))),
        }
    }

    /// Append one reading. Single-writer: only the ingestion loop calls this.
    pub fn push(&self, reading: Reading) {
        self.lock().push(reading);
    }

    /// A consistent point-in-time copy of the window, oldest first.
    ///
    /// Later pushes never mutate a returned snapshot.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.lock().to_vec()
    }

    /// The most recently pushed reading.
    pub fn latest(&self) -> Option<Reading> {
        self.lock().latest().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RollingWindow> {
        // A poisoned lock only means a reader panicked mid-copy; the window
        // itself is still whole-reading consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature_c: f64, humidity_pct: f64) -> Reading {
        Reading::new(temperature_c, humidity_pct)
    }

    #[test]
    fn test_window_starts_empty() {
        let window = RollingWindow::new(3);
        assert!(window.is_empty());
        assert!(window.latest().is_none());
        assert_eq!(window.capacity(), 3);
    }

    #[test]
    fn test_capacity_invariant() {
        let mut window = RollingWindow::new(5);
        for i in 0..20 {
            window.push(reading(i as f64, 50.0));
            assert!(window.len() <= 5);
        }
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn test_fifo_eviction_keeps_most_recent() {
        // capacity 3; push A, B, C, D -> window equals [B, C, D]
        let mut window = RollingWindow::new(3);
        for t in [1.0, 2.0, 3.0, 4.0] {
            window.push(reading(t, 50.0));
        }
        let temps: Vec<f64> = window.to_vec().iter().map(|r| r.temperature_c).collect();
        assert_eq!(temps, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_latest_is_last_pushed() {
        let mut window = RollingWindow::new(3);
        window.push(reading(1.0, 40.0));
        window.push(reading(2.0, 41.0));
        assert_eq!(window.latest().unwrap().temperature_c, 2.0);
    }

    #[test]
    fn test_snapshot_isolation() {
        let history = SharedHistory::new(10);
        history.push(reading(1.0, 40.0));

        let before = history.snapshot();
        history.push(reading(2.0, 41.0));
        let after = history.snapshot();

        assert_eq!(before.len(), 1);
        assert_eq!(after.len(), 2);
        // The earlier snapshot is untouched by the later push.
        assert_eq!(before[0].temperature_c, 1.0);
    }

    #[test]
    fn test_shared_handles_see_one_window() {
        let history = SharedHistory::new(4);
        let other = history.clone();
        history.push(reading(1.0, 40.0));
        assert_eq!(other.len(), 1);
        assert_eq!(other.latest().unwrap().temperature_c, 1.0);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let window = RollingWindow::new(0);
        assert_eq!(window.capacity(), 1);
    }
}
