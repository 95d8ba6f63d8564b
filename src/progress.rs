//! # Progress — Atomic Iteration Counters
//!
//! Shared between the engine's iteration loop and a background status
//! reporter. The engine publishes the completed-iteration count with one
//! relaxed store per squaring; the reporter reads it on its own schedule, so
//! the hot loop never blocks on the reporter.
//!
//! ## Background Reporter
//!
//! A dedicated thread logs progress every `interval`: completed iterations,
//! percentage, rate (iterations/sec) and an ETA. It polls the shutdown flag
//! in short slices so `stop()` followed by `join()` returns promptly even with
//! long intervals.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// How often the reporter thread checks for shutdown.
const POLL_SLICE: Duration = Duration::from_millis(50);

pub struct Progress {
    /// Squarings completed so far.
    pub completed: AtomicU64,
    /// Squarings planned for the run.
    pub total: AtomicU64,
    /// What is being tested, e.g. `M127`.
    pub current: Mutex<String>,
    start: Instant,
    shutdown: AtomicBool,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            completed: AtomicU64::new(0),
            total: AtomicU64::new(0),
            current: Mutex::new(String::new()),
            start: Instant::now(),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Reset counters for a run of `total` squarings on `label`.
    pub fn begin(&self, label: &str, total: u64) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = label.to_string();
    }

    pub fn start_reporter(self: &Arc<Self>, interval: Duration) -> thread::JoinHandle<()> {
        let progress = Arc::clone(self);
        thread::spawn(move || loop {
            let mut waited = Duration::ZERO;
            while waited < interval {
                if progress.shutdown.load(Ordering::Relaxed) {
                    return;
                }
                thread::sleep(POLL_SLICE);
                waited += POLL_SLICE;
            }
            if progress.shutdown.load(Ordering::Relaxed) {
                return;
            }
            progress.print_status();
        })
    }

    /// Estimated time to completion at the average rate so far.
    pub fn eta(&self) -> Option<Duration> {
        let done = self.completed.load(Ordering::Relaxed);
        let total = self.total.load(Ordering::Relaxed);
        if done == 0 || total < done {
            return None;
        }
        let per_iter = self.start.elapsed().as_secs_f64() / done as f64;
        Some(Duration::from_secs_f64(per_iter * (total - done) as f64))
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let completed = self.completed.load(Ordering::Relaxed);
        let total = self.total.load(Ordering::Relaxed);
        let current = self
            .current
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default();
        let rate = if elapsed.as_secs() > 0 {
            completed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let percent = if total > 0 {
            100.0 * completed as f64 / total as f64
        } else {
            0.0
        };
        let eta = self.eta().map(|d| d.as_secs()).unwrap_or(0);
        info!(
            current = %current,
            completed,
            total,
            percent = format_args!("{:.2}", percent),
            rate = format_args!("{:.2}", rate),
            elapsed = format_args!("{}", format_hms(elapsed.as_secs())),
            eta = format_args!("{}", format_hms(eta)),
            "lucas-lehmer progress"
        );
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

fn format_hms(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
