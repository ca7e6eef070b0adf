//! Repeats a command script `N` times (or forever) with a minimum
//! inter-cycle period, stopping cleanly on a cooperative cancellation
//! signal. Grounded on `coincenter-commands-processor.cpp::process`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How many times a script should run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Repeats {
    Times(u32),
    Infinite,
}

impl Repeats {
    fn remaining_after(self, completed: u32) -> bool {
        match self {
            Repeats::Times(n) => completed < n,
            Repeats::Infinite => true,
        }
    }
}

/// A process-wide cooperative cancellation flag, set by a signal handler and
/// polled between commands and between repetitions (§5). Cloning shares the
/// same underlying flag.
#[derive(Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        CancellationFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs `run_once` up to `repeats` times, sleeping as needed so consecutive
/// invocations start at least `min_period` apart, and stopping before the
/// next cycle (or between repeats) once `cancellation` is observed.
/// In-flight work inside `run_once` is never interrupted.
///
/// Returns the number of cycles actually run.
pub fn run_repeating<F>(repeats: Repeats, min_period: Duration, cancellation: &CancellationFlag, mut run_once: F) -> u32
where
    F: FnMut(),
{
    let mut completed = 0u32;
    let mut last_start: Option<Instant> = None;

    while repeats.remaining_after(completed) && !cancellation.is_requested() {
        if let Some(last) = last_start {
            let earliest_next = last + min_period;
            let now = Instant::now();
            if now < earliest_next {
                std::thread::sleep(earliest_next - now);
            }
        }
        if cancellation.is_requested() {
            break;
        }
        last_start = Some(Instant::now());
        run_once();
        completed += 1;
    }

    completed
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn runs_exactly_the_requested_number_of_times() {
        let cancellation = CancellationFlag::new();
        let mut calls = 0;
        let completed = run_repeating(Repeats::Times(3), Duration::from_millis(0), &cancellation, || calls += 1);
        assert_eq!(completed, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn cancellation_stops_before_the_next_cycle() {
        let cancellation = CancellationFlag::new();
        let mut calls = 0;
        let completed = run_repeating(Repeats::Infinite, Duration::from_millis(0), &cancellation, || {
            calls += 1;
            if calls == 2 {
                cancellation.request();
            }
        });
        assert_eq!(completed, 2);
    }

    #[test]
    fn zero_repeats_runs_nothing() {
        let cancellation = CancellationFlag::new();
        let mut calls = 0;
        let completed = run_repeating(Repeats::Times(0), Duration::from_millis(0), &cancellation, || calls += 1);
        assert_eq!(completed, 0);
        assert_eq!(calls, 0);
    }
}
