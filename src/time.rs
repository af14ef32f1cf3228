//! Time sources
//!
//! Components that gate on elapsed time read "now" through the [`Clock`]
//! trait so that tests and simulations can drive time by hand.

use chrono::Utc;
use std::cell::Cell;
use std::time::Instant;

/// Monotonic time source reporting seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Seconds elapsed since the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Caller-driven clock for tests and offline simulation.
///
/// Time only moves when [`ManualClock::advance`] or [`ManualClock::set`] is
/// called. Not `Sync`; share it by reference within one thread.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, t: f64) {
        self.now.set(t);
    }

    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Wall-clock seconds since the Unix epoch, microsecond resolution
pub fn unix_time_s() -> f64 {
    let now = Utc::now();
    now.timestamp() as f64 + now.timestamp_subsec_micros() as f64 / 1_000_000.0
}

/// Wall-clock microseconds since the Unix epoch
pub fn unix_time_us() -> u64 {
    Utc::now().timestamp_micros().max(0) as u64
}

/// Wall-clock milliseconds since the Unix epoch
pub fn unix_time_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Wall-clock whole seconds since the Unix epoch
pub fn unix_time_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// `HH:MM:SS.mmm` (UTC) for log prefixes
pub fn ts_now() -> String {
    Utc::now().format("%H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_manual_clock_advance_and_set() {
        let clock = ManualClock::new(1.0);
        assert_eq!(clock.now(), 1.0);

        clock.advance(0.25);
        assert_abs_diff_eq!(clock.now(), 1.25, epsilon = 1e-12);

        clock.set(10.0);
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    fn test_clock_by_reference() {
        fn read<C: Clock>(c: C) -> f64 {
            c.now()
        }
        let clock = ManualClock::new(3.5);
        assert_eq!(read(&clock), 3.5);
    }

    #[test]
    fn test_monotonic_clock_non_decreasing() {
        let clock = MonotonicClock::new();
        let t0 = clock.now();
        thread::sleep(Duration::from_millis(5));
        let t1 = clock.now();
        assert!(t0 >= 0.0);
        assert!(t1 >= t0 + 0.004);
    }

    #[test]
    fn test_wall_clock_units_agree() {
        let secs = unix_time_secs();
        let ms = unix_time_ms();
        let us = unix_time_us();
        let s = unix_time_s();

        assert!((ms / 1000).abs_diff(secs) <= 1);
        assert!((us / 1_000_000).abs_diff(secs) <= 1);
        assert!((s - secs as f64).abs() <= 1.5);
    }

    #[test]
    fn test_ts_now_format() {
        let ts = ts_now();
        // HH:MM:SS.mmm
        assert_eq!(ts.len(), 12);
        assert_eq!(&ts[2..3], ":");
        assert_eq!(&ts[8..9], ".");
    }
}
