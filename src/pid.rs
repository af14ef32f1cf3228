//! Discrete PID controller
//!
//! One step per call with no dt scaling: the integral accumulates `ki * e`
//! and the derivative is `kd * (e - e_prev)`. Integral and output are both
//! clamped to `±|limit|`. If the controller has not been called for
//! [`STALE_AFTER_S`] seconds its memory is dropped before the next step.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::time::{Clock, MonotonicClock};

/// Gap between calls after which integral and last error are reset
pub const STALE_AFTER_S: f64 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// PID controller with a stale-gap reset
///
/// `C` supplies the time used to detect a gap between calls.
#[derive(Debug)]
pub struct Pid<C: Clock = MonotonicClock> {
    gains: PidGains,
    integral: f64,
    last_error: f64,
    last_output: f64,
    last_call: Option<f64>,
    clock: C,
}

impl Pid<MonotonicClock> {
    pub fn new(gains: PidGains) -> Self {
        Self::with_clock(gains, MonotonicClock::new())
    }
}

impl<C: Clock> Pid<C> {
    pub fn with_clock(gains: PidGains, clock: C) -> Self {
        Self {
            gains,
            integral: 0.0,
            last_error: 0.0,
            last_output: 0.0,
            last_call: None,
            clock,
        }
    }

    pub fn calculate(&mut self, error: f64, limit: f64) -> f64 {
        let now = self.clock.now();
        if let Some(prev) = self.last_call {
            let gap = now - prev;
            if gap > STALE_AFTER_S {
                warn!("PID idle for {:.2}s, dropping integral {:.4}", gap, self.integral);
                self.integral = 0.0;
                self.last_error = 0.0;
            }
        }
        self.last_call = Some(now);

        let bound = limit.abs();
        let p = self.gains.kp * error;
        self.integral += self.gains.ki * error;
        let d = self.gains.kd * (error - self.last_error);
        self.last_error = error;

        // max/min rather than clamp: a NaN bound leaves the value unclamped
        self.integral = self.integral.max(-bound).min(bound);
        self.last_output = (p + self.integral + d).max(-bound).min(bound);
        self.last_output
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Accumulated state is kept.
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    pub fn last_output(&self) -> f64 {
        self.last_output
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.last_output = 0.0;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualClock;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_proportional_only() {
        let clock = ManualClock::new(0.0);
        let mut pid = Pid::with_clock(PidGains::new(2.0, 0.0, 0.0), &clock);
        assert_abs_diff_eq!(pid.calculate(1.5, 10.0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pid.calculate(-0.5, 10.0), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_integral_and_derivative_terms() {
        let clock = ManualClock::new(0.0);
        let mut pid = Pid::with_clock(PidGains::new(1.0, 0.5, 0.25), &clock);

        // p = 2, i = 1, d = 0.25 * 2
        assert_abs_diff_eq!(pid.calculate(2.0, 100.0), 3.5, epsilon = 1e-12);
        clock.advance(0.1);
        // p = 1, i = 1.5, d = 0.25 * (1 - 2)
        assert_abs_diff_eq!(pid.calculate(1.0, 100.0), 2.25, epsilon = 1e-12);
        assert_abs_diff_eq!(pid.integral(), 1.5, epsilon = 1e-12);
        assert_eq!(pid.last_error(), 1.0);
    }

    #[test]
    fn test_output_and_integral_clamped() {
        let clock = ManualClock::new(0.0);
        let mut pid = Pid::with_clock(PidGains::new(0.0, 1.0, 0.0), &clock);
        for _ in 0..10 {
            clock.advance(0.05);
            pid.calculate(1.0, 3.0);
        }
        assert_eq!(pid.integral(), 3.0);
        assert_eq!(pid.last_output(), 3.0);

        let mut strong = Pid::with_clock(PidGains::new(100.0, 0.0, 0.0), &clock);
        assert_eq!(strong.calculate(-1.0, 5.0), -5.0);
    }

    #[test]
    fn test_negative_limit_uses_magnitude() {
        let clock = ManualClock::new(0.0);
        let mut pid = Pid::with_clock(PidGains::new(10.0, 0.0, 0.0), &clock);
        assert_eq!(pid.calculate(1.0, -2.0), 2.0);
        assert_eq!(pid.calculate(-1.0, -2.0), -2.0);
    }

    #[test]
    fn test_stale_gap_resets_memory() {
        let clock = ManualClock::new(0.0);
        let mut pid = Pid::with_clock(PidGains::new(0.0, 1.0, 1.0), &clock);
        pid.calculate(1.0, 10.0);
        clock.advance(0.5);
        pid.calculate(1.0, 10.0);
        assert_abs_diff_eq!(pid.integral(), 2.0, epsilon = 1e-12);

        clock.advance(2.5);
        // Integral restarts from zero and derivative sees e_prev = 0
        let out = pid.calculate(1.0, 10.0);
        assert_abs_diff_eq!(pid.integral(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(out, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_call_after_long_start_does_not_reset() {
        let clock = ManualClock::new(100.0);
        let mut pid = Pid::with_clock(PidGains::new(0.0, 1.0, 0.0), &clock);
        assert_eq!(pid.calculate(0.5, 10.0), 0.5);
    }

    #[test]
    fn test_reset_and_set_gains() {
        let clock = ManualClock::new(0.0);
        let mut pid = Pid::with_clock(PidGains::default(), &clock);
        pid.set_gains(PidGains::new(1.0, 1.0, 0.0));
        pid.calculate(2.0, 10.0);
        assert!(pid.integral() > 0.0);

        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.last_error(), 0.0);
        assert_eq!(pid.last_output(), 0.0);
        assert_eq!(pid.gains(), PidGains::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_nan_limit_does_not_panic() {
        let clock = ManualClock::new(0.0);
        let mut pid = Pid::with_clock(PidGains::new(1.0, 0.0, 0.0), &clock);
        let out = pid.calculate(1.0, f64::NAN);
        assert_eq!(out, 1.0);
        assert_eq!(pid.integral(), 0.0);

        // A later finite limit clamps as usual
        assert_eq!(pid.calculate(4.0, 2.0), 2.0);
    }

    #[test]
    fn test_debug_output() {
        let clock = ManualClock::new(0.0);
        let pid = Pid::with_clock(PidGains::new(0.5, 0.0, 0.0), &clock);
        let text = format!("{:?}", pid);
        assert!(text.contains("kp: 0.5"));
    }

    #[test]
    fn test_gains_from_json() {
        let gains: PidGains = serde_json::from_str(r#"{"kp": 1.2, "ki": 0.01, "kd": 0.3}"#).unwrap();
        assert_eq!(gains, PidGains::new(1.2, 0.01, 0.3));
    }
}
