//! Timeout / reentry state holder
//!
//! `value` is whatever state type the caller defines; the transition graph
//! lives in the caller's `match` on it. This type only adds time-gated
//! overwrites of `value` and an interrupt edge detector.
//!
//! ```
//! use rd_kits::fsm::TimeoutStateMachine;
//!
//! #[derive(Clone, Copy, Debug, Default, PartialEq)]
//! enum Phase {
//!     #[default]
//!     Search,
//!     Approach,
//! }
//!
//! let mut state: TimeoutStateMachine<Phase> = TimeoutStateMachine::new();
//! match state.value {
//!     Phase::Search => {
//!         state.timeout(Phase::Approach, 0.04);
//!     }
//!     Phase::Approach => state.value = Phase::Search,
//! }
//! ```

use log::debug;

use crate::time::{Clock, MonotonicClock};

/// Caller-owned state value with a timeout timer, a reentry timer and an
/// interrupt counter pair.
#[derive(Debug)]
pub struct TimeoutStateMachine<S, C: Clock = MonotonicClock> {
    /// Current state. Free to be assigned directly.
    pub value: S,

    /// Bumped by whoever signals an interrupt
    pub interrupt_counter: u8,

    /// Last counter value the control loop acknowledged
    pub prev_interrupt_counter: u8,

    timeout_anchor: f64,
    reentry_anchor: f64,
    clock: C,
}

impl<S: Default> TimeoutStateMachine<S, MonotonicClock> {
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl<S: Default> Default for TimeoutStateMachine<S, MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Default, C: Clock> TimeoutStateMachine<S, C> {
    pub fn with_clock(clock: C) -> Self {
        Self::with_state(S::default(), clock)
    }
}

impl<S, C: Clock> TimeoutStateMachine<S, C> {
    /// Both timers are armed at construction time.
    pub fn with_state(value: S, clock: C) -> Self {
        let now = clock.now();
        Self {
            value,
            interrupt_counter: 0,
            prev_interrupt_counter: 0,
            timeout_anchor: now,
            reentry_anchor: now,
            clock,
        }
    }

    /// True while the interrupt counter differs from the acknowledged one.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt_counter != self.prev_interrupt_counter
    }

    pub fn raise_interrupt(&mut self) {
        self.interrupt_counter = self.interrupt_counter.wrapping_add(1);
    }

    pub fn acknowledge_interrupt(&mut self) {
        self.prev_interrupt_counter = self.interrupt_counter;
    }

    pub fn reset_timeout(&mut self) {
        self.timeout_anchor = self.clock.now();
    }

    pub fn reset_reentry(&mut self) {
        self.reentry_anchor = self.clock.now();
    }

    /// Switch to `target` once more than `period` seconds have passed since
    /// the timeout timer was last armed. Firing re-arms the timer; otherwise
    /// nothing changes.
    pub fn timeout(&mut self, target: S, period: f64) -> bool {
        let now = self.clock.now();
        let elapsed = now - self.timeout_anchor;
        if elapsed > period {
            self.value = target;
            self.timeout_anchor = now;
            debug!("timeout fired after {:.3}s (period {:.3}s)", elapsed, period);
            return true;
        }
        false
    }

    /// Switch to `target` if more than `period` seconds have passed since the
    /// previous reentry call. The timer is re-armed on every call, fired or
    /// not, so this detects gaps between consecutive calls.
    pub fn reentry(&mut self, target: S, period: f64) -> bool {
        let now = self.clock.now();
        let elapsed = now - self.reentry_anchor;
        self.reentry_anchor = now;
        if elapsed > period {
            self.value = target;
            debug!("reentry fired after {:.3}s gap (period {:.3}s)", elapsed, period);
            return true;
        }
        false
    }

    pub fn timeout_anchor(&self) -> f64 {
        self.timeout_anchor
    }

    pub fn reentry_anchor(&self) -> f64 {
        self.reentry_anchor
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
