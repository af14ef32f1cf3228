//! Small control-loop utilities for robotics firmware ports: a general
//! linear Kalman filter, a timeout/reentry state holder, a PID controller,
//! planar geometry helpers, coloured console logging and non-blocking key
//! polling.
//!
//! The components are independent. Anything time-dependent reads seconds
//! through [`time::Clock`].

pub mod config;
pub mod console;
pub mod error;
pub mod filters;
pub mod fsm;
pub mod geometry;
pub mod keyboard;
pub mod pid;
pub mod time;
pub mod types;

pub use config::FilterConfig;
pub use error::{ConfigError, KalmanError, KalmanResult};
pub use filters::{KalmanSnapshot, LinearKalmanFilter};
pub use fsm::TimeoutStateMachine;
pub use pid::{Pid, PidGains};
pub use time::{Clock, ManualClock, MonotonicClock};
