//! Discrete-time linear Kalman filter
//!
//! Model:
//!   x_(k+1) = A x_k + w,  w ~ N(0, Q)
//!   y_k     = C x_k + v,  v ~ N(0, R)
//!
//! n = rows(A) is the state dimension, m = rows(C) the observation dimension.
//! All matrices are fixed at construction except A and dt, which
//! `update_with` may replace call-by-call.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{KalmanError, KalmanResult};
use crate::types::{covariance_trace, DMat, DVec};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KalmanSnapshot {
    /// Current filter time
    pub time: f64,
    pub initial_time: f64,
    pub dt: f64,

    /// State estimate x_hat
    pub state: Vec<f64>,

    /// Covariance trace for uncertainty
    pub covariance_trace: f64,

    /// Successful updates since the last init
    pub updates: u64,
}

#[derive(Clone, Debug)]
pub struct LinearKalmanFilter {
    /// System dynamics [n x n]
    a: DMat,

    /// Observation matrix [m x n]
    c: DMat,

    /// Process noise covariance [n x n]
    q: DMat,

    /// Measurement noise covariance [m x m]
    r: DMat,

    /// Error covariance restored by init [n x n]
    p0: DMat,

    /// Error covariance [n x n]
    p: DMat,

    /// Last Kalman gain [n x m]
    k: DMat,

    identity: DMat,

    /// State estimate [n]
    x_hat: DVec,

    n: usize,
    m: usize,

    /// Time step [seconds]
    dt: f64,
    t0: f64,
    t: f64,

    initialized: bool,
    updates: u64,
}

fn check_shape(what: &'static str, mat: &DMat, rows: usize, cols: usize) -> KalmanResult<()> {
    let (r, c) = mat.shape();
    if r != rows || c != cols {
        return Err(KalmanError::DimensionMismatch {
            what,
            rows: r,
            cols: c,
            expected_rows: rows,
            expected_cols: cols,
        });
    }
    Ok(())
}

fn check_len(what: &'static str, vec: &DVec, len: usize) -> KalmanResult<()> {
    if vec.len() != len {
        return Err(KalmanError::DimensionMismatch {
            what,
            rows: vec.len(),
            cols: 1,
            expected_rows: len,
            expected_cols: 1,
        });
    }
    Ok(())
}

impl LinearKalmanFilter {
    /// Create a filter from
    ///   a  - system dynamics
    ///   c  - output matrix
    ///   q  - process noise covariance
    ///   r  - measurement noise covariance
    ///   p0 - initial estimate error covariance
    ///
    /// The filter must be initialized with `init` or `init_with` before the
    /// first update.
    pub fn new(dt: f64, a: DMat, c: DMat, q: DMat, r: DMat, p0: DMat) -> KalmanResult<Self> {
        let n = a.nrows();
        let m = c.nrows();
        if n == 0 || m == 0 {
            return Err(KalmanError::EmptyModel);
        }

        check_shape("dynamics matrix", &a, n, n)?;
        check_shape("observation matrix", &c, m, n)?;
        check_shape("process noise covariance", &q, n, n)?;
        check_shape("measurement noise covariance", &r, m, m)?;
        check_shape("error covariance", &p0, n, n)?;

        Ok(Self {
            a,
            c,
            q,
            r,
            p: p0.clone(),
            p0,
            k: DMat::zeros(n, m),
            identity: DMat::identity(n, n),
            x_hat: DVec::zeros(n),
            n,
            m,
            dt,
            t0: 0.0,
            t: 0.0,
            initialized: false,
            updates: 0,
        })
    }

    /// Initialize with a zero state at time 0.
    pub fn init(&mut self) {
        self.x_hat = DVec::zeros(self.n);
        self.reset(0.0);
    }

    /// Initialize with a guess for the state at time `t0`.
    pub fn init_with(&mut self, t0: f64, x0: DVec) -> KalmanResult<()> {
        check_len("initial state", &x0, self.n)?;
        self.x_hat = x0;
        self.reset(t0);
        Ok(())
    }

    fn reset(&mut self, t0: f64) {
        self.p = self.p0.clone();
        self.k = DMat::zeros(self.n, self.m);
        self.t0 = t0;
        self.t = t0;
        self.updates = 0;
        self.initialized = true;
        debug!("kalman filter initialized: n={}, m={}, t0={:.3}", self.n, self.m, t0);
    }

    /// Fold in one observation using the stored time step and dynamics.
    ///
    /// Nothing is committed unless the whole step succeeds.
    pub fn update(&mut self, y: &DVec) -> KalmanResult<()> {
        if !self.initialized {
            return Err(KalmanError::NotInitialized);
        }
        check_len("observation", y, self.m)?;

        // Predict
        let x_pred = &self.a * &self.x_hat;
        let p_pred = &self.a * &self.p * self.a.transpose() + &self.q;

        // Gain: K = P C^T (C P C^T + R)^-1
        let c_t = self.c.transpose();
        let s = &self.c * &p_pred * &c_t + &self.r;
        let s_inv = match s.try_inverse() {
            Some(inv) => inv,
            None => {
                warn!("innovation covariance is singular at t={:.3}", self.t);
                return Err(KalmanError::SingularInnovation);
            }
        };
        let k = &p_pred * &c_t * s_inv;

        // Correct
        let innovation = y - &self.c * &x_pred;
        let x_new = &x_pred + &k * innovation;
        let p_new = (&self.identity - &k * &self.c) * p_pred;

        self.x_hat = x_new;
        self.p = p_new;
        self.k = k;
        self.t += self.dt;
        self.updates += 1;

        trace!(
            "kalman update #{}: t={:.3}, trace(P)={:.6}",
            self.updates,
            self.t,
            covariance_trace(&self.p)
        );
        Ok(())
    }

    /// Replace the time step and dynamics matrix, then update.
    ///
    /// A wrongly shaped `a` is rejected before anything is stored.
    pub fn update_with(&mut self, y: &DVec, dt: f64, a: DMat) -> KalmanResult<()> {
        check_shape("dynamics matrix", &a, self.n, self.n)?;
        self.a = a;
        self.dt = dt;
        self.update(y)
    }

    pub fn state(&self) -> &DVec {
        &self.x_hat
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn covariance(&self) -> &DMat {
        &self.p
    }

    /// Gain from the last successful update; zero until then.
    pub fn gain(&self) -> &DMat {
        &self.k
    }

    pub fn dynamics(&self) -> &DMat {
        &self.a
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn initial_time(&self) -> f64 {
        self.t0
    }

    pub fn state_dim(&self) -> usize {
        self.n
    }

    pub fn observation_dim(&self) -> usize {
        self.m
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn snapshot(&self) -> KalmanSnapshot {
        KalmanSnapshot {
            time: self.t,
            initial_time: self.t0,
            dt: self.dt,
            state: self.x_hat.iter().copied().collect(),
            covariance_trace: covariance_trace(&self.p),
            updates: self.updates,
        }
    }
}
