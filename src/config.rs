//! Filter model files
//!
//! A model is a JSON object holding the time step and the five model
//! matrices as row-major nested arrays:
//!
//! ```json
//! {
//!   "dt": 0.1,
//!   "dynamics": [[1.0, 0.1], [0.0, 1.0]],
//!   "observation": [[1.0, 0.0]],
//!   "process_noise": [[1e-4, 0.0], [0.0, 1e-4]],
//!   "measurement_noise": [[0.25]],
//!   "error_covariance": [[1.0, 0.0], [0.0, 1.0]],
//!   "initial_state": [0.0, 0.0]
//! }
//! ```

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::filters::LinearKalmanFilter;
use crate::types::{mat_from_rows, DMat, DVec};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub dt: f64,
    pub dynamics: Vec<Vec<f64>>,
    pub observation: Vec<Vec<f64>>,
    pub process_noise: Vec<Vec<f64>>,
    pub measurement_noise: Vec<Vec<f64>>,
    pub error_covariance: Vec<Vec<f64>>,

    #[serde(default)]
    pub initial_state: Option<Vec<f64>>,

    #[serde(default)]
    pub initial_time: f64,
}

impl FilterConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!("loaded filter model from {}", path.display());
        Ok(config)
    }

    /// One-dimensional random-walk model with A = C = 1.
    pub fn scalar(dt: f64, q: f64, r: f64, p0: f64) -> Self {
        Self {
            dt,
            dynamics: vec![vec![1.0]],
            observation: vec![vec![1.0]],
            process_noise: vec![vec![q]],
            measurement_noise: vec![vec![r]],
            error_covariance: vec![vec![p0]],
            initial_state: None,
            initial_time: 0.0,
        }
    }

    /// Construct the filter. It still needs `init` before the first update.
    pub fn build(&self) -> Result<LinearKalmanFilter, ConfigError> {
        let filter = LinearKalmanFilter::new(
            self.dt,
            matrix("dynamics", &self.dynamics)?,
            matrix("observation", &self.observation)?,
            matrix("process_noise", &self.process_noise)?,
            matrix("measurement_noise", &self.measurement_noise)?,
            matrix("error_covariance", &self.error_covariance)?,
        )?;
        Ok(filter)
    }

    /// Construct and initialize from `initial_state`, or zeros if absent.
    pub fn build_initialized(&self) -> Result<LinearKalmanFilter, ConfigError> {
        let mut filter = self.build()?;
        match &self.initial_state {
            Some(x0) => filter.init_with(self.initial_time, DVec::from_vec(x0.clone()))?,
            None => filter.init(),
        }
        Ok(filter)
    }
}

fn matrix(name: &'static str, rows: &[Vec<f64>]) -> Result<DMat, ConfigError> {
    mat_from_rows(rows).map_err(|row| ConfigError::RaggedMatrix { name, row })
}
