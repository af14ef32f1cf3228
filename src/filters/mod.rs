pub mod linear_kf;

pub use linear_kf::{KalmanSnapshot, LinearKalmanFilter};
