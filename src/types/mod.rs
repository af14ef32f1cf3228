pub mod linalg;

pub use linalg::*;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_polar(self) -> Polar2d {
        Polar2d {
            r: self.x.hypot(self.y),
            theta: self.y.atan2(self.x),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polar2d {
    pub r: f64,
    /// Radians, counter-clockwise from +x
    pub theta: f64,
}

impl Polar2d {
    pub fn to_point(self) -> Point2d {
        Point2d {
            x: self.r * self.theta.cos(),
            y: self.r * self.theta.sin(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose2d {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2d {
    pub fn position(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }
}

/// Raw 16-bit encoder count with its last step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderReading {
    pub curr_px: u16,
    pub prev_px: u16,
    pub speed: i16,
}

impl EncoderReading {
    /// Shift in a new count. `speed` is the wrapping difference, so a
    /// counter rollover reads as a small step.
    pub fn update(&mut self, px: u16) {
        self.prev_px = self.curr_px;
        self.curr_px = px;
        self.speed = self.curr_px.wrapping_sub(self.prev_px) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_polar_round_trip() {
        let p = Polar2d { r: 2.0, theta: FRAC_PI_2 }.to_point();
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-12);

        let polar = Point2d::new(3.0, 4.0).to_polar();
        assert_abs_diff_eq!(polar.r, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_encoder_forward_step() {
        let mut enc = EncoderReading::default();
        enc.update(100);
        enc.update(130);
        assert_eq!(enc.prev_px, 100);
        assert_eq!(enc.curr_px, 130);
        assert_eq!(enc.speed, 30);
    }

    #[test]
    fn test_encoder_rollover() {
        let mut enc = EncoderReading {
            curr_px: 65530,
            prev_px: 65500,
            speed: 30,
        };
        enc.update(4);
        assert_eq!(enc.speed, 10);

        enc.update(65534);
        assert_eq!(enc.speed, -6);
    }

    #[test]
    fn test_pose_serde() {
        let pose = Pose2d { x: 1.0, y: -2.0, theta: 0.5 };
        let json = serde_json::to_string(&pose).unwrap();
        let back: Pose2d = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pose);
        assert_eq!(back.position(), Point2d::new(1.0, -2.0));
    }
}
