use std::collections::VecDeque;

use crate::config::MotionThresholds;
use crate::types::MotionState;

/// Label the motion regime from short-window variance statistics.
///
/// Quiet on both signals is walking, busy on both is running, and everything
/// in between falls into the stairs bucket. The middle band carries no real
/// stair detection.
pub fn classify_motion(
    accel_variance: f64,
    gyro_variance: f64,
    thresholds: &MotionThresholds,
) -> MotionState {
    if accel_variance < thresholds.accel_low && gyro_variance < thresholds.gyro_low {
        MotionState::Walking
    } else if accel_variance > thresholds.accel_high && gyro_variance > thresholds.gyro_high {
        MotionState::Running
    } else {
        MotionState::Stairs
    }
}

/// Rolling window of acceleration-magnitude and rotation-rate samples
/// feeding the classifier.
#[derive(Clone, Debug)]
pub struct VarianceWindow {
    accel: VecDeque<f64>,
    rotation: VecDeque<f64>,
    window_size: usize,
}

impl VarianceWindow {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        VarianceWindow {
            accel: VecDeque::with_capacity(window_size),
            rotation: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Push one acceleration magnitude (m/s²); non-finite values are dropped
    pub fn push_accel(&mut self, magnitude: f64) {
        Self::push_bounded(&mut self.accel, magnitude, self.window_size);
    }

    /// Push one rotation rate (rad/s); non-finite values are dropped
    pub fn push_rotation(&mut self, rate: f64) {
        Self::push_bounded(&mut self.rotation, rate, self.window_size);
    }

    pub fn accel_variance(&self) -> f64 {
        variance(&self.accel)
    }

    pub fn rotation_variance(&self) -> f64 {
        variance(&self.rotation)
    }

    pub fn len(&self) -> usize {
        self.accel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accel.is_empty()
    }

    pub fn clear(&mut self) {
        self.accel.clear();
        self.rotation.clear();
    }

    fn push_bounded(buf: &mut VecDeque<f64>, value: f64, cap: usize) {
        if !value.is_finite() {
            return;
        }
        buf.push_back(value);
        while buf.len() > cap {
            buf.pop_front();
        }
    }
}

/// Population variance; zero for fewer than two samples
fn variance(values: &VecDeque<f64>) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_signals_are_walking() {
        let t = MotionThresholds::default();
        assert_eq!(classify_motion(0.2, 0.1, &t), MotionState::Walking);
    }

    #[test]
    fn test_busy_signals_are_running() {
        let t = MotionThresholds::default();
        assert_eq!(classify_motion(6.0, 3.0, &t), MotionState::Running);
    }

    #[test]
    fn test_middle_band_is_stairs() {
        let t = MotionThresholds::default();
        // One quiet, one busy
        assert_eq!(classify_motion(0.2, 3.0, &t), MotionState::Stairs);
        assert_eq!(classify_motion(6.0, 0.1, &t), MotionState::Stairs);
        // Between low and high on both
        assert_eq!(classify_motion(2.0, 1.0, &t), MotionState::Stairs);
        // Exactly at a boundary is neither strictly below nor above
        assert_eq!(classify_motion(t.accel_low, 0.1, &t), MotionState::Stairs);
    }

    #[test]
    fn test_window_variance() {
        let mut window = VarianceWindow::new(4);
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            window.push_accel(v);
        }
        // Only [5, 5, 7, 9] remain: mean 6.5, variance 2.75
        assert_eq!(window.len(), 4);
        assert!((window.accel_variance() - 2.75).abs() < 1e-12);
    }

    #[test]
    fn test_window_short_or_empty() {
        let mut window = VarianceWindow::new(10);
        assert!(window.is_empty());
        assert_eq!(window.accel_variance(), 0.0);
        window.push_accel(9.8);
        assert_eq!(window.accel_variance(), 0.0);
    }

    #[test]
    fn test_window_drops_non_finite() {
        let mut window = VarianceWindow::new(10);
        window.push_rotation(0.1);
        window.push_rotation(f64::NAN);
        window.push_rotation(0.3);
        assert!((window.rotation_variance() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_clear() {
        let mut window = VarianceWindow::new(3);
        window.push_accel(1.0);
        window.push_rotation(1.0);
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.rotation_variance(), 0.0);
    }
}
