use crate::config::PdrConfig;
use crate::types::{DeviceContext, MotionState};

/// Linear step-length model: `alpha * frequency + beta * variance + gamma`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepCoefficients {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl StepCoefficients {
    pub const fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    pub fn apply(&self, frequency: f64, variance: f64) -> f64 {
        self.alpha * frequency + self.beta * variance + self.gamma
    }
}

/// Used for any (motion, context) pair without its own calibration
pub const FALLBACK_COEFFICIENTS: StepCoefficients = StepCoefficients::new(0.2, 0.05, 0.25);

/// Calibration lookup keyed by motion regime and carry position
pub fn coefficients_for(motion: MotionState, context: DeviceContext) -> StepCoefficients {
    match (motion, context) {
        (MotionState::Walking, DeviceContext::Holding) => StepCoefficients::new(0.25, 0.05, 0.2),
        (MotionState::Walking, DeviceContext::Pocket) => StepCoefficients::new(0.22, 0.04, 0.22),
        (MotionState::Running, DeviceContext::Holding) => StepCoefficients::new(0.3, 0.08, 0.35),
        (MotionState::Running, DeviceContext::Pocket) => StepCoefficients::new(0.28, 0.07, 0.35),
        (MotionState::Stairs, DeviceContext::Holding) => StepCoefficients::new(0.15, 0.03, 0.15),
        _ => FALLBACK_COEFFICIENTS,
    }
}

/// Step frequency in Hz from the interval since the previous step.
/// Zero, negative or non-finite intervals fall back to 1 Hz.
pub fn step_frequency(interval: f64) -> f64 {
    if interval.is_finite() && interval > 0.0 {
        1.0 / interval
    } else {
        1.0
    }
}

/// Raw (unclamped) step length in meters
pub fn estimate_step_length(
    frequency: f64,
    accel_variance: f64,
    motion: MotionState,
    context: DeviceContext,
) -> f64 {
    coefficients_for(motion, context).apply(frequency, accel_variance)
}

/// Clamp into the configured plausible range for walking and running.
/// Stairs has no configured range and passes through unchanged.
pub fn correct_step_length(length: f64, motion: MotionState, config: &PdrConfig) -> f64 {
    match motion {
        MotionState::Walking => config.step_length_walk_range.clamp(length),
        MotionState::Running => config.step_length_run_range.clamp(length),
        MotionState::Stairs => length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_fallback() {
        assert_eq!(step_frequency(0.5), 2.0);
        assert_eq!(step_frequency(0.0), 1.0);
        assert_eq!(step_frequency(-0.3), 1.0);
        assert_eq!(step_frequency(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_linear_model() {
        let len = estimate_step_length(2.0, 0.5, MotionState::Walking, DeviceContext::Holding);
        // 0.25 * 2 + 0.05 * 0.5 + 0.2
        assert!((len - 0.725).abs() < 1e-12);
    }

    #[test]
    fn test_unmatched_pair_uses_fallback() {
        assert_eq!(
            coefficients_for(MotionState::Stairs, DeviceContext::Pocket),
            FALLBACK_COEFFICIENTS
        );
        assert_ne!(
            coefficients_for(MotionState::Walking, DeviceContext::Pocket),
            FALLBACK_COEFFICIENTS
        );
    }

    #[test]
    fn test_walking_clamped_into_range() {
        let config = PdrConfig::default();
        let range = config.step_length_walk_range;
        for raw in [-3.0, 0.0, 0.1, 0.6, 2.0, 50.0, f64::NAN] {
            let corrected = correct_step_length(raw, MotionState::Walking, &config);
            assert!(range.contains(corrected), "{} -> {}", raw, corrected);
        }
    }

    #[test]
    fn test_running_clamped_into_range() {
        let config = PdrConfig::default();
        let range = config.step_length_run_range;
        for raw in [-1.0, 0.3, 1.2, 4.0] {
            let corrected = correct_step_length(raw, MotionState::Running, &config);
            assert!(range.contains(corrected), "{} -> {}", raw, corrected);
        }
    }

    #[test]
    fn test_stairs_passes_through_unclamped() {
        let config = PdrConfig::default();
        assert_eq!(correct_step_length(3.5, MotionState::Stairs, &config), 3.5);
        assert_eq!(correct_step_length(0.01, MotionState::Stairs, &config), 0.01);
    }
}
