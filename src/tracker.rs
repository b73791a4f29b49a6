use serde::{Deserialize, Serialize};

use crate::config::PdrConfig;
use crate::error::PdrResult;
use crate::heading::{angle_delta, compute_heading, correct_heading};
use crate::motion::classify_motion;
use crate::sensors::SensorSample;
use crate::session::SessionState;
use crate::snapshot::Snapshot;
use crate::step_detection::StepDetector;
use crate::step_length::{correct_step_length, estimate_step_length, step_frequency};
use crate::types::{DeviceContext, MotionState, Position, TrackingPhase};

/// What happened on a sample that produced a step
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepUpdate {
    pub timestamp: f64,
    pub step_count: u64,
    /// Seconds since the previous step (or since 0 for the first one)
    pub interval: f64,
    pub frequency: f64,
    pub motion_state: MotionState,
    /// Corrected step length in meters
    pub step_length: f64,
    /// Step length after grid scaling, as fed to the particle filter
    pub displacement: f64,
    pub heading: f64,
    pub position: Position,
    pub effective_sample_size: f64,
    pub resampled: bool,
}

/// Drives one session: start-position selection, then per-sample updates.
pub struct PdrTracker {
    config: PdrConfig,
    detector: StepDetector,
    state: SessionState,
    phase: TrackingPhase,
}

impl PdrTracker {
    pub fn new(config: PdrConfig) -> PdrResult<Self> {
        config.validate()?;
        let state = SessionState::new(&config);
        let detector = StepDetector::from_config(&config);
        Ok(PdrTracker {
            config,
            detector,
            state,
            phase: TrackingPhase::SelectingStart,
        })
    }

    pub fn config(&self) -> &PdrConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> TrackingPhase {
        self.phase
    }

    pub fn position(&self) -> Position {
        self.state.position
    }

    pub fn heading(&self) -> f64 {
        self.state.heading
    }

    /// Reposition the user; particles are reinitialized at the new point
    pub fn set_start_position(&mut self, position: Position) -> PdrResult<()> {
        self.state.set_start_position(position)
    }

    /// Leave start selection and begin tracking
    pub fn confirm_start(&mut self) {
        if self.phase == TrackingPhase::SelectingStart {
            log::info!(
                "tracking from ({:.2}, {:.2})",
                self.state.position.x,
                self.state.position.y
            );
        }
        self.phase = TrackingPhase::Tracking;
    }

    /// Full reset back into start selection
    pub fn restart(&mut self) {
        self.state.reset();
        self.phase = TrackingPhase::SelectingStart;
    }

    pub fn set_device_context(&mut self, context: DeviceContext) {
        self.state.device_context = context;
    }

    pub fn set_heading_bias(&mut self, bias: f64) -> PdrResult<f64> {
        self.state.set_heading_bias(bias, &self.config)
    }

    pub fn capture_snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Run one sensor sample through the update cycle.
    ///
    /// Does nothing while the start position is being selected. Returns
    /// `Some` only when the sample produced a step.
    pub fn process_sample(&mut self, sample: &SensorSample) -> Option<StepUpdate> {
        if self.phase == TrackingPhase::SelectingStart {
            log::trace!("sample at {:.3}s ignored during start selection", sample.timestamp);
            return None;
        }

        self.cache_reading(sample);

        let previous_step = self.state.last_step_time;
        if !self
            .detector
            .detect(&sample.acceleration, sample.timestamp, &mut self.state)
        {
            return None;
        }

        let interval = sample.timestamp - previous_step;
        let frequency = step_frequency(interval);

        let accel_variance = self.state.variance_window.accel_variance();
        let motion = classify_motion(
            accel_variance,
            self.state.variance_window.rotation_variance(),
            &self.config.motion_thresholds,
        );
        self.state.motion_state = motion;

        let raw_length =
            estimate_step_length(frequency, accel_variance, motion, self.state.device_context);
        let step_length = correct_step_length(raw_length, motion, &self.config);
        let displacement = step_length * self.config.grid_scale;

        let heading = if sample.orientation_angle.is_finite() {
            let raw = compute_heading(
                sample.orientation_angle,
                sample.secondary_heading,
                self.config.secondary_heading_weight,
            );
            correct_heading(
                raw,
                self.state.heading_bias(),
                self.config.heading_correction_gain,
            )
        } else {
            log::warn!(
                "non-finite orientation at {:.3}s, keeping heading {:.1}",
                sample.timestamp,
                self.state.heading
            );
            self.state.heading
        };
        self.state.heading = heading;

        let filtered = self
            .state
            .particles
            .update(displacement, heading, &self.config);
        self.state.position.x = filtered.x;
        self.state.position.y = filtered.y;
        self.state.last_accel_mag = sample.acceleration.magnitude();

        log::debug!(
            "step {} at {:.3}s: {} len {:.2} m hdg {:.1} -> ({:.2}, {:.2})",
            self.state.step_count,
            sample.timestamp,
            motion,
            step_length,
            heading,
            filtered.x,
            filtered.y
        );

        Some(StepUpdate {
            timestamp: sample.timestamp,
            step_count: self.state.step_count,
            interval,
            frequency,
            motion_state: motion,
            step_length,
            displacement,
            heading,
            position: self.state.position,
            effective_sample_size: filtered.effective_sample_size,
            resampled: filtered.resampled,
        })
    }

    /// Feed the variance window and remember the raw sample
    fn cache_reading(&mut self, sample: &SensorSample) {
        let window = &mut self.state.variance_window;
        window.push_accel(sample.acceleration.magnitude());

        let rotation = match (&sample.gyroscope, &self.state.last_sample) {
            (Some(gyro), _) => Some(gyro.magnitude()),
            (None, Some(prev))
                if prev.orientation_angle.is_finite() && sample.orientation_angle.is_finite() =>
            {
                let dt = sample.timestamp - prev.timestamp;
                if dt > 0.0 {
                    let delta = angle_delta(prev.orientation_angle, sample.orientation_angle);
                    Some(delta.to_radians().abs() / dt)
                } else {
                    None
                }
            }
            (None, _) => None,
        };
        if let Some(rate) = rotation {
            window.push_rotation(rate);
        }

        self.state.last_sample = Some(sample.clone());
    }
}
