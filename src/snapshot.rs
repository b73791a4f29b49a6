use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::PdrResult;
use crate::sensors::Triaxial;
use crate::session::SessionState;
use crate::types::Position;

/// Immutable record of the latest raw readings and the computed position,
/// handed to the recording subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sensor timestamp (monotonic seconds) of the latest sample, 0 if none
    pub timestamp: f64,
    /// Wall-clock capture time, RFC 3339
    pub captured_at: String,
    pub acceleration: Option<Triaxial>,
    pub gyroscope: Option<Triaxial>,
    pub magnetometer: Option<Triaxial>,
    pub pressure_hpa: Option<f64>,
    pub position: Position,
    pub heading: f64,
    pub step_count: u64,
}

impl Snapshot {
    pub fn capture(state: &SessionState) -> Self {
        let sample = state.last_sample.as_ref();
        Snapshot {
            timestamp: sample.map(|s| s.timestamp).unwrap_or(0.0),
            captured_at: Utc::now().to_rfc3339(),
            acceleration: sample.map(|s| s.acceleration),
            gyroscope: sample.and_then(|s| s.gyroscope),
            magnetometer: sample.and_then(|s| s.magnetometer),
            pressure_hpa: sample.and_then(|s| s.pressure_hpa),
            position: state.position,
            heading: state.heading,
            step_count: state.step_count,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> PdrResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to JSON bytes
    pub fn to_json_bytes(&self) -> PdrResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PdrConfig;
    use crate::sensors::SensorSample;

    #[test]
    fn test_capture_without_samples() {
        let config = PdrConfig::default().with_seed(5);
        let state = SessionState::new(&config);
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.timestamp, 0.0);
        assert!(snap.acceleration.is_none());
        assert_eq!(snap.position, Position::origin());
        assert!(chrono::DateTime::parse_from_rfc3339(&snap.captured_at).is_ok());
    }

    #[test]
    fn test_capture_copies_latest_readings() {
        let config = PdrConfig::default().with_seed(5);
        let mut state = SessionState::new(&config);
        state.position = Position::new(1.5, -2.0, 4.0);
        state.step_count = 7;
        state.heading = 270.0;
        state.last_sample = Some(
            SensorSample::new(12.25, Triaxial::new(0.1, 0.2, 9.7), 270.0)
                .with_gyro(Triaxial::new(0.0, 0.0, 0.3))
                .with_mag(Triaxial::new(22.0, -5.0, -41.0))
                .with_pressure(1009.8),
        );

        let snap = Snapshot::capture(&state);
        assert_eq!(snap.timestamp, 12.25);
        assert_eq!(snap.acceleration, Some(Triaxial::new(0.1, 0.2, 9.7)));
        assert_eq!(snap.gyroscope, Some(Triaxial::new(0.0, 0.0, 0.3)));
        assert_eq!(snap.magnetometer, Some(Triaxial::new(22.0, -5.0, -41.0)));
        assert_eq!(snap.pressure_hpa, Some(1009.8));
        assert_eq!(snap.position, Position::new(1.5, -2.0, 4.0));
        assert_eq!(snap.step_count, 7);
    }

    #[test]
    fn test_json_export() {
        let config = PdrConfig::default().with_seed(5);
        let state = SessionState::new(&config);
        let snap = Snapshot::capture(&state);
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"position\""));
        let parsed: Snapshot = serde_json::from_slice(&snap.to_json_bytes().unwrap()).unwrap();
        assert_eq!(parsed, snap);
    }
}
