use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Three-axis sensor reading (accelerometer, gyroscope or magnetometer)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Triaxial {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Triaxial {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn magnitude(&self) -> f64 {
        self.as_vector().norm()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One push from the caller's motion-sensor callback
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    /// Monotonic seconds
    pub timestamp: f64,
    /// Acceleration including gravity, m/s²
    pub acceleration: Triaxial,
    /// Device orientation angle in degrees
    pub orientation_angle: f64,
    #[serde(default)]
    pub secondary_heading: Option<f64>,
    #[serde(default)]
    pub gyroscope: Option<Triaxial>,
    #[serde(default)]
    pub magnetometer: Option<Triaxial>,
    #[serde(default)]
    pub pressure_hpa: Option<f64>,
}

impl SensorSample {
    pub fn new(timestamp: f64, acceleration: Triaxial, orientation_angle: f64) -> Self {
        Self {
            timestamp,
            acceleration,
            orientation_angle,
            secondary_heading: None,
            gyroscope: None,
            magnetometer: None,
            pressure_hpa: None,
        }
    }

    pub fn with_secondary_heading(mut self, heading: f64) -> Self {
        self.secondary_heading = Some(heading);
        self
    }

    pub fn with_gyro(mut self, gyro: Triaxial) -> Self {
        self.gyroscope = Some(gyro);
        self
    }

    pub fn with_mag(mut self, mag: Triaxial) -> Self {
        self.magnetometer = Some(mag);
        self
    }

    pub fn with_pressure(mut self, pressure_hpa: f64) -> Self {
        self.pressure_hpa = Some(pressure_hpa);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accel_magnitude() {
        let accel = Triaxial::new(3.0, 4.0, 0.0);
        assert_eq!(accel.magnitude(), 5.0);
    }

    #[test]
    fn test_non_finite_detected() {
        assert!(!Triaxial::new(f64::NAN, 0.0, 9.8).is_finite());
        assert!(Triaxial::new(0.1, 0.2, 9.8).is_finite());
    }

    #[test]
    fn test_optional_fields_default_on_deserialize() {
        let json = r#"{"timestamp": 1.5, "acceleration": {"x": 0.0, "y": 0.0, "z": 9.8}, "orientation_angle": 90.0}"#;
        let sample: SensorSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.timestamp, 1.5);
        assert!(sample.secondary_heading.is_none());
        assert!(sample.gyroscope.is_none());
        assert!(sample.pressure_hpa.is_none());
    }

    #[test]
    fn test_builder() {
        let sample = SensorSample::new(0.0, Triaxial::new(0.0, 0.0, 9.8), 0.0)
            .with_secondary_heading(45.0)
            .with_gyro(Triaxial::new(0.0, 0.0, 0.1))
            .with_mag(Triaxial::new(20.0, 0.0, -40.0))
            .with_pressure(1013.25);
        assert_eq!(sample.secondary_heading, Some(45.0));
        assert_eq!(sample.pressure_hpa, Some(1013.25));
        assert!(sample.magnetometer.is_some());
    }
}
