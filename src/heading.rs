/// Wrap an angle in degrees into `[0, 360)`. Non-finite input maps to 0.
pub fn wrap_degrees(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed smallest difference `to - from` in degrees, within (-180, 180]
pub fn angle_delta(from: f64, to: f64) -> f64 {
    let delta = wrap_degrees(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Compass heading from device orientation, optionally blended with a
/// secondary heading source.
///
/// The blend is a plain weighted sum of the two angles, so sources on
/// opposite sides of north are not averaged circularly.
pub fn compute_heading(orientation: f64, secondary: Option<f64>, secondary_weight: f64) -> f64 {
    let heading = match secondary {
        Some(other) if other.is_finite() => {
            (1.0 - secondary_weight) * orientation + secondary_weight * other
        }
        _ => orientation,
    };
    wrap_degrees(heading)
}

/// Apply the bias correction term and rewrap
pub fn correct_heading(heading: f64, heading_bias: f64, gain: f64) -> f64 {
    wrap_degrees(heading + gain * heading_bias)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_wrap_range() {
        for angle in [
            0.0, 359.999, 360.0, 720.5, -0.5, -360.0, -725.0, 1e9, -1e-17, f64::NAN,
        ] {
            let w = wrap_degrees(angle);
            assert!((0.0..360.0).contains(&w), "{} -> {}", angle, w);
        }
        assert_abs_diff_eq!(wrap_degrees(-90.0), 270.0);
        assert_abs_diff_eq!(wrap_degrees(450.0), 90.0);
    }

    #[test]
    fn test_device_only() {
        assert_abs_diff_eq!(compute_heading(45.0, None, 0.3), 45.0);
        assert_abs_diff_eq!(compute_heading(-45.0, None, 0.3), 315.0);
    }

    #[test]
    fn test_blend_with_secondary() {
        // 0.7 * 100 + 0.3 * 200
        assert_abs_diff_eq!(compute_heading(100.0, Some(200.0), 0.3), 130.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_secondary_ignored() {
        assert_abs_diff_eq!(compute_heading(100.0, Some(f64::NAN), 0.3), 100.0);
    }

    #[test]
    fn test_correct_heading_wraps() {
        assert_abs_diff_eq!(correct_heading(350.0, 20.0, 1.0), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(correct_heading(5.0, -10.0, 1.0), 355.0, epsilon = 1e-9);
        assert_abs_diff_eq!(correct_heading(90.0, 10.0, 0.5), 95.0, epsilon = 1e-9);
        for bias in [-1000.0, -30.0, 0.0, 30.0, 1000.0] {
            let h = correct_heading(359.9, bias, 1.3);
            assert!((0.0..360.0).contains(&h));
        }
    }

    #[test]
    fn test_angle_delta() {
        assert_abs_diff_eq!(angle_delta(350.0, 10.0), 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angle_delta(10.0, 350.0), -20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(angle_delta(0.0, 180.0), 180.0, epsilon = 1e-9);
    }
}
