//! Compass-correction helpers: combining a magnetometer bearing with the
//! computed declination to get a true-north heading.

/// Magnetic heading (degrees, positive east) from the horizontal
/// magnetometer components, X toward the sensor's north axis and Y toward
/// its east axis.
pub fn magnetic_heading(mag_x: f64, mag_y: f64) -> f64 {
    mag_y.atan2(mag_x).to_degrees()
}

/// True-north heading from a measured magnetic heading and the local
/// declination: the declination is the angle magnetic north sits east of
/// true north, so it is subtracted out.
pub fn true_heading(measured_heading_deg: f64, declination_deg: f64) -> f64 {
    measured_heading_deg - declination_deg
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    #[test]
    fn heading_from_magnetometer_axes() {
        assert_float_eq!(magnetic_heading(1.0, 0.0), 0.0, abs <= 1e-12);
        assert_float_eq!(magnetic_heading(1.0, 1.0), 45.0, abs <= 1e-12);
        assert_float_eq!(magnetic_heading(0.0, -1.0), -90.0, abs <= 1e-12);
    }

    #[test]
    fn declination_corrects_toward_true_north() {
        // Compass reads 10° with declination 10° east: the needle already
        // points east of true north, so the true heading is 0°.
        assert_float_eq!(true_heading(10.0, 10.0), 0.0, abs <= 1e-12);
        assert_float_eq!(true_heading(0.0, -5.0), 5.0, abs <= 1e-12);
    }
}
