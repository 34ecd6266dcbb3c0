/// Reference ellipsoid for geodetic/geocentric conversions.
///
/// All lengths are kilometers. `re` is the geomagnetic reference radius used
/// in the (re/r)^(n+2) terms of the harmonic series, not a derived mean of
/// `a` and `b`.
#[derive(Debug, Clone, Copy)]
pub struct Ellipsoid {
    /// Semi-major axis (km)
    pub a: f64,
    /// Semi-minor axis (km)
    pub b: f64,
    /// Flattening
    pub flattening: f64,
    /// First eccentricity
    pub eps: f64,
    /// First eccentricity squared
    pub epssq: f64,
    /// Mean (geomagnetic reference) radius (km)
    pub re: f64,
}

impl Ellipsoid {
    /// WGS-84 parameters, the ellipsoid the WMM coefficient files assume.
    pub fn wgs84() -> Self {
        let a: f64 = 6378.137;
        let b: f64 = 6356.7523142;
        let eps = (1.0 - (b * b) / (a * a)).sqrt();
        Self {
            a,
            b,
            flattening: 1.0 / 298.257223563,
            eps,
            epssq: eps * eps,
            re: 6371.2,
        }
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::wgs84()
    }
}
