use nalgebra::Vector3;

use crate::ellipsoid::Ellipsoid;

/// Geodetic position: latitude/longitude in degrees, height in kilometers
/// above the reference ellipsoid.
///
/// `Copy` on purpose: every pipeline stage works on its own value, so a
/// conversion can never alias the caller's coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticCoordinate {
    /// Geodetic latitude (degrees, -90..=90)
    pub latitude: f64,
    /// Longitude (degrees, positive east)
    pub longitude: f64,
    /// Height above the ellipsoid (km)
    pub height_km: f64,
}

impl GeodeticCoordinate {
    pub fn new(latitude: f64, longitude: f64, height_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            height_km,
        }
    }
}

/// Geocentric spherical position derived from a geodetic one: longitude,
/// geocentric latitude (degrees) and radius from the ellipsoid center (km).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCoordinate {
    pub lambda: f64,
    pub phig: f64,
    pub r: f64,
}

/// Converts a geodetic position to geocentric spherical coordinates.
///
/// The point first goes through an ECEF-style intermediate (at longitude 0,
/// which is all the radius and geocentric latitude need), then to spherical.
/// Total for every latitude strictly inside the valid domain; r > 0 always
/// holds there.
pub fn geodetic_to_spherical(ellip: Ellipsoid, geo: GeodeticCoordinate) -> SphericalCoordinate {
    let cos_lat = geo.latitude.to_radians().cos();
    let sin_lat = geo.latitude.to_radians().sin();

    // Local radius of curvature on the ellipsoid
    let rc = ellip.a / (1.0 - ellip.epssq * sin_lat * sin_lat).sqrt();

    let xp = (rc + geo.height_km) * cos_lat;
    let zp = (rc * (1.0 - ellip.epssq) + geo.height_km) * sin_lat;

    let r = (xp * xp + zp * zp).sqrt();
    SphericalCoordinate {
        lambda: geo.longitude,
        phig: (zp / r).asin().to_degrees(),
        r,
    }
}

/// Rotates a field vector (north, east, down) from the spherical frame into
/// the geodetic frame. The two frames share the east axis and differ by the
/// angle between geocentric and geodetic latitude.
pub fn rotate_to_geodetic(
    sph: SphericalCoordinate,
    geo: GeodeticCoordinate,
    field: Vector3<f64>,
) -> Vector3<f64> {
    let psi = (sph.phig - geo.latitude).to_radians();

    Vector3::new(
        field.x * psi.cos() - field.z * psi.sin(),
        field.y,
        field.x * psi.sin() + field.z * psi.cos(),
    )
}

/// Spherical position to earth-centered cartesian (km). x points at
/// (0°N, 0°E), y at (0°N, 90°E), z at the north pole.
pub fn spherical_to_cartesian(sph: SphericalCoordinate) -> Vector3<f64> {
    let phi = sph.phig.to_radians();
    let lambda = sph.lambda.to_radians();

    Vector3::new(
        sph.r * phi.cos() * lambda.cos(),
        sph.r * phi.cos() * lambda.sin(),
        sph.r * phi.sin(),
    )
}

/// Earth-centered cartesian back to geodetic coordinates, via the closed-form
/// quartic in t = tan of the parametric latitude half-angle.
pub fn cartesian_to_geodetic(ellip: Ellipsoid, point: Vector3<f64>) -> GeodeticCoordinate {
    let (x, y, z) = (point.x, point.y, point.z);

    // Carry the sign of z on the semi-minor axis so the latitude comes out
    // with the right sign.
    let b = if z < 0.0 { -ellip.b } else { ellip.b };

    let r = (x * x + y * y).sqrt();
    let e = (b * z - (ellip.a * ellip.a - b * b)) / (ellip.a * r);
    let f = (b * z + (ellip.a * ellip.a - b * b)) / (ellip.a * r);

    // Solve t^4 + 2*E*t^3 + 2*F*t - 1 = 0
    let p = (4.0 / 3.0) * (e * f + 1.0);
    let q = 2.0 * (e * e - f * f);
    let d = p * p * p + q * q;

    let mut v = if d >= 0.0 {
        (d.sqrt() - q).cbrt() - (d.sqrt() + q).cbrt()
    } else {
        2.0 * (-p).sqrt() * ((q / (p * (-p).sqrt())).acos() / 3.0).cos()
    };

    // Improve v; matters near the poles
    if v * v < p.abs() {
        v = -(v * v * v + 2.0 * q) / (3.0 * p);
    }
    let g = ((e * e + v).sqrt() + e) / 2.0;
    let t = (g * g + (f - v * g) / (2.0 * g - e)).sqrt() - g;

    let rlat = ((ellip.a * (1.0 - t * t)) / (2.0 * b * t)).atan();

    let mut lambda = y.atan2(x).to_degrees();
    while lambda > 180.0 {
        lambda -= 360.0;
    }

    GeodeticCoordinate {
        latitude: rlat.to_degrees(),
        longitude: lambda,
        height_km: (r - ellip.a * t) * rlat.cos() + (z - b) * rlat.sin(),
    }
}

/// Spherical back to geodetic. Not needed by the field evaluation itself but
/// used for geomagnetic-coordinate work and round-trip checks.
pub fn spherical_to_geodetic(ellip: Ellipsoid, sph: SphericalCoordinate) -> GeodeticCoordinate {
    cartesian_to_geodetic(ellip, spherical_to_cartesian(sph))
}
