use nalgebra::Vector3;

use crate::coords::GeodeticCoordinate;

/// Geomagnetic elements derived from the geodetic-frame field vector, plus
/// their yearly rates. Angles in degrees, intensities in nT, rates per year.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoMagneticElements {
    /// North component
    pub x: f64,
    /// East component
    pub y: f64,
    /// Down component
    pub z: f64,
    /// Horizontal intensity
    pub h: f64,
    /// Total intensity
    pub f: f64,
    /// Declination, positive east of true north
    pub decl: f64,
    /// Inclination, positive down
    pub incl: f64,
    /// Grid variation
    pub gv: f64,
    pub x_dot: f64,
    pub y_dot: f64,
    pub z_dot: f64,
    pub h_dot: f64,
    pub f_dot: f64,
    pub decl_dot: f64,
    pub incl_dot: f64,
    pub gv_dot: f64,
}

impl GeoMagneticElements {
    /// Derives the angular and intensity elements from a geodetic-frame
    /// (north, east, down) field vector. Equation 18 of the WMM technical
    /// report. GV starts out equal to the declination; see
    /// [`grid_variation`].
    pub fn from_field_vector(b: Vector3<f64>) -> Self {
        let h = (b.x * b.x + b.y * b.y).sqrt();
        let f = (h * h + b.z * b.z).sqrt();
        Self {
            x: b.x,
            y: b.y,
            z: b.z,
            h,
            f,
            decl: b.y.atan2(b.x).to_degrees(),
            incl: b.z.atan2(h).to_degrees(),
            gv: b.y.atan2(b.x).to_degrees(),
            ..Self::default()
        }
    }

    /// Fills in the yearly rates from the secular-variation field vector
    /// (geodetic frame). Equation 19 of the WMM technical report.
    ///
    /// When H or F is zero (field exactly vertical, or zero) the quotients
    /// are IEEE divisions by zero: the affected rates come out NaN or
    /// infinite and propagate to the caller unchanged. No substitute value
    /// is invented for a physically degenerate input.
    pub fn with_secular_rates(mut self, b_dot: Vector3<f64>) -> Self {
        self.x_dot = b_dot.x;
        self.y_dot = b_dot.y;
        self.z_dot = b_dot.z;
        self.h_dot = (self.x * self.x_dot + self.y * self.y_dot) / self.h;
        self.f_dot =
            (self.x * self.x_dot + self.y * self.y_dot + self.z * self.z_dot) / self.f;
        self.decl_dot = (self.x * self.y_dot - self.y * self.x_dot).to_degrees()
            / (self.h * self.h);
        self.incl_dot = (self.h * self.z_dot - self.z * self.h_dot).to_degrees()
            / (self.f * self.f);
        self.gv_dot = self.decl_dot;
        self
    }
}

/// Latitude beyond which grid variation follows the polar stereographic
/// convention.
const PS_GRID_LATITUDE: f64 = 55.0;

/// Grid variation: the angle between grid north and magnetic north.
///
/// In the polar caps (|lat| >= 55°) grid north follows the polar
/// stereographic projection and the variation is the declination offset by
/// the longitude. Between the caps the reference would be the local UTM
/// meridian convergence; UTM support is out of scope here, so the
/// declination is left unadjusted in that band.
pub fn grid_variation(location: GeodeticCoordinate, elements: &mut GeoMagneticElements) {
    if location.latitude >= PS_GRID_LATITUDE {
        elements.gv = elements.decl - location.longitude;
    } else if location.latitude <= -PS_GRID_LATITUDE {
        elements.gv = elements.decl + location.longitude;
    } else {
        elements.gv = elements.decl;
    }
}

/// One-sigma uncertainty of each element under the model's published error
/// budget. Angles in degrees, intensities in nT.
#[derive(Debug, Clone, Copy)]
pub struct Uncertainty {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub h: f64,
    pub f: f64,
    pub decl: f64,
    pub incl: f64,
}

// WMM2025 error model constants
const UNCERTAINTY_X: f64 = 137.0;
const UNCERTAINTY_Y: f64 = 89.0;
const UNCERTAINTY_Z: f64 = 141.0;
const UNCERTAINTY_H: f64 = 133.0;
const UNCERTAINTY_F: f64 = 138.0;
const UNCERTAINTY_INCL: f64 = 0.20;
const UNCERTAINTY_DECL_OFFSET: f64 = 0.26;
const UNCERTAINTY_DECL_COEF: f64 = 5625.0;

/// Evaluates the fixed WMM error model at horizontal intensity `h`.
///
/// Every element but the declination has a constant uncertainty; the
/// declination error grows as the horizontal field weakens and is capped at
/// 180° (beyond which the angle itself is meaningless).
pub fn wmm_uncertainty(h: f64) -> Uncertainty {
    let decl_variable = UNCERTAINTY_DECL_COEF / h;
    let decl = (UNCERTAINTY_DECL_OFFSET * UNCERTAINTY_DECL_OFFSET
        + decl_variable * decl_variable)
        .sqrt();

    Uncertainty {
        x: UNCERTAINTY_X,
        y: UNCERTAINTY_Y,
        z: UNCERTAINTY_Z,
        h: UNCERTAINTY_H,
        f: UNCERTAINTY_F,
        decl: decl.min(180.0),
        incl: UNCERTAINTY_INCL,
    }
}
