use crate::coords::{geodetic_to_spherical, rotate_to_geodetic, GeodeticCoordinate};
use crate::elements::{grid_variation, wmm_uncertainty, GeoMagneticElements, Uncertainty};
use crate::ellipsoid::Ellipsoid;
use crate::error::{MagError, Result};
use crate::harmonics::{secular_summation, summation, SphericalHarmonicVariables};
use crate::legendre::LegendreTable;
use crate::model::MagneticModel;

/// Altitude band (km above the ellipsoid) the WMM error budget is stated
/// for.
const MIN_HEIGHT_KM: f64 = -1.0;
const MAX_HEIGHT_KM: f64 = 1900.0;

/// Elements plus their uncertainty for one evaluated point.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub elements: GeoMagneticElements,
    pub uncertainty: Uncertainty,
}

/// The narrow declination-only result most callers (compass correction)
/// need.
#[derive(Debug, Clone, Copy)]
pub struct Declination {
    pub declination_deg: f64,
    pub rate_deg_per_year: f64,
    pub uncertainty_deg: f64,
}

/// Evaluates a loaded magnetic model at arbitrary points and epochs.
///
/// Holds the immutable model and ellipsoid; every call owns its own scratch
/// (Legendre table, harmonic variables), so one evaluator can serve any
/// number of threads behind a shared reference.
pub struct ModelEvaluator {
    model: MagneticModel,
    ellipsoid: Ellipsoid,
}

impl ModelEvaluator {
    pub fn new(model: MagneticModel) -> Self {
        Self {
            model,
            ellipsoid: Ellipsoid::wgs84(),
        }
    }

    pub fn with_ellipsoid(model: MagneticModel, ellipsoid: Ellipsoid) -> Self {
        Self { model, ellipsoid }
    }

    pub fn model(&self) -> &MagneticModel {
        &self.model
    }

    /// Computes the full element set at a geodetic point (height above the
    /// ellipsoid) and decimal year.
    ///
    /// Validates the inputs before touching the series: a year outside the
    /// model window or a coordinate outside its physical range is an error
    /// and produces no partial output.
    pub fn evaluate(&self, point: GeodeticCoordinate, decimal_year: f64) -> Result<Evaluation> {
        self.validate(point, decimal_year)?;

        let timed = self.model.adjusted_to(decimal_year);
        let sph = geodetic_to_spherical(self.ellipsoid, point);

        let vars = SphericalHarmonicVariables::new(self.ellipsoid, sph, timed.n_max);
        let legendre = LegendreTable::compute(sph.phig.to_radians().sin(), timed.n_max)?;

        let b_sph = summation(&legendre, &timed, &vars, sph);
        let b_sph_dot = secular_summation(&legendre, &timed, &vars, sph);

        let b_geo = rotate_to_geodetic(sph, point, b_sph);
        let b_geo_dot = rotate_to_geodetic(sph, point, b_sph_dot);

        let mut elements =
            GeoMagneticElements::from_field_vector(b_geo).with_secular_rates(b_geo_dot);
        grid_variation(point, &mut elements);

        Ok(Evaluation {
            uncertainty: wmm_uncertainty(elements.h),
            elements,
        })
    }

    /// Like [`evaluate`](Self::evaluate), but for a point whose height is
    /// above the geoid (mean sea level). `geoid_height_km` supplies the
    /// geoid undulation above the ellipsoid at (latitude, longitude); geoid
    /// models themselves live outside this crate.
    pub fn evaluate_above_geoid<F>(
        &self,
        point: GeodeticCoordinate,
        decimal_year: f64,
        geoid_height_km: F,
    ) -> Result<Evaluation>
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut adjusted = point;
        adjusted.height_km += geoid_height_km(point.latitude, point.longitude);
        self.evaluate(adjusted, decimal_year)
    }

    /// Declination, its yearly rate, and its uncertainty at a point/epoch.
    pub fn evaluate_declination(
        &self,
        point: GeodeticCoordinate,
        decimal_year: f64,
    ) -> Result<Declination> {
        let evaluation = self.evaluate(point, decimal_year)?;
        Ok(Declination {
            declination_deg: evaluation.elements.decl,
            rate_deg_per_year: evaluation.elements.decl_dot,
            uncertainty_deg: evaluation.uncertainty.decl,
        })
    }

    fn validate(&self, point: GeodeticCoordinate, decimal_year: f64) -> Result<()> {
        if !(-90.0..=90.0).contains(&point.latitude) {
            return Err(MagError::LatitudeOutOfRange(point.latitude));
        }
        if !(-180.0..=360.0).contains(&point.longitude) {
            return Err(MagError::LongitudeOutOfRange(point.longitude));
        }
        if !(MIN_HEIGHT_KM..=MAX_HEIGHT_KM).contains(&point.height_km) {
            return Err(MagError::HeightOutOfRange(point.height_km));
        }
        if decimal_year < self.model.min_year || decimal_year > self.model.end_year {
            return Err(MagError::YearOutOfRange {
                year: decimal_year,
                min: self.model.min_year,
                max: self.model.end_year,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    fn dipole_evaluator() -> ModelEvaluator {
        ModelEvaluator::new(MagneticModel::from_coefficients(
            "DIPOLE",
            2020.0,
            1,
            1,
            vec![0.0, -29404.5, -1450.7],
            vec![0.0, 0.0, 4652.9],
            vec![0.0; 3],
            vec![0.0; 3],
        ))
    }

    #[test]
    fn dipole_declination_at_the_origin() {
        let result = dipole_evaluator()
            .evaluate_declination(GeodeticCoordinate::new(0.0, 0.0, 0.0), 2020.0)
            .unwrap();

        // At the equator the geodetic and spherical frames coincide, so
        // Decl = atan2(-h11, -g10) exactly.
        let expected = (-4652.9f64).atan2(29404.5).to_degrees();
        assert_float_eq!(result.declination_deg, expected, abs <= 0.01);
        assert_float_eq!(result.rate_deg_per_year, 0.0, abs <= 1e-9);
    }

    #[test]
    fn out_of_range_year_is_an_input_error() {
        let err = dipole_evaluator()
            .evaluate(GeodeticCoordinate::new(0.0, 0.0, 0.0), 1900.0)
            .unwrap_err();
        assert!(matches!(err, MagError::YearOutOfRange { .. }));
    }

    #[test]
    fn physical_range_checks() {
        let evaluator = dipole_evaluator();
        assert!(matches!(
            evaluator.evaluate(GeodeticCoordinate::new(91.0, 0.0, 0.0), 2020.0),
            Err(MagError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            evaluator.evaluate(GeodeticCoordinate::new(0.0, 400.0, 0.0), 2020.0),
            Err(MagError::LongitudeOutOfRange(_))
        ));
        assert!(matches!(
            evaluator.evaluate(GeodeticCoordinate::new(0.0, 0.0, 2500.0), 2020.0),
            Err(MagError::HeightOutOfRange(_))
        ));
    }

    #[test]
    fn exact_pole_evaluates_finitely() {
        let evaluation = dipole_evaluator()
            .evaluate(GeodeticCoordinate::new(90.0, 0.0, 0.0), 2020.0)
            .unwrap();
        assert!(evaluation.elements.decl.is_finite());
        assert!(evaluation.elements.f > 0.0);
    }

    #[test]
    fn geoid_height_adjustment_shifts_the_ellipsoid_height() {
        let evaluator = dipole_evaluator();
        let msl = evaluator
            .evaluate_above_geoid(GeodeticCoordinate::new(10.0, 20.0, 0.0), 2020.0, |_, _| 0.05)
            .unwrap();
        let ellipsoidal = evaluator
            .evaluate(GeodeticCoordinate::new(10.0, 20.0, 0.05), 2020.0)
            .unwrap();
        assert_float_eq!(msl.elements.f, ellipsoidal.elements.f, abs <= 1e-12);
    }
}
