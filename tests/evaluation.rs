use float_eq::assert_float_eq;

use magdec::{GeodeticCoordinate, MagError, MagneticModel, ModelEvaluator};

/// Degree-1 WMM2020 leading terms; small enough to carry inline, big enough
/// to exercise the whole pipeline including the coefficient parser.
const DIPOLE_COF: &str = "\
  2020.0            WMM-2020        12/10/2019
  1  0  -29404.5       0.0        6.7        0.0
  1  1   -1450.7    4652.9        7.7      -25.1
999999999999999999999999999999999999999999999999
";

fn dipole_evaluator() -> ModelEvaluator {
    ModelEvaluator::new(MagneticModel::parse(DIPOLE_COF).unwrap())
}

#[test]
fn dipole_declination_matches_the_reference() {
    // At (0, 0, 0 km) and the model epoch the rotation between spherical
    // and geodetic frames vanishes, so the declination of the degree-1
    // field is atan2(-h11, -g10): -8.99 degrees for the WMM2020 leading
    // terms.
    let result = dipole_evaluator()
        .evaluate_declination(GeodeticCoordinate::new(0.0, 0.0, 0.0), 2020.0)
        .unwrap();

    let reference = (-4652.9f64).atan2(29404.5).to_degrees();
    assert_float_eq!(result.declination_deg, reference, abs <= 0.01);
    assert!(result.declination_deg < -8.9 && result.declination_deg > -9.1);
}

#[test]
fn elements_are_internally_consistent() {
    let evaluation = dipole_evaluator()
        .evaluate(GeodeticCoordinate::new(35.0, -120.0, 0.1), 2022.5)
        .unwrap();
    let e = evaluation.elements;

    assert_float_eq!(e.h, (e.x * e.x + e.y * e.y).sqrt(), rmax <= 1e-12);
    assert_float_eq!(e.f, (e.h * e.h + e.z * e.z).sqrt(), rmax <= 1e-12);
    assert_float_eq!(e.decl, e.y.atan2(e.x).to_degrees(), abs <= 1e-12);
    assert_float_eq!(e.incl, e.z.atan2(e.h).to_degrees(), abs <= 1e-12);
}

#[test]
fn secular_variation_moves_the_declination() {
    // The degree-1 rates are nonzero, so the 2024.5 declination must differ
    // from the 2020.0 one, in the direction the rate predicts.
    let evaluator = dipole_evaluator();
    let point = GeodeticCoordinate::new(0.0, 0.0, 0.0);

    let at_epoch = evaluator.evaluate(point, 2020.0).unwrap().elements;
    let later = evaluator.evaluate(point, 2024.5).unwrap().elements;

    let predicted = at_epoch.decl + 4.5 * at_epoch.decl_dot;
    assert_float_eq!(later.decl, predicted, abs <= 0.05);
}

#[test]
fn out_of_range_year_produces_no_elements() {
    // A model valid 2019.9..2025.0 must reject 1900 outright.
    let err = dipole_evaluator()
        .evaluate(GeodeticCoordinate::new(0.0, 0.0, 0.0), 1900.0)
        .unwrap_err();
    assert!(matches!(err, MagError::YearOutOfRange { .. }));
}

#[test]
fn poles_use_the_special_summation_and_stay_finite() {
    let evaluator = dipole_evaluator();
    for lat in [90.0, -90.0] {
        let e = evaluator
            .evaluate(GeodeticCoordinate::new(lat, 0.0, 0.0), 2020.0)
            .unwrap()
            .elements;
        assert!(e.x.is_finite() && e.y.is_finite() && e.z.is_finite());
        assert!(e.decl.is_finite());
        assert!(e.f > 20000.0, "field at the pole should be tens of uT");
    }
}

#[test]
fn declination_uncertainty_never_exceeds_180_degrees() {
    let evaluation = dipole_evaluator()
        .evaluate(GeodeticCoordinate::new(40.0, 10.0, 0.0), 2021.0)
        .unwrap();
    assert!(evaluation.uncertainty.decl <= 180.0);
    assert!(evaluation.uncertainty.decl > 0.0);
}

#[test]
fn high_degree_model_evaluates_through_the_rescaled_legendre_path() {
    // A synthetic degree-20 model with only the dipole terms populated must
    // agree with the degree-1 model: the extra zero coefficients contribute
    // nothing, but force the high-degree Legendre recurrence.
    let n_max = 20;
    let terms = (n_max + 1) * (n_max + 2) / 2;
    let mut g = vec![0.0; terms];
    let mut h = vec![0.0; terms];
    g[1] = -29404.5;
    g[2] = -1450.7;
    h[2] = 4652.9;
    let padded = ModelEvaluator::new(MagneticModel::from_coefficients(
        "PADDED",
        2020.0,
        n_max,
        n_max,
        g,
        h,
        vec![0.0; terms],
        vec![0.0; terms],
    ));

    let point = GeodeticCoordinate::new(51.5, -0.1, 0.0);
    let wide = padded.evaluate(point, 2020.0).unwrap().elements;
    let narrow = dipole_evaluator().evaluate(point, 2020.0).unwrap().elements;

    assert_float_eq!(wide.decl, narrow.decl, abs <= 1e-8);
    assert_float_eq!(wide.incl, narrow.incl, abs <= 1e-8);
    assert_float_eq!(wide.f, narrow.f, rmax <= 1e-10);
}
