//! Spherical-harmonic series accumulation.
//!
//! Sums the Gauss-coefficient series into a (north, east, down) field vector
//! in the geocentric spherical frame, for both the main field and its
//! secular variation. The two series are the same machine run over different
//! coefficient arrays and degree limits, so one accumulator serves both.

use nalgebra::Vector3;

use crate::coords::SphericalCoordinate;
use crate::ellipsoid::Ellipsoid;
use crate::legendre::LegendreTable;
use crate::model::{coeff_index, MagneticModel};

/// Below this |cos(geocentric latitude)| the east component switches to the
/// dedicated polar recurrence instead of dividing by the cosine.
const POLE_COS_EPS: f64 = 1.0e-10;

/// Per-point precomputed series terms: (re/r)^(n+2) radius ratios and
/// cos/sin of m*longitude. Scratch owned by a single evaluation.
pub struct SphericalHarmonicVariables {
    /// relative_radius_power[n] = (re/r)^(n+2)
    relative_radius_power: Vec<f64>,
    cos_mlambda: Vec<f64>,
    sin_mlambda: Vec<f64>,
}

impl SphericalHarmonicVariables {
    pub fn new(ellip: Ellipsoid, sph: SphericalCoordinate, n_max: usize) -> Self {
        let ratio = ellip.re / sph.r;
        let mut relative_radius_power = vec![0.0; n_max + 1];
        relative_radius_power[0] = ratio * ratio;
        for n in 1..=n_max {
            relative_radius_power[n] = relative_radius_power[n - 1] * ratio;
        }

        // cos/sin of m*lambda by the angle-addition recurrence; one trig
        // pair total instead of one per order.
        let cos_lambda = sph.lambda.to_radians().cos();
        let sin_lambda = sph.lambda.to_radians().sin();
        let mut cos_mlambda = vec![0.0; n_max + 1];
        let mut sin_mlambda = vec![0.0; n_max + 1];
        cos_mlambda[0] = 1.0;
        sin_mlambda[0] = 0.0;
        if n_max >= 1 {
            cos_mlambda[1] = cos_lambda;
            sin_mlambda[1] = sin_lambda;
        }
        for m in 2..=n_max {
            cos_mlambda[m] = cos_mlambda[m - 1] * cos_lambda - sin_mlambda[m - 1] * sin_lambda;
            sin_mlambda[m] = cos_mlambda[m - 1] * sin_lambda + sin_mlambda[m - 1] * cos_lambda;
        }

        Self {
            relative_radius_power,
            cos_mlambda,
            sin_mlambda,
        }
    }
}

/// Sums the main-field series up to the model's maximum degree.
pub fn summation(
    legendre: &LegendreTable,
    model: &MagneticModel,
    vars: &SphericalHarmonicVariables,
    sph: SphericalCoordinate,
) -> Vector3<f64> {
    sum_series(
        legendre,
        vars,
        sph,
        model.main_g_flat(),
        model.main_h_flat(),
        model.n_max,
    )
}

/// Sums the secular-variation series up to the secular degree limit,
/// yielding the yearly rate of change of the spherical-frame field vector.
pub fn secular_summation(
    legendre: &LegendreTable,
    model: &MagneticModel,
    vars: &SphericalHarmonicVariables,
    sph: SphericalCoordinate,
) -> Vector3<f64> {
    sum_series(
        legendre,
        vars,
        sph,
        model.secular_g_flat(),
        model.secular_h_flat(),
        model.n_max_sec_var,
    )
}

/// The shared accumulator. Equations 10-12 of the WMM technical report:
///
/// ```text
/// Bz = -sum (re/r)^(n+2) (n+1) [g cos(m l) + h sin(m l)]  P(sin phig)
/// By =  sum (re/r)^(n+2)  (m)  [g sin(m l) - h cos(m l)]  P(sin phig) / cos(phig)
/// Bx = -sum (re/r)^(n+2)       [g cos(m l) + h sin(m l)] dP(sin phig)
/// ```
///
/// Only By carries the 1/cos division; Bx and Bz already absorb their radius
/// and derivative factors through dP and the (n+1) weight. This asymmetry is
/// the coefficient convention of the distributed WMM files, not a general
/// spherical-harmonic identity, and must stay exactly as written. At the
/// geographic poles the division degenerates and By is rebuilt by the polar
/// branch instead.
fn sum_series(
    legendre: &LegendreTable,
    vars: &SphericalHarmonicVariables,
    sph: SphericalCoordinate,
    g: &[f64],
    h: &[f64],
    n_max: usize,
) -> Vector3<f64> {
    let mut bx = 0.0;
    let mut by = 0.0;
    let mut bz = 0.0;

    for n in 1..=n_max {
        for m in 0..=n {
            let index = coeff_index(n, m);
            let rrp = vars.relative_radius_power[n];
            let g_term = g[index] * vars.cos_mlambda[m] + h[index] * vars.sin_mlambda[m];
            let h_term = g[index] * vars.sin_mlambda[m] - h[index] * vars.cos_mlambda[m];

            bz -= rrp * g_term * (n + 1) as f64 * legendre.p(n, m);
            by += rrp * h_term * m as f64 * legendre.p(n, m);
            bx -= rrp * g_term * legendre.dp(n, m);
        }
    }

    let cos_phig = sph.phig.to_radians().cos();
    if cos_phig.abs() > POLE_COS_EPS {
        by /= cos_phig;
    } else {
        by = polar_east_component(vars, sph, g, h, n_max);
    }

    Vector3::new(bx, by, bz)
}

/// East component at the geographic poles, where the m/cos(phig) weighting
/// becomes 0/0. Only the m = 1 column survives there; its P/cos ratio obeys
/// a clean degree recurrence (section 1.4 of the WMM technical report),
/// accumulated alongside the per-degree Schmidt factors.
fn polar_east_component(
    vars: &SphericalHarmonicVariables,
    sph: SphericalCoordinate,
    g: &[f64],
    h: &[f64],
    n_max: usize,
) -> f64 {
    let sin_phi = sph.phig.to_radians().sin();
    let mut pcup_s = vec![0.0; n_max + 1];
    pcup_s[0] = 1.0;

    let mut schmidt_m0 = 1.0;
    let mut by = 0.0;

    for n in 1..=n_max {
        let index = coeff_index(n, 1);
        let schmidt_next = schmidt_m0 * (2 * n - 1) as f64 / n as f64;
        let schmidt_m1 = schmidt_next * ((n * 2) as f64 / (n + 1) as f64).sqrt();
        schmidt_m0 = schmidt_next;

        if n == 1 {
            pcup_s[n] = pcup_s[n - 1];
        } else {
            let k = (((n - 1) * (n - 1)) as f64 - 1.0)
                / ((2 * n - 1) as f64 * (2 * n - 3) as f64);
            pcup_s[n] = sin_phi * pcup_s[n - 1] - k * pcup_s[n - 2];
        }

        by += vars.relative_radius_power[n]
            * (g[index] * vars.sin_mlambda[1] - h[index] * vars.cos_mlambda[1])
            * pcup_s[n]
            * schmidt_m1;
    }
    by
}
