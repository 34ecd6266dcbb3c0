//! Schmidt quasi-normalized associated Legendre functions.
//!
//! Values and latitude-derivatives are produced for every (n, m) with
//! 0 <= m <= n <= n_max, stored flat in the triangular layout
//! `index(n, m) = n(n+1)/2 + m` shared with the coefficient arrays.
//!
//! Two recurrences are used: a direct one for low degrees (and near the
//! poles), and the Holmes & Featherstone rescaled one for high degrees,
//! where the unscaled sectoral terms would underflow. Both return
//! derivatives with respect to latitude, not colatitude, which flips the
//! sign relative to the usual geomagnetic convention.

use crate::error::{MagError, Result};
use crate::model::{coeff_index, num_terms};

/// Degree at or below which the direct recurrence is numerically safe.
const LOW_DEGREE_MAX: usize = 16;

/// Distance from |sin(lat)| = 1 under which the point counts as polar.
const POLE_EPS: f64 = 1.0e-10;

/// Holmes & Featherstone pre-scaling, undone while accumulating.
const SCALE: f64 = 1.0e-280;

/// Associated Legendre values for one evaluation point.
///
/// Scratch for a single point: recomputed per evaluation, owned by it, and
/// dropped with it.
pub struct LegendreTable {
    pcup: Vec<f64>,
    dpcup: Vec<f64>,
}

impl LegendreTable {
    /// Computes the table at `sin_phi` = sin(geocentric latitude) up to
    /// degree `n_max`.
    ///
    /// Dispatches to the direct recurrence for `n_max` <= 16 or near-polar
    /// points, and to the rescaled recurrence otherwise. The rescaled path
    /// cannot form derivatives at |sin_phi| = 1 exactly, but that region
    /// always routes to the direct path first.
    pub fn compute(sin_phi: f64, n_max: usize) -> Result<Self> {
        if n_max <= LOW_DEGREE_MAX || (1.0 - sin_phi.abs()) < POLE_EPS {
            Ok(Self::pcup_low(sin_phi, n_max))
        } else {
            Self::pcup_high(sin_phi, n_max)
        }
    }

    /// Function value at (n, m).
    #[inline]
    pub fn p(&self, n: usize, m: usize) -> f64 {
        self.pcup[coeff_index(n, m)]
    }

    /// Latitude-derivative at (n, m).
    #[inline]
    pub fn dp(&self, n: usize, m: usize) -> f64 {
        self.dpcup[coeff_index(n, m)]
    }

    /// Direct recurrence: Gauss-normalized values first, then conversion to
    /// Schmidt quasi-normalization. Overflows past degree ~20, hence the
    /// low-degree guard in `compute`.
    fn pcup_low(x: f64, n_max: usize) -> Self {
        let terms = num_terms(n_max) + 1;
        let mut pcup = vec![0.0; terms];
        let mut dpcup = vec![0.0; terms];
        pcup[0] = 1.0;

        // cos(latitude); non-negative since latitude is in -90..=90
        let z = ((1.0 - x) * (1.0 + x)).sqrt();

        for n in 1..=n_max {
            for m in 0..=n {
                let index = coeff_index(n, m);
                if n == m {
                    let index1 = coeff_index(n - 1, m - 1);
                    pcup[index] = z * pcup[index1];
                    dpcup[index] = z * dpcup[index1] + x * pcup[index1];
                } else if n == 1 && m == 0 {
                    let index1 = coeff_index(n - 1, m);
                    pcup[index] = x * pcup[index1];
                    dpcup[index] = x * dpcup[index1] - z * pcup[index1];
                } else if n > 1 {
                    let index1 = coeff_index(n - 2, m);
                    let index2 = coeff_index(n - 1, m);
                    if m > n - 2 {
                        pcup[index] = x * pcup[index2];
                        dpcup[index] = x * dpcup[index2] - z * pcup[index2];
                    } else {
                        let k = (((n - 1) * (n - 1)) as f64 - (m * m) as f64)
                            / ((2 * n - 1) as f64 * (2 * n - 3) as f64);
                        pcup[index] = x * pcup[index2] - k * pcup[index1];
                        dpcup[index] = x * dpcup[index2] - z * pcup[index2] - k * dpcup[index1];
                    }
                }
            }
        }

        // Ratio between the Schmidt quasi-normalized functions and the
        // Gauss-normalized ones, built by recurrence over the same layout.
        let mut schmidt = vec![0.0; terms];
        schmidt[0] = 1.0;
        for n in 1..=n_max {
            let index = coeff_index(n, 0);
            let index1 = coeff_index(n - 1, 0);
            schmidt[index] = schmidt[index1] * (2 * n - 1) as f64 / n as f64;

            for m in 1..=n {
                let index = coeff_index(n, m);
                let index1 = coeff_index(n, m - 1);
                let factor = ((n - m + 1) as f64 * if m == 1 { 2.0 } else { 1.0 }
                    / (n + m) as f64)
                    .sqrt();
                schmidt[index] = schmidt[index1] * factor;
            }
        }

        // Apply the normalization; the derivative sign flips because the
        // callers want d/d(latitude), not d/d(colatitude).
        for n in 1..=n_max {
            for m in 0..=n {
                let index = coeff_index(n, m);
                pcup[index] *= schmidt[index];
                dpcup[index] *= -schmidt[index];
            }
        }

        Self { pcup, dpcup }
    }

    /// Holmes & Featherstone (2002) recurrence: sectoral seeds carry a
    /// 1e-280 scale that is unwound by one factor of cos(latitude) per
    /// order, keeping high-degree, high-latitude terms out of the
    /// underflow range. Produces Schmidt quasi-normalized values directly.
    fn pcup_high(x: f64, n_max: usize) -> Result<Self> {
        let z = ((1.0 - x) * (1.0 + x)).sqrt();
        if z == 0.0 || x.abs() == 1.0 {
            return Err(MagError::PoleDerivative);
        }

        let terms = num_terms(n_max) + 1;
        let mut pcup = vec![0.0; terms];
        let mut dpcup = vec![0.0; terms];

        let mut pre_sqr = vec![0.0; 2 * n_max + 2];
        for (n, slot) in pre_sqr.iter_mut().enumerate() {
            *slot = (n as f64).sqrt();
        }

        // Recurrence coefficients, laid out at the flat (n, m) indexes they
        // are consumed at.
        let mut f1 = vec![0.0; terms];
        let mut f2 = vec![0.0; terms];
        let mut k = 2;
        for n in 2..=n_max {
            k += 1;
            f1[k] = (2 * n - 1) as f64 / n as f64;
            f2[k] = (n - 1) as f64 / n as f64;
            for m in 1..=n - 2 {
                k += 1;
                f1[k] = (2 * n - 1) as f64 / pre_sqr[n + m] / pre_sqr[n - m];
                f2[k] = pre_sqr[n - m - 1] * pre_sqr[n + m - 1] / pre_sqr[n + m] / pre_sqr[n - m];
            }
            k += 2;
        }

        // Zonal terms (m = 0)
        let mut pm2 = 1.0;
        pcup[0] = 1.0;
        let mut pm1 = x;
        pcup[1] = pm1;
        dpcup[1] = z;
        let mut k = 1;
        for n in 2..=n_max {
            k += n;
            let plm = f1[k] * x * pm1 - f2[k] * pm2;
            pcup[k] = plm;
            dpcup[k] = n as f64 * (pm1 - x * plm) / z;
            pm2 = pm1;
            pm1 = plm;
        }

        let mut pmm = pre_sqr[2] * SCALE;
        let mut rescale = 1.0 / SCALE;
        let mut kstart = 0;

        for m in 1..n_max {
            rescale *= z;

            // Sectoral P(m, m)
            kstart += m + 1;
            pmm = pmm * pre_sqr[2 * m + 1] / pre_sqr[2 * m];
            pcup[kstart] = pmm * rescale / pre_sqr[2 * m + 1];
            dpcup[kstart] = -(m as f64 * x * pcup[kstart] / z);
            let mut pm2 = pmm / pre_sqr[2 * m + 1];

            // P(m + 1, m)
            let mut k = kstart + m + 1;
            let mut pm1 = x * pre_sqr[2 * m + 1] * pm2;
            pcup[k] = pm1 * rescale;
            dpcup[k] = ((pm2 * rescale) * pre_sqr[2 * m + 1] - x * (m + 1) as f64 * pcup[k]) / z;

            // Remaining P(n, m)
            for n in m + 2..=n_max {
                k += n;
                let plm = x * f1[k] * pm1 - f2[k] * pm2;
                pcup[k] = plm * rescale;
                dpcup[k] =
                    (pre_sqr[n + m] * pre_sqr[n - m] * (pm1 * rescale) - n as f64 * x * pcup[k])
                        / z;
                pm2 = pm1;
                pm1 = plm;
            }
        }

        // Final sectoral P(n_max, n_max)
        rescale *= z;
        kstart += n_max + 1;
        pmm /= pre_sqr[2 * n_max];
        pcup[kstart] = pmm * rescale;
        dpcup[kstart] = -(n_max as f64) * x * pcup[kstart] / z;

        Ok(Self { pcup, dpcup })
    }
}
