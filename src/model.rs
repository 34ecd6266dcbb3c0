use std::fs;
use std::path::Path;

use crate::dates;
use crate::error::{MagError, Result};

/// Number of (n, m) terms for a model of maximum degree `n_max`.
pub const fn num_terms(n_max: usize) -> usize {
    (n_max + 1) * (n_max + 2) / 2
}

/// Flat index of degree n, order m in the dense triangular layout used by
/// the coefficient files. Valid only for m <= n.
pub(crate) const fn coeff_index(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m
}

/// Years a WMM coefficient set stays valid past its epoch.
const MODEL_LIFETIME_YEARS: f64 = 5.0;

/// Spherical-harmonic magnetic model: Gauss coefficients of the main field
/// plus their secular-variation rates, in the triangular layout behind typed
/// accessors.
///
/// Loaded once and then shared read-only; a time-adjusted copy is derived
/// per evaluation with [`MagneticModel::adjusted_to`].
#[derive(Debug, Clone)]
pub struct MagneticModel {
    pub name: String,
    /// Base decimal year the main-field coefficients are exact at
    pub epoch: f64,
    /// Start of the validity window (edition date, or the epoch)
    pub min_year: f64,
    /// End of the validity window
    pub end_year: f64,
    pub n_max: usize,
    pub n_max_sec_var: usize,
    main_g: Vec<f64>,
    main_h: Vec<f64>,
    secular_g: Vec<f64>,
    secular_h: Vec<f64>,
}

impl MagneticModel {
    /// Builds a model from pre-indexed coefficient arrays, each of length
    /// `num_terms(n_max)`.
    pub fn from_coefficients(
        name: impl Into<String>,
        epoch: f64,
        n_max: usize,
        n_max_sec_var: usize,
        main_g: Vec<f64>,
        main_h: Vec<f64>,
        secular_g: Vec<f64>,
        secular_h: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(main_g.len(), num_terms(n_max));
        debug_assert!(n_max_sec_var <= n_max);
        Self {
            name: name.into(),
            epoch,
            min_year: epoch,
            end_year: epoch + MODEL_LIFETIME_YEARS,
            n_max,
            n_max_sec_var,
            main_g,
            main_h,
            secular_g,
            secular_h,
        }
    }

    /// Reads a WMM `.COF` coefficient file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Parses WMM `.COF` coefficient text: a header line
    /// `epoch model-name edition-date`, then `n m gnm hnm dgnm dhnm` rows,
    /// terminated by a line starting with `9999`.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut lines = contents.lines();

        let header = lines
            .next()
            .ok_or_else(|| MagError::BadCoefficientFile("empty file".into()))?;
        let mut fields = header.split_whitespace();
        let epoch: f64 = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| MagError::BadCoefficientFile("bad epoch in header".into()))?;
        let name = fields.next().unwrap_or("WMM").to_string();
        let edition_date = fields.next().unwrap_or("");

        // Rows may arrive in any order, so size the arrays after scanning.
        let mut rows: Vec<(usize, usize, f64, f64, f64, f64)> = Vec::new();
        let mut n_max = 0;
        for line in lines {
            if line.starts_with("9999") {
                break;
            }
            let mut fields = line.split_whitespace();
            let mut next_usize = || fields.next().and_then(|s| s.parse::<usize>().ok());
            let (n, m) = match (next_usize(), next_usize()) {
                (Some(n), Some(m)) => (n, m),
                _ => {
                    return Err(MagError::BadCoefficientFile(format!(
                        "bad coefficient row: {line:?}"
                    )))
                }
            };
            let mut next_f64 = || {
                fields
                    .next()
                    .and_then(|s| s.parse::<f64>().ok())
                    .ok_or_else(|| {
                        MagError::BadCoefficientFile(format!("bad coefficient row: {line:?}"))
                    })
            };
            let (gnm, hnm, dgnm, dhnm) = (next_f64()?, next_f64()?, next_f64()?, next_f64()?);
            if m <= n {
                n_max = n_max.max(n);
                rows.push((n, m, gnm, hnm, dgnm, dhnm));
            }
        }
        if n_max == 0 {
            return Err(MagError::BadCoefficientFile("no coefficient rows".into()));
        }

        let terms = num_terms(n_max);
        let mut model = Self::from_coefficients(
            name,
            epoch,
            n_max,
            n_max, // WMM files carry secular variation for every degree
            vec![0.0; terms],
            vec![0.0; terms],
            vec![0.0; terms],
            vec![0.0; terms],
        );
        for (n, m, gnm, hnm, dgnm, dhnm) in rows {
            let index = coeff_index(n, m);
            model.main_g[index] = gnm;
            model.main_h[index] = hnm;
            model.secular_g[index] = dgnm;
            model.secular_h[index] = dhnm;
        }

        // The validity window opens at the edition date when the header
        // carries a parseable one, otherwise at the epoch.
        model.min_year = dates::edition_date_to_decimal_year(edition_date).unwrap_or(epoch);
        Ok(model)
    }

    /// Main-field G coefficient (nT) at degree n, order m.
    #[inline]
    pub fn g(&self, n: usize, m: usize) -> f64 {
        debug_assert!(m <= n && n <= self.n_max);
        self.main_g[coeff_index(n, m)]
    }

    /// Main-field H coefficient (nT) at degree n, order m.
    #[inline]
    pub fn h(&self, n: usize, m: usize) -> f64 {
        debug_assert!(m <= n && n <= self.n_max);
        self.main_h[coeff_index(n, m)]
    }

    /// Secular-variation rate of G (nT/yr) at degree n, order m.
    #[inline]
    pub fn g_dot(&self, n: usize, m: usize) -> f64 {
        debug_assert!(m <= n && n <= self.n_max);
        self.secular_g[coeff_index(n, m)]
    }

    /// Secular-variation rate of H (nT/yr) at degree n, order m.
    #[inline]
    pub fn h_dot(&self, n: usize, m: usize) -> f64 {
        debug_assert!(m <= n && n <= self.n_max);
        self.secular_h[coeff_index(n, m)]
    }

    pub(crate) fn main_g_flat(&self) -> &[f64] {
        &self.main_g
    }

    pub(crate) fn main_h_flat(&self) -> &[f64] {
        &self.main_h
    }

    pub(crate) fn secular_g_flat(&self) -> &[f64] {
        &self.secular_g
    }

    pub(crate) fn secular_h_flat(&self) -> &[f64] {
        &self.secular_h
    }

    /// Linearly advances the main-field coefficients from the model epoch to
    /// `decimal_year` using the secular-variation rates. Terms beyond the
    /// secular-variation degree range have no rate and are copied unchanged.
    ///
    /// Infallible by design: the evaluator validates the year against the
    /// model window before building the timed copy, so extrapolation never
    /// happens silently through the public pipeline.
    pub fn adjusted_to(&self, decimal_year: f64) -> MagneticModel {
        let dt = decimal_year - self.epoch;
        let sv_end = coeff_index(self.n_max_sec_var, self.n_max_sec_var);

        let mut timed = self.clone();
        for index in 0..=sv_end {
            timed.main_g[index] = self.main_g[index] + dt * self.secular_g[index];
            timed.main_h[index] = self.main_h[index] + dt * self.secular_h[index];
        }
        timed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;

    const SAMPLE_COF: &str = "\
  2020.0            WMM-2020        12/10/2019
  1  0  -29404.5       0.0        6.7        0.0
  1  1   -1450.7    4652.9        7.7      -25.1
  2  0   -2500.0       0.0      -11.5        0.0
  2  1    2982.0   -2991.6       -7.1      -30.2
  2  2    1676.8    -734.8       -2.2      -23.9
999999999999999999999999999999999999999999999999
";

    fn sample_model() -> MagneticModel {
        MagneticModel::parse(SAMPLE_COF).unwrap()
    }

    #[test]
    fn parses_header_and_rows() {
        let model = sample_model();
        assert_eq!(model.name, "WMM-2020");
        assert_float_eq!(model.epoch, 2020.0, abs <= 0.0);
        assert_eq!(model.n_max, 2);
        assert_float_eq!(model.g(1, 0), -29404.5, abs <= 0.0);
        assert_float_eq!(model.h(1, 1), 4652.9, abs <= 0.0);
        assert_float_eq!(model.g_dot(1, 1), 7.7, abs <= 0.0);
        assert_float_eq!(model.h_dot(2, 2), -23.9, abs <= 0.0);
        // edition date 12/10/2019 opens the window before the epoch
        assert!(model.min_year < model.epoch);
        assert_float_eq!(model.end_year, 2025.0, abs <= 0.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(MagneticModel::parse("").is_err());
        assert!(MagneticModel::parse("2020.0 WMM 12/10/2019\nnot a row\n9999").is_err());
    }

    #[test]
    fn adjustment_at_the_epoch_is_identity() {
        let model = sample_model();
        let timed = model.adjusted_to(model.epoch);
        for n in 1..=model.n_max {
            for m in 0..=n {
                assert_float_eq!(timed.g(n, m), model.g(n, m), abs <= 0.0);
                assert_float_eq!(timed.h(n, m), model.h(n, m), abs <= 0.0);
            }
        }
    }

    #[test]
    fn adjustment_is_linear_in_elapsed_time() {
        let model = sample_model();
        let timed = model.adjusted_to(model.epoch + 2.5);
        assert_float_eq!(timed.g(1, 0), -29404.5 + 2.5 * 6.7, abs <= 1e-12);
        assert_float_eq!(timed.h(1, 1), 4652.9 + 2.5 * -25.1, abs <= 1e-12);
        // rates themselves are preserved for the secular summation
        assert_float_eq!(timed.g_dot(1, 0), 6.7, abs <= 0.0);
    }

    #[test]
    fn triangular_index_layout() {
        assert_eq!(coeff_index(1, 0), 1);
        assert_eq!(coeff_index(1, 1), 2);
        assert_eq!(coeff_index(2, 0), 3);
        assert_eq!(coeff_index(12, 12), num_terms(12) - 1);
    }
}
