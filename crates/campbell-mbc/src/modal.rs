//! Modal analysis of the averaged fixed-frame state matrix.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector, Schur};
use num_complex::Complex;
use serde::Serialize;

use crate::config::EigenOptions;
use crate::error::{Error, Result};

/// One eigen-pair of the state matrix.
///
/// Only the member of a conjugate pair with positive imaginary part is
/// kept.
#[derive(Debug, Clone, Serialize)]
pub struct Mode {
    pub eigenvalue: Complex<f64>,
    /// |λ| in rad/s.
    pub natural_frequency: f64,
    pub natural_frequency_hz: f64,
    /// Im(λ) in rad/s.
    pub damped_frequency: f64,
    pub damped_frequency_hz: f64,
    /// -Re(λ) / |λ|. Negative for unstable modes.
    pub damping_ratio: f64,
    /// Eigenvector on the reduced rows, rotated so the dominant entry is
    /// real and positive.
    pub eigenvector: Vec<Complex<f64>>,
    pub magnitudes: Vec<f64>,
    pub phases_deg: Vec<f64>,
    /// Magnitudes scaled so the dominant DOF is 1.
    pub shape: Vec<f64>,
}

impl Mode {
    /// Derive mode metrics from an eigenvalue and its reduced eigenvector.
    pub fn from_eigenpair(eigenvalue: Complex<f64>, reduced: &DVector<Complex<f64>>) -> Self {
        let natural_frequency = eigenvalue.norm();
        let damped_frequency = eigenvalue.im;
        let damping_ratio = if natural_frequency > 0.0 {
            -eigenvalue.re / natural_frequency
        } else {
            0.0
        };

        let dominant = reduced
            .iter()
            .map(|z| z.norm())
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1));

        let eigenvector: Vec<Complex<f64>> = match dominant {
            Some((k, max)) if max > 0.0 => {
                let rotation = reduced[k].conj() / max;
                reduced.iter().map(|z| z * rotation).collect()
            }
            _ => reduced.iter().copied().collect(),
        };

        let magnitudes: Vec<f64> = eigenvector.iter().map(|z| z.norm()).collect();
        let phases_deg = eigenvector.iter().map(|z| z.arg().to_degrees()).collect();
        let max = magnitudes.iter().copied().fold(0.0, f64::max);
        let shape = magnitudes
            .iter()
            .map(|m| if max > 0.0 { m / max } else { 0.0 })
            .collect();

        Self {
            eigenvalue,
            natural_frequency,
            natural_frequency_hz: natural_frequency / (2.0 * PI),
            damped_frequency,
            damped_frequency_hz: damped_frequency / (2.0 * PI),
            damping_ratio,
            eigenvector,
            magnitudes,
            phases_deg,
            shape,
        }
    }

    /// Index of the DOF with the largest shape entry.
    pub fn dominant_dof(&self) -> Option<usize> {
        self.shape
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }
}

/// Unit vector spanning the null space of `A - λI`, from the right singular
/// vector of the smallest singular value.
fn null_vector(
    a: &DMatrix<f64>,
    eigenvalue: Complex<f64>,
    options: &EigenOptions,
) -> Result<DVector<Complex<f64>>> {
    let mut shifted = a.map(|x| Complex::new(x, 0.0));
    for i in 0..shifted.nrows() {
        shifted[(i, i)] -= eigenvalue;
    }

    let svd = shifted
        .try_svd(false, true, options.eps, options.max_iterations)
        .ok_or(Error::EigenvectorNotConverged { eigenvalue })?;
    let v_t = svd
        .v_t
        .as_ref()
        .ok_or(Error::EigenvectorNotConverged { eigenvalue })?;

    let (k, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .ok_or(Error::EigenvectorNotConverged { eigenvalue })?;

    Ok(v_t.row(k).adjoint())
}

/// Eigen-analysis of a square state matrix.
///
/// Returns one mode per eigenvalue with strictly positive imaginary part,
/// ordered by natural frequency. Eigenvectors are restricted to
/// `reduced_rows`.
pub fn eigen_analysis(
    a: &DMatrix<f64>,
    reduced_rows: &[usize],
    options: &EigenOptions,
) -> Result<Vec<Mode>> {
    let n = a.nrows();
    if !a.is_square() {
        return Err(Error::ShapeMismatch {
            file: "averaged state matrix".to_string(),
            matrix: "A",
            expected: (n, n),
            actual: a.shape(),
        });
    }
    if n == 0 {
        return Ok(Vec::new());
    }
    if a.iter().any(|x| !x.is_finite()) {
        return Err(Error::NonFinite { matrix: "A" });
    }
    debug_assert!(reduced_rows.iter().all(|&r| r < n));

    let schur = Schur::try_new(a.clone(), options.eps, options.max_iterations)
        .ok_or(Error::EigenNotConverged { size: n })?;
    let eigenvalues = schur.complex_eigenvalues();

    let mut modes = eigenvalues
        .iter()
        .filter(|lambda| lambda.im > 0.0)
        .map(|&lambda| {
            let v = null_vector(a, lambda, options)?;
            let reduced = DVector::from_iterator(
                reduced_rows.len(),
                reduced_rows.iter().map(|&r| v[r]),
            );
            Ok(Mode::from_eigenpair(lambda, &reduced))
        })
        .collect::<Result<Vec<_>>>()?;

    modes.sort_by(|a, b| a.natural_frequency.total_cmp(&b.natural_frequency));

    log::debug!(
        "eigen-analysis of {n}x{n} matrix: {} oscillatory modes",
        modes.len()
    );
    Ok(modes)
}
