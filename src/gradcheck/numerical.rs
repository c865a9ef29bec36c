use log::{debug, warn};
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::loss::error::{LossError, Result};
use crate::math::matrix::Matrix;

/// Default step for centered differences.
pub const DEFAULT_STEP: f64 = 1e-5;

/// Relative errors above this are logged as suspicious.
pub const WARN_THRESHOLD: f64 = 1e-4;

/// Floor on the denominator so two near-zero values do not blow up.
const REL_EPS: f64 = 1e-8;

/// `|a - b| / max(ε, |a| + |b|)`
pub fn relative_error(a: f64, b: f64) -> f64 {
    (a - b).abs() / (a.abs() + b.abs()).max(REL_EPS)
}

/// One sampled comparison between the numerical and analytic gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradCheckEntry {
    pub row: usize,
    pub col: usize,
    pub numerical: f64,
    pub analytic: f64,
    pub relative_error: f64,
}

/// All entries from one `grad_check_sparse` run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradCheckReport {
    pub entries: Vec<GradCheckEntry>,
}

impl GradCheckReport {
    /// 0.0 for an empty report.
    pub fn max_relative_error(&self) -> f64 {
        self.entries.iter().fold(0.0, |acc: f64, e| acc.max(e.relative_error))
    }

    pub fn passes(&self, threshold: f64) -> bool {
        self.entries.iter().all(|e| e.relative_error <= threshold)
    }
}

/// Centered-difference estimate of ∂f/∂W at a single entry.
///
/// Mutates `w` in place and restores the entry before returning; callers
/// pass a scratch clone.
fn partial<F>(f: &F, w: &mut Matrix, row: usize, col: usize, h: f64) -> Result<f64>
where
    F: Fn(&Matrix) -> Result<f64>,
{
    let old = w.get(row, col);

    w.set(row, col, old + h);
    let plus = f(&*w);
    w.set(row, col, old - h);
    let minus = f(&*w);
    w.set(row, col, old);

    Ok((plus? - minus?) / (2.0 * h))
}

/// Numerical gradient of `f` at `w`, evaluated at every entry.
///
/// Costs `2 · rows · cols` evaluations of `f`; use [`grad_check_sparse`] for
/// anything but small matrices.
pub fn numerical_gradient<F>(f: F, w: &Matrix, h: f64) -> Result<Matrix>
where
    F: Fn(&Matrix) -> Result<f64>,
{
    w.check_consistent()?;

    let mut probe = w.clone();
    let mut grad = Matrix::zeros(w.rows, w.cols);

    for i in 0..w.rows {
        for j in 0..w.cols {
            grad.data[i][j] = partial(&f, &mut probe, i, j, h)?;
        }
    }

    Ok(grad)
}

/// Compares `analytic` against centered differences of `f` at `num_checks`
/// randomly chosen entries of `w`.
pub fn grad_check_sparse<F, R>(
    f: F,
    w: &Matrix,
    analytic: &Matrix,
    num_checks: usize,
    h: f64,
    rng: &mut R,
) -> Result<GradCheckReport>
where
    F: Fn(&Matrix) -> Result<f64>,
    R: Rng + ?Sized,
{
    w.check_consistent()?;
    analytic.check_consistent()?;
    if analytic.shape() != w.shape() {
        return Err(LossError::GradientShape { expected: w.shape(), found: analytic.shape() });
    }
    if w.rows == 0 || w.cols == 0 {
        return Ok(GradCheckReport::default());
    }

    let mut probe = w.clone();
    let mut entries = Vec::with_capacity(num_checks);

    for _ in 0..num_checks {
        let row = rng.gen_range(0..w.rows);
        let col = rng.gen_range(0..w.cols);

        let numerical = partial(&f, &mut probe, row, col, h)?;
        let analytic = analytic.get(row, col);
        let rel = relative_error(numerical, analytic);

        debug!(
            "grad check ({}, {}): numerical {:.6e} analytic {:.6e} relative error {:.3e}",
            row, col, numerical, analytic, rel
        );
        if rel > WARN_THRESHOLD {
            warn!("grad check ({}, {}) relative error {:.3e} exceeds {:.0e}", row, col, rel, WARN_THRESHOLD);
        }

        entries.push(GradCheckEntry { row, col, numerical, analytic, relative_error: rel });
    }

    Ok(GradCheckReport { entries })
}
