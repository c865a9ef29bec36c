use crate::math::matrix::Matrix;

/// Largest element of a row; `-inf` for an empty row.
fn row_max(row: &[f64]) -> f64 {
    row.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b))
}

/// `log(Σ exp(row[j]))`, evaluated as `max + log(Σ exp(row[j] - max))`
/// so that large scores do not overflow.
pub fn log_sum_exp(row: &[f64]) -> f64 {
    let max = row_max(row);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = row.iter().map(|&s| (s - max).exp()).sum();
    max + sum.ln()
}

/// Softmax of a single score vector.
///
/// Scores are shifted by their maximum first; softmax is invariant to a
/// uniform shift, and the shifted exponentials are all in (0, 1].
pub fn softmax(row: &[f64]) -> Vec<f64> {
    let max = row_max(row);
    let exp: Vec<f64> = row.iter().map(|&s| (s - max).exp()).collect();
    let sum: f64 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

/// Row-wise softmax of an N×C score matrix.
pub fn softmax_rows(scores: &Matrix) -> Matrix {
    Matrix {
        rows: scores.rows,
        cols: scores.cols,
        data: scores.data.iter().map(|row| softmax(row)).collect(),
    }
}
