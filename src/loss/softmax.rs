use log::{debug, warn};

use crate::activation::softmax::{log_sum_exp, softmax_rows};
use crate::loss::error::{LossError, Result};
use crate::math::matrix::Matrix;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Softmax cross-entropy loss and its gradient, computed with explicit loops.
///
/// Inputs have dimension D, there are C classes, and a minibatch holds N
/// examples:
/// - `w`   — weights, D×C
/// - `x`   — minibatch of data, N×D
/// - `y`   — labels, length N, each in `[0, C)`
/// - `reg` — L2 regularization strength
///
/// Returns `(loss, dW)` with `dW` shaped like `w`. Produces the same values
/// as [`softmax_loss_vectorized`] up to rounding; kept for comparison.
pub fn softmax_loss_naive(w: &Matrix, x: &Matrix, y: &[usize], reg: f64) -> Result<(f64, Matrix)> {
    validate_logged(w, x, y, reg)?;

    let num_classes = w.cols;
    let num_train = x.rows;
    let dim = w.rows;

    let mut loss = 0.0;
    let mut dw = Matrix::zeros(dim, num_classes);

    for i in 0..num_train {
        let xi = x.row(i);

        let mut scores = vec![0.0; num_classes];
        for (j, score) in scores.iter_mut().enumerate() {
            for d in 0..dim {
                *score += xi[d] * w.data[d][j];
            }
        }

        // Shift so the largest exponent is exp(0).
        let max = scores.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        for score in scores.iter_mut() {
            *score -= max;
        }

        let exp_sum: f64 = scores.iter().map(|s| s.exp()).sum();
        loss += -scores[y[i]] + exp_sum.ln();

        for j in 0..num_classes {
            let p = scores[j].exp() / exp_sum;
            for d in 0..dim {
                dw.data[d][j] += p * xi[d];
            }
        }
        for d in 0..dim {
            dw.data[d][y[i]] -= xi[d];
        }
    }

    Ok(finish(loss, dw, w, num_train, reg))
}

/// Softmax cross-entropy loss and its gradient, computed with whole-matrix
/// operations. Same inputs and outputs as [`softmax_loss_naive`].
///
/// ```
/// use softmax_linear::{softmax_loss_vectorized, Matrix};
///
/// let w = Matrix::zeros(4, 3);
/// let x = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0, 4.0]]).unwrap();
/// let (loss, dw) = softmax_loss_vectorized(&w, &x, &[2], 0.0).unwrap();
///
/// assert!((loss - 3.0_f64.ln()).abs() < 1e-12);
/// assert_eq!(dw.shape(), (4, 3));
/// ```
pub fn softmax_loss_vectorized(w: &Matrix, x: &Matrix, y: &[usize], reg: f64) -> Result<(f64, Matrix)> {
    validate_logged(w, x, y, reg)?;

    let num_train = x.rows;

    let scores = x.matmul(w)?;

    // L_i = log Σ_j exp(s_ij) - s_iy, both terms on the same shifted scale.
    let loss: f64 = scores.data.iter().zip(y.iter())
        .map(|(row, &label)| log_sum_exp(row) - row[label])
        .sum();

    // δ = softmax(scores) - one_hot(y)
    let mut delta = softmax_rows(&scores);
    for (row, &label) in delta.data.iter_mut().zip(y.iter()) {
        row[label] -= 1.0;
    }

    let dw = x.transpose().matmul(&delta)?;

    Ok(finish(loss, dw, w, num_train, reg))
}

/// Checks shapes, labels and `reg` without computing anything.
///
/// Both code paths call this first; callers may also use it to reject a
/// batch up front.
pub fn validate(w: &Matrix, x: &Matrix, y: &[usize], reg: f64) -> Result<()> {
    w.check_consistent()?;
    x.check_consistent()?;
    if w.rows != x.cols {
        return Err(LossError::ShapeMismatch { weight_rows: w.rows, data_cols: x.cols });
    }
    if x.rows == 0 {
        return Err(LossError::EmptyBatch);
    }
    if w.cols == 0 {
        return Err(LossError::NoClasses);
    }
    if y.len() != x.rows {
        return Err(LossError::LabelCountMismatch { labels: y.len(), examples: x.rows });
    }
    if let Some((index, &label)) = y.iter().enumerate().find(|&(_, &label)| label >= w.cols) {
        return Err(LossError::LabelOutOfRange { index, label, classes: w.cols });
    }
    if !reg.is_finite() || reg < 0.0 {
        return Err(LossError::InvalidRegularization(reg));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn validate_logged(w: &Matrix, x: &Matrix, y: &[usize], reg: f64) -> Result<()> {
    validate(w, x, y, reg).map_err(|e| {
        warn!("rejecting softmax loss input: {}", e);
        e
    })
}

/// Averages the data terms over the batch and adds the L2 penalty:
/// `loss / N + reg/2 · ΣW²` and `dW / N + reg · W`.
fn finish(data_loss: f64, dw_sum: Matrix, w: &Matrix, num_train: usize, reg: f64) -> (f64, Matrix) {
    let inv_n = 1.0 / num_train as f64;

    let loss = data_loss * inv_n + 0.5 * reg * w.sum_squares();
    let dw = dw_sum.scale(inv_n) + w.scale(reg);

    debug!(
        "softmax loss: n={} d={} c={} reg={} loss={:.6}",
        num_train, w.rows, w.cols, reg, loss
    );

    (loss, dw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn scenario() -> (Matrix, Matrix, Vec<usize>) {
        let w = Matrix::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap();
        let x = Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap();
        (w, x, vec![0])
    }

    fn random_problem(seed: u64, n: usize, d: usize, c: usize) -> (Matrix, Matrix, Vec<usize>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let w = Matrix::random(d, c, 0.01, &mut rng);
        let x = Matrix::random(n, d, 10.0, &mut rng);
        let y = (0..n).map(|_| rng.gen_range(0..c)).collect();
        (w, x, y)
    }

    type LossFn = fn(&Matrix, &Matrix, &[usize], f64) -> Result<(f64, Matrix)>;

    const BOTH: [LossFn; 2] = [softmax_loss_naive, softmax_loss_vectorized];

    #[test]
    fn test_two_feature_three_class_scenario() {
        let (w, x, y) = scenario();
        for f in BOTH {
            let (loss, dw) = f(&w, &x, &y, 0.0).unwrap();
            assert_relative_eq!(loss, 0.861_994_804_058, epsilon = 1e-9);
            assert_eq!(dw.shape(), (2, 3));
            for row in &dw.data {
                assert_abs_diff_eq!(row[0], 0.422_318_798_25 - 1.0, epsilon = 1e-9);
                assert_abs_diff_eq!(row[1], 0.422_318_798_25, epsilon = 1e-9);
                assert_abs_diff_eq!(row[2], 0.155_362_403_50, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_weights_give_ln_c() {
        let (_, x, y) = random_problem(1, 8, 5, 7);
        let w = Matrix::zeros(5, 7);
        let (loss, _) = softmax_loss_vectorized(&w, &x, &y, 0.0).unwrap();
        assert_relative_eq!(loss, 7.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_naive_and_vectorized_agree() {
        let (w, x, y) = random_problem(42, 50, 20, 10);
        let (loss_n, dw_n) = softmax_loss_naive(&w, &x, &y, 0.5).unwrap();
        let (loss_v, dw_v) = softmax_loss_vectorized(&w, &x, &y, 0.5).unwrap();

        assert_relative_eq!(loss_n, loss_v, max_relative = 1e-7);
        let diff = (dw_n - dw_v.clone()).max_abs();
        assert!(diff <= 1e-7 * dw_v.max_abs().max(1.0), "gradient difference {}", diff);
    }

    #[test]
    fn test_regularization_adds_penalty_and_gradient() {
        let (w, x, y) = random_problem(3, 10, 4, 3);
        let (loss0, dw0) = softmax_loss_vectorized(&w, &x, &y, 0.0).unwrap();
        let (loss1, dw1) = softmax_loss_vectorized(&w, &x, &y, 2.0).unwrap();

        assert_relative_eq!(loss1 - loss0, w.sum_squares(), epsilon = 1e-12);
        let expected = dw0 + w.scale(2.0);
        assert!((dw1 - expected).max_abs() < 1e-12);
    }

    #[test]
    fn test_large_scores_stay_finite() {
        let w = Matrix::from_rows(vec![vec![1.0e4, -1.0e4, 0.0]]).unwrap();
        let x = Matrix::from_rows(vec![vec![1.0], vec![-1.0]]).unwrap();
        let y = vec![1, 0];
        for f in BOTH {
            let (loss, dw) = f(&w, &x, &y, 0.0).unwrap();
            assert!(loss.is_finite());
            assert_relative_eq!(loss, 2.0e4, max_relative = 1e-9);
            assert!(dw.data.iter().flatten().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let (w, x, y) = random_problem(9, 6, 3, 4);
        let (w0, x0, y0) = (w.clone(), x.clone(), y.clone());
        softmax_loss_vectorized(&w, &x, &y, 1.0).unwrap();
        softmax_loss_naive(&w, &x, &y, 1.0).unwrap();
        assert_eq!((w, x, y), (w0, x0, y0));
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let w = Matrix::zeros(3, 2);
        let x = Matrix::zeros(4, 2);
        let err = softmax_loss_vectorized(&w, &x, &[0, 0, 0, 0], 0.0).unwrap_err();
        assert!(matches!(err, LossError::ShapeMismatch { weight_rows: 3, data_cols: 2 }));
    }

    #[test]
    fn test_label_out_of_range_is_rejected() {
        let (w, x, _) = random_problem(5, 3, 2, 3);
        let err = softmax_loss_naive(&w, &x, &[0, 3, 1], 0.0).unwrap_err();
        assert!(matches!(err, LossError::LabelOutOfRange { index: 1, label: 3, classes: 3 }));
    }

    #[test]
    fn test_inconsistent_matrix_is_rejected() {
        let w = Matrix::zeros(2, 3);
        let x = Matrix { rows: 1, cols: 2, data: vec![vec![1.0]] };
        for f in BOTH {
            let err = f(&w, &x, &[0], 0.0).unwrap_err();
            assert!(matches!(err, LossError::RaggedRows { row: 0, expected: 2, found: 1 }));
        }

        let w = Matrix { rows: 2, cols: 3, data: vec![vec![0.0; 3]] };
        let x = Matrix::zeros(1, 2);
        for f in BOTH {
            let err = f(&w, &x, &[0], 0.0).unwrap_err();
            assert!(matches!(err, LossError::RowCount { expected: 2, found: 1 }));
        }
    }

    #[test]
    fn test_degenerate_batches_are_rejected() {
        let w = Matrix::zeros(2, 3);
        let err = softmax_loss_vectorized(&w, &Matrix::zeros(0, 2), &[], 0.0).unwrap_err();
        assert!(matches!(err, LossError::EmptyBatch));

        let err = softmax_loss_vectorized(&Matrix::zeros(2, 0), &Matrix::zeros(1, 2), &[0], 0.0)
            .unwrap_err();
        assert!(matches!(err, LossError::NoClasses));

        let err = softmax_loss_vectorized(&w, &Matrix::zeros(2, 2), &[0], 0.0).unwrap_err();
        assert!(matches!(err, LossError::LabelCountMismatch { labels: 1, examples: 2 }));

        let err = softmax_loss_vectorized(&w, &Matrix::zeros(1, 2), &[0], -0.1).unwrap_err();
        assert!(matches!(err, LossError::InvalidRegularization(_)));

        let err = softmax_loss_vectorized(&w, &Matrix::zeros(1, 2), &[0], f64::NAN).unwrap_err();
        assert!(matches!(err, LossError::InvalidRegularization(_)));
    }
}
