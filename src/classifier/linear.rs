use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::softmax::softmax_rows;
use crate::loss::error::{LossError, Result};
use crate::loss::loss_config::LossConfig;
use crate::math::matrix::Matrix;

/// A linear softmax classifier: class scores are `X · W`.
///
/// `weights` is D×C (features × classes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub weights: Matrix,
}

impl LinearClassifier {
    pub fn new(weights: Matrix) -> LinearClassifier {
        LinearClassifier { weights }
    }

    pub fn zeros(dim: usize, classes: usize) -> LinearClassifier {
        LinearClassifier::new(Matrix::zeros(dim, classes))
    }

    /// Small uniform weights in `[-scale, scale)`, e.g. `scale = 1e-4`.
    pub fn random<R: Rng + ?Sized>(dim: usize, classes: usize, scale: f64, rng: &mut R) -> LinearClassifier {
        LinearClassifier::new(Matrix::random(dim, classes, scale, rng))
    }

    pub fn dim(&self) -> usize {
        self.weights.rows
    }

    pub fn num_classes(&self) -> usize {
        self.weights.cols
    }

    /// Raw class scores, N×C.
    pub fn scores(&self, x: &Matrix) -> Result<Matrix> {
        x.matmul(&self.weights)
    }

    /// Softmax class probabilities, N×C.
    pub fn probabilities(&self, x: &Matrix) -> Result<Matrix> {
        Ok(softmax_rows(&self.scores(x)?))
    }

    /// Predicted label per example (highest score wins).
    pub fn predict(&self, x: &Matrix) -> Result<Vec<usize>> {
        if self.num_classes() == 0 {
            return Err(LossError::NoClasses);
        }
        Ok(self.scores(x)?.argmax_rows())
    }

    /// Fraction of examples whose predicted label equals `y`.
    pub fn accuracy(&self, x: &Matrix, y: &[usize]) -> Result<f64> {
        let predicted = self.predict(x)?;
        if predicted.len() != y.len() {
            return Err(LossError::LabelCountMismatch { labels: y.len(), examples: predicted.len() });
        }
        if y.is_empty() {
            return Err(LossError::EmptyBatch);
        }
        let correct = predicted.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        Ok(correct as f64 / y.len() as f64)
    }

    /// Loss and weight gradient on a batch, as configured by `config`.
    pub fn loss(&self, x: &Matrix, y: &[usize], config: &LossConfig) -> Result<(f64, Matrix)> {
        config.compute(&self.weights, x, y)
    }
}
