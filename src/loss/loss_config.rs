use serde::{Serialize, Deserialize};

use crate::loss::error::{LossError, Result};
use crate::loss::implementation::Implementation;
use crate::loss::softmax::{softmax_loss_naive, softmax_loss_vectorized, validate};
use crate::math::matrix::Matrix;

/// Configuration for a softmax loss evaluation.
///
/// # Fields
/// - `reg`            — L2 regularization strength, finite and `>= 0`
/// - `implementation` — which code path to run (`naive` or `vectorized`)
///
/// Missing fields fall back to their defaults when read from JSON, so
/// `{}` is a valid config (no regularization, vectorized).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossConfig {
    pub reg: f64,
    pub implementation: Implementation,
}

impl Default for LossConfig {
    fn default() -> Self {
        LossConfig { reg: 0.0, implementation: Implementation::Vectorized }
    }
}

impl LossConfig {
    /// Creates a vectorized config with the given regularization strength.
    pub fn new(reg: f64) -> Self {
        LossConfig { reg, ..LossConfig::default() }
    }

    pub fn with_implementation(mut self, implementation: Implementation) -> Self {
        self.implementation = implementation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.reg.is_finite() || self.reg < 0.0 {
            return Err(LossError::InvalidRegularization(self.reg));
        }
        Ok(())
    }

    /// Parses and validates a config from a JSON string.
    pub fn from_json_str(json: &str) -> Result<LossConfig> {
        let config: LossConfig = serde_json::from_str(json)
            .map_err(|e| LossError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a config from a JSON file.
    pub fn load_json(path: &str) -> Result<LossConfig> {
        let file = std::fs::File::open(path)
            .map_err(|e| LossError::Config(format!("{}: {}", path, e)))?;
        let reader = std::io::BufReader::new(file);
        let config: LossConfig = serde_json::from_reader(reader)
            .map_err(|e| LossError::Config(format!("{}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Computes `(loss, dW)` with the configured code path.
    pub fn compute(&self, w: &Matrix, x: &Matrix, y: &[usize]) -> Result<(f64, Matrix)> {
        match self.implementation {
            Implementation::Naive      => softmax_loss_naive(w, x, y, self.reg),
            Implementation::Vectorized => softmax_loss_vectorized(w, x, y, self.reg),
        }
    }

    /// Input validation only; see [`validate`].
    pub fn check_inputs(&self, w: &Matrix, x: &Matrix, y: &[usize]) -> Result<()> {
        validate(w, x, y, self.reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn empty_json_uses_defaults() {
        let config = LossConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LossConfig::default());
        assert_eq!(config.implementation, Implementation::Vectorized);
    }

    #[test]
    fn json_fields_are_snake_case() {
        let config = LossConfig::from_json_str(r#"{"reg": 0.25, "implementation": "naive"}"#).unwrap();
        assert_eq!(config, LossConfig::new(0.25).with_implementation(Implementation::Naive));

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"naive\""));
    }

    #[test]
    fn negative_reg_is_rejected() {
        let err = LossConfig::from_json_str(r#"{"reg": -1.0}"#).unwrap_err();
        assert!(matches!(err, LossError::InvalidRegularization(_)));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = LossConfig::from_json_str(r#"{"implementation": "loopy"}"#).unwrap_err();
        assert!(matches!(err, LossError::Config(_)));
    }

    #[test]
    fn load_json_reads_file() {
        let path = std::env::temp_dir().join(format!("softmax_linear_cfg_{}.json", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            write!(file, r#"{{"reg": 1.5}}"#).unwrap();
        }
        let config = LossConfig::load_json(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.reg, 1.5);

        let err = LossConfig::load_json("/nonexistent/softmax_linear.json").unwrap_err();
        assert!(matches!(err, LossError::Config(_)));
    }

    #[test]
    fn both_implementations_dispatch() {
        let w = Matrix::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap();
        let x = Matrix::from_rows(vec![vec![1.0, 1.0]]).unwrap();
        let naive = LossConfig::new(0.1).with_implementation(Implementation::Naive);
        let vectorized = LossConfig::new(0.1);

        assert!(naive.check_inputs(&w, &x, &[0]).is_ok());
        let (a, _) = naive.compute(&w, &x, &[0]).unwrap();
        let (b, _) = vectorized.compute(&w, &x, &[0]).unwrap();
        assert_relative_eq!(a, b, max_relative = 1e-12);
        assert_relative_eq!(a, 0.861_994_804_058 + 0.1, epsilon = 1e-9);
    }
}
