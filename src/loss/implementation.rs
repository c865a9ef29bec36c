use serde::{Serialize, Deserialize};

/// Selects which code path computes the softmax loss.
///
/// - `Naive`      — per-example loop with column-wise gradient accumulation.
/// - `Vectorized` — whole-matrix operations; the default.
///
/// Both return the same loss and gradient up to rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Implementation {
    Naive,
    #[default]
    Vectorized,
}
