pub mod math;
pub mod activation;
pub mod loss;
pub mod classifier;
pub mod gradcheck;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use loss::{softmax_loss_naive, softmax_loss_vectorized, Implementation, LossConfig, LossError};
pub use classifier::linear::LinearClassifier;
pub use gradcheck::{grad_check_sparse, numerical_gradient, GradCheckReport};
