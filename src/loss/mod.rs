pub mod error;
pub mod implementation;
pub mod loss_config;
pub mod softmax;

pub use error::{LossError, Result};
pub use implementation::Implementation;
pub use loss_config::LossConfig;
pub use softmax::{softmax_loss_naive, softmax_loss_vectorized};
