pub mod numerical;

pub use numerical::{
    grad_check_sparse, numerical_gradient, relative_error, GradCheckEntry, GradCheckReport,
    DEFAULT_STEP,
};
