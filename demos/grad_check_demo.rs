/// Gradient check demo for softmax-linear.
///
/// Compares the analytic gradient of the vectorized softmax loss against
/// centered finite differences at randomly sampled weight entries, with and
/// without regularization.
///
/// Run with:
///   RUST_LOG=debug cargo run --example grad_check_demo

use rand::{rngs::StdRng, Rng, SeedableRng};
use softmax_linear::gradcheck::DEFAULT_STEP;
use softmax_linear::{grad_check_sparse, softmax_loss_vectorized, LossError, Matrix};

fn main() -> Result<(), LossError> {
    env_logger::init();

    let (n, d, c) = (50, 40, 10);
    let mut rng = StdRng::seed_from_u64(231);
    let w = Matrix::random(d, c, 1e-3, &mut rng);
    let x = Matrix::random(n, d, 1.0, &mut rng);
    let y: Vec<usize> = (0..n).map(|_| rng.gen_range(0..c)).collect();

    for reg in [0.0, 5e1] {
        let (loss, grad) = softmax_loss_vectorized(&w, &x, &y, reg)?;
        println!("reg = {reg}: loss {loss:.6}");

        let report = grad_check_sparse(
            |w: &Matrix| softmax_loss_vectorized(w, &x, &y, reg).map(|(loss, _)| loss),
            &w,
            &grad,
            10,
            DEFAULT_STEP,
            &mut rng,
        )?;

        for e in &report.entries {
            println!(
                "  ({:>2}, {:>2}) numerical {:>12.6e} analytic {:>12.6e} relative error {:.3e}",
                e.row, e.col, e.numerical, e.analytic, e.relative_error
            );
        }
        println!("  max relative error {:.3e}", report.max_relative_error());
    }

    Ok(())
}
