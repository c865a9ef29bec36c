/// Softmax loss demo for softmax-linear.
///
/// Evaluates the loss of a small hand-written classifier, then times the
/// naive and vectorized code paths on a larger random minibatch.
///
/// Run with:
///   RUST_LOG=debug cargo run --example softmax_demo --release

use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use softmax_linear::{
    softmax_loss_naive, softmax_loss_vectorized, Implementation, LinearClassifier, LossConfig,
    LossError, Matrix,
};

fn main() -> Result<(), LossError> {
    env_logger::init();

    // ── Two features, three classes, one example ───────────────────────────
    let clf = LinearClassifier::new(Matrix::from_rows(vec![
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
    ])?);
    let x = Matrix::from_rows(vec![vec![1.0, 1.0]])?;

    let (loss, dw) = clf.loss(&x, &[0], &LossConfig::default())?;
    println!("scores        = {:?}", clf.scores(&x)?.row(0));
    println!("probabilities = {:?}", clf.probabilities(&x)?.row(0));
    println!("loss          = {loss:.4}");
    for (d, row) in dw.data.iter().enumerate() {
        println!("dW[{d}]         = {row:.4?}");
    }

    // ── Naive vs vectorized on a CIFAR-sized minibatch ─────────────────────
    let (n, d, c) = (500, 3073, 10);
    let mut rng = StdRng::seed_from_u64(0);
    let w = Matrix::random(d, c, 1e-4, &mut rng);
    let x = Matrix::random(n, d, 128.0, &mut rng);
    let y: Vec<usize> = (0..n).map(|_| rng.gen_range(0..c)).collect();

    let t = Instant::now();
    let (loss_naive, grad_naive) = softmax_loss_naive(&w, &x, &y, 5e-6)?;
    let naive_ms = t.elapsed().as_millis();

    let t = Instant::now();
    let (loss_vec, grad_vec) = softmax_loss_vectorized(&w, &x, &y, 5e-6)?;
    let vec_ms = t.elapsed().as_millis();

    println!("naive      loss {loss_naive:.6} in {naive_ms} ms");
    println!("vectorized loss {loss_vec:.6} in {vec_ms} ms");
    println!("loss difference     {:.3e}", (loss_naive - loss_vec).abs());
    println!("gradient difference {:.3e}", (grad_naive - grad_vec).max_abs());

    // Sanity check: with tiny weights the loss should be close to ln(10).
    println!("ln(C) = {:.6}", (c as f64).ln());

    // Same batch through a config-selected path.
    let config = LossConfig::new(5e-6).with_implementation(Implementation::Naive);
    let clf = LinearClassifier::new(w);
    let (loss_cfg, _) = clf.loss(&x, &y, &config)?;
    let acc = clf.accuracy(&x, &y)?;
    println!("{:?} via config: loss {loss_cfg:.6}, untrained accuracy {acc:.3}", config.implementation);

    Ok(())
}
