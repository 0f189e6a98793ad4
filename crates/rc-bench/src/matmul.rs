use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rc_tensor::{ComputeBackend, Shape, Tensor};
use tracing::{debug, info};

use crate::config::BenchConfig;
use crate::error::Result;
use crate::report::BenchReport;
use crate::verify::verify_rows;

/// Runs the square GEMM benchmark described by `config` on `backend`.
///
/// Two random N(0, 1) matrices are uploaded once and reused. After the
/// warm-up multiplications the backend is synchronized, the timer starts,
/// `iterations` multiplications are enqueued, and the backend is
/// synchronized again before the timer stops, so the measurement covers
/// completed work rather than enqueued work.
pub fn run_matmul<B: ComputeBackend>(backend: &B, config: &BenchConfig) -> Result<BenchReport> {
    config.validate()?;

    let n = config.size;
    let shape = Shape::matrix(n, n);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let a = Tensor::randn(shape.clone(), config.dtype, &mut rng);
    let b = Tensor::randn(shape.clone(), config.dtype, &mut rng);

    let da = backend.upload(&a)?;
    let db = backend.upload(&b)?;
    let mut dc = backend.alloc(&shape, config.dtype)?;

    debug!(backend = backend.name(), size = n, warmup = config.warmup, "warming up");
    for _ in 0..config.warmup {
        backend.matmul(&da, &db, &mut dc, n, n, n)?;
    }
    backend.synchronize()?;

    let start = Instant::now();
    for _ in 0..config.iterations {
        backend.matmul(&da, &db, &mut dc, n, n, n)?;
    }
    backend.synchronize()?;
    let elapsed = start.elapsed();

    let verification = if config.verify_rows > 0 {
        let result = backend.download(&dc)?;
        Some(verify_rows(&a, &b, &result, config.verify_rows)?)
    } else {
        None
    };

    let report = BenchReport {
        backend: backend.name().to_string(),
        size: n,
        dtype: config.dtype,
        warmup: config.warmup,
        iterations: config.iterations,
        elapsed,
        verification,
    };
    info!(
        backend = %report.backend,
        iterations = report.iterations,
        elapsed_ms = report.elapsed.as_secs_f64() * 1e3,
        gflops = report.gflops(),
        "matmul benchmark finished"
    );
    Ok(report)
}
