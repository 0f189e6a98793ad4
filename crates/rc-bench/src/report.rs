use std::time::Duration;

use rc_tensor::DType;

use crate::verify::Verification;

/// Outcome of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchReport {
    /// Name of the backend that ran the benchmark.
    pub backend: String,
    pub size: usize,
    pub dtype: DType,
    pub warmup: usize,
    pub iterations: usize,
    /// Wall-clock time of the timed loop, including the trailing synchronize.
    pub elapsed: Duration,
    pub verification: Option<Verification>,
}

impl BenchReport {
    /// Floating-point operations in the timed loop: 2 * n^3 per square GEMM.
    pub fn flops(&self) -> f64 {
        let n = self.size as f64;
        2.0 * n * n * n * self.iterations as f64
    }

    /// Throughput in GFLOPS. Elapsed time is floored at 1ns so the rate is
    /// always finite.
    pub fn gflops(&self) -> f64 {
        let secs = self.elapsed.max(Duration::from_nanos(1)).as_secs_f64();
        self.flops() / secs / 1e9
    }

    /// False only when verification ran and failed.
    pub fn passed(&self) -> bool {
        self.verification.as_ref().map_or(true, Verification::passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn report(size: usize, iterations: usize, elapsed: Duration) -> BenchReport {
        BenchReport {
            backend: "cpu".to_string(),
            size,
            dtype: DType::F32,
            warmup: 1,
            iterations,
            elapsed,
            verification: None,
        }
    }

    #[test]
    fn test_gflops_default_shape() {
        // 2 * 2048^3 * 100 = 1_717_986_918_400 flops in 1s
        let r = report(2048, 100, Duration::from_secs(1));
        assert_relative_eq!(r.flops(), 1_717_986_918_400.0);
        assert_relative_eq!(r.gflops(), 1717.9869184, max_relative = 1e-12);
    }

    #[test]
    fn test_gflops_scales_with_time() {
        let fast = report(512, 10, Duration::from_millis(10));
        let slow = report(512, 10, Duration::from_millis(20));
        assert_relative_eq!(fast.gflops(), 2.0 * slow.gflops(), max_relative = 1e-12);
    }

    #[test]
    fn test_gflops_zero_elapsed_is_finite() {
        let r = report(4, 1, Duration::ZERO);
        assert!(r.gflops().is_finite());
        assert!(r.gflops() > 0.0);
    }

    #[test]
    fn test_passed_without_verification() {
        assert!(report(4, 1, Duration::from_millis(1)).passed());
    }
}
