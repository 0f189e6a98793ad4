use rc_tensor::{ComputeBackend, CpuBackend, DType, Shape, Tensor};
use tracing::debug;

use crate::error::Result;

/// Result of checking leading rows of a device GEMM against the CPU reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub rows: usize,
    /// max |device - reference| / max |reference|.
    pub max_rel_error: f32,
    pub tolerance: f32,
}

impl Verification {
    pub fn passed(&self) -> bool {
        self.max_rel_error <= self.tolerance
    }
}

/// Acceptable relative error for a GEMM accumulated in `dtype`.
pub fn tolerance(dtype: DType) -> f32 {
    match dtype {
        DType::F32 => 1e-3,
        DType::F16 => 5e-2,
    }
}

/// Compares the first `rows` rows of `result = a @ b` with `CpuBackend`.
///
/// Only the leading rows are recomputed so the check stays cheap for the
/// default 2048x2048 problem.
pub fn verify_rows(a: &Tensor, b: &Tensor, result: &Tensor, rows: usize) -> Result<Verification> {
    let rows = rows.min(a.shape().dim(0));
    let (k, n) = (a.shape().dim(1), b.shape().dim(1));

    let cpu = CpuBackend::new();
    let a_rows = a.rows(0..rows)?;
    let mut expected = cpu.alloc(&Shape::matrix(rows, n), a.dtype())?;
    cpu.matmul(&a_rows, b, &mut expected, rows, k, n)?;

    let got = result.rows(0..rows)?.to_f32_vec();
    let expected = expected.to_f32_vec();

    let scale = expected
        .iter()
        .fold(0.0f32, |acc, x| acc.max(x.abs()))
        .max(f32::EPSILON);
    let max_abs = got
        .iter()
        .zip(&expected)
        .fold(0.0f32, |acc, (g, e)| acc.max((g - e).abs()));
    // NaN from the device must fail the check rather than compare false everywhere
    let max_rel_error = if got.iter().any(|x| !x.is_finite()) {
        f32::INFINITY
    } else {
        max_abs / scale
    };

    let v = Verification {
        rows,
        max_rel_error,
        tolerance: tolerance(a.dtype()),
    };
    debug!(rows, max_rel_error, passed = v.passed(), "verified result rows");
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inputs(n: usize, dtype: DType) -> (Tensor, Tensor) {
        let mut rng = StdRng::seed_from_u64(42);
        let a = Tensor::randn(Shape::matrix(n, n), dtype, &mut rng);
        let b = Tensor::randn(Shape::matrix(n, n), dtype, &mut rng);
        (a, b)
    }

    fn product(a: &Tensor, b: &Tensor) -> Tensor {
        let cpu = CpuBackend::new();
        let n = a.shape().dim(0);
        let mut c = cpu.alloc(&Shape::matrix(n, n), a.dtype()).unwrap();
        cpu.matmul(a, b, &mut c, n, n, n).unwrap();
        c
    }

    #[test]
    fn test_exact_result_passes() {
        let (a, b) = inputs(16, DType::F32);
        let c = product(&a, &b);
        let v = verify_rows(&a, &b, &c, 4).unwrap();
        assert_eq!(v.rows, 4);
        assert_eq!(v.max_rel_error, 0.0);
        assert!(v.passed());
    }

    #[test]
    fn test_corrupted_result_fails() {
        let (a, b) = inputs(16, DType::F32);
        let mut data = product(&a, &b).to_f32_vec();
        data[3] += 1000.0;
        let c = Tensor::new(data, Shape::matrix(16, 16));
        assert!(!verify_rows(&a, &b, &c, 1).unwrap().passed());
    }

    #[test]
    fn test_nan_fails() {
        let (a, b) = inputs(8, DType::F32);
        let mut data = product(&a, &b).to_f32_vec();
        data[0] = f32::NAN;
        let c = Tensor::new(data, Shape::matrix(8, 8));
        let v = verify_rows(&a, &b, &c, 2).unwrap();
        assert!(v.max_rel_error.is_infinite());
        assert!(!v.passed());
    }

    #[test]
    fn test_rows_clamped_to_matrix() {
        let (a, b) = inputs(4, DType::F16);
        let c = product(&a, &b);
        let v = verify_rows(&a, &b, &c, 100).unwrap();
        assert_eq!(v.rows, 4);
        assert_eq!(v.tolerance, 5e-2);
        assert!(v.passed());
    }
}
