pub mod matmul;

use crate::backend::ComputeBackend;
use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;
use crate::tensor::Tensor;

/// Pure-Rust CPU compute backend.
///
/// Implements all operations with straightforward loops optimized for
/// correctness rather than peak performance. Serves as the reference that
/// device results are checked against. F16 inputs are widened to f32 for
/// accumulation and the result is narrowed back on store.
#[derive(Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn check_len(what: &str, tensor: &Tensor, expected: usize) -> Result<()> {
    let got = tensor.shape().numel();
    if got != expected {
        return Err(TensorError::Other(format!(
            "matmul: {what} has {got} elements but expected {expected}"
        )));
    }
    Ok(())
}

impl ComputeBackend for CpuBackend {
    type Buffer = Tensor;

    fn name(&self) -> &str {
        "cpu"
    }

    fn upload(&self, tensor: &Tensor) -> Result<Tensor> {
        Ok(tensor.clone())
    }

    fn alloc(&self, shape: &Shape, dtype: DType) -> Result<Tensor> {
        Ok(Tensor::zeros(shape.clone(), dtype))
    }

    fn matmul(
        &self,
        a: &Tensor,
        b: &Tensor,
        out: &mut Tensor,
        m: usize,
        k: usize,
        n: usize,
    ) -> Result<()> {
        for t in [b, &*out] {
            if t.dtype() != a.dtype() {
                return Err(TensorError::DTypeMismatch {
                    expected: a.dtype().to_string(),
                    got: t.dtype().to_string(),
                });
            }
        }
        check_len("a", a, m * k)?;
        check_len("b", b, k * n)?;
        check_len("out", out, m * n)?;

        let c = matmul::matmul_f32(&a.to_f32_vec(), &b.to_f32_vec(), m, k, n);
        *out = Tensor::from_storage(CpuStorage::from_f32_as(c, a.dtype()), Shape::matrix(m, n))?;
        Ok(())
    }

    fn download(&self, buffer: &Tensor) -> Result<Tensor> {
        Ok(buffer.clone())
    }

    fn synchronize(&self) -> Result<()> {
        Ok(())
    }
}
