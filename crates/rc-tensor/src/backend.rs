use std::fmt::Debug;

use crate::dtype::DType;
use crate::error::Result;
use crate::shape::Shape;
use crate::tensor::Tensor;

/// Trait for pluggable compute backends (HIP, CPU reference).
///
/// Data lives in backend-owned buffers so that repeated operations do not
/// round-trip through host memory. Device backends may execute work
/// asynchronously: a call returning `Ok` only means the work was accepted,
/// and `synchronize` is the point where completion is guaranteed.
pub trait ComputeBackend: Debug {
    /// Backend-resident storage for one tensor.
    type Buffer;

    /// Returns the name of this backend (e.g., "cpu", "hip").
    fn name(&self) -> &str;

    /// Copies a host tensor into a new backend buffer.
    fn upload(&self, tensor: &Tensor) -> Result<Self::Buffer>;

    /// Allocates an uninitialized (or zeroed) buffer for `shape` elements of `dtype`.
    fn alloc(&self, shape: &Shape, dtype: DType) -> Result<Self::Buffer>;

    /// Matrix multiplication: out = a @ b.
    ///
    /// - `a`: row-major data of shape [m, k]
    /// - `b`: row-major data of shape [k, n]
    /// - `out`: row-major data of shape [m, n], overwritten
    ///
    /// All three buffers must share a dtype.
    fn matmul(
        &self,
        a: &Self::Buffer,
        b: &Self::Buffer,
        out: &mut Self::Buffer,
        m: usize,
        k: usize,
        n: usize,
    ) -> Result<()>;

    /// Copies a buffer back into a host tensor. Implies a wait for
    /// pending work that writes the buffer.
    fn download(&self, buffer: &Self::Buffer) -> Result<Tensor>;

    /// Blocks until all previously submitted work has completed.
    fn synchronize(&self) -> Result<()>;
}
