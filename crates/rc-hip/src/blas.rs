use std::ptr;
use std::sync::Arc;

use half::f16;
use rc_tensor::DType;
use tracing::warn;

use crate::error::{HipError, HipResult};
use crate::ffi::{RocblasApi, RocblasHandle, ROCBLAS_OPERATION_NONE};
use crate::memory::DeviceBuffer;

/// An owned rocBLAS handle, bound to the HIP device that was current when
/// it was created.
#[derive(Debug)]
pub struct BlasHandle {
    blas: Arc<RocblasApi>,
    handle: RocblasHandle,
}

fn to_blas_int(what: &'static str, value: usize) -> HipResult<i32> {
    i32::try_from(value).map_err(|_| HipError::DimensionOverflow { what, value })
}

impl BlasHandle {
    pub fn new(blas: Arc<RocblasApi>) -> HipResult<Self> {
        let mut handle = ptr::null_mut();
        // SAFETY: `handle` is a valid out-parameter.
        let status = unsafe { (blas.create_handle)(&mut handle) };
        blas.check("rocblas_create_handle", status)?;
        Ok(Self { blas, handle })
    }

    /// Enqueues row-major `c = a @ b` with `a: [m, k]`, `b: [k, n]`.
    ///
    /// rocBLAS is column-major; a row-major matrix read column-major is its
    /// transpose, so this issues `c^T = b^T @ a^T` with no explicit transposes.
    /// The caller has checked dtypes and element counts.
    pub fn gemm(
        &self,
        a: &DeviceBuffer,
        b: &DeviceBuffer,
        c: &mut DeviceBuffer,
        m: usize,
        k: usize,
        n: usize,
    ) -> HipResult<()> {
        let (m, k, n) = (
            to_blas_int("m", m)?,
            to_blas_int("k", k)?,
            to_blas_int("n", n)?,
        );
        let op = ROCBLAS_OPERATION_NONE;
        // SAFETY: buffers hold at least m*k, k*n and m*n elements of the
        // dtype matching the selected GEMM; alpha/beta are host scalars
        // (rocBLAS default pointer mode).
        let status = unsafe {
            match c.dtype() {
                DType::F32 => {
                    let (alpha, beta) = (1.0f32, 0.0f32);
                    (self.blas.sgemm)(
                        self.handle,
                        op,
                        op,
                        n,
                        m,
                        k,
                        &alpha,
                        b.as_ptr().cast(),
                        n,
                        a.as_ptr().cast(),
                        k,
                        &beta,
                        c.as_mut_ptr().cast(),
                        n,
                    )
                }
                DType::F16 => {
                    let (alpha, beta) = (f16::ONE, f16::ZERO);
                    (self.blas.hgemm)(
                        self.handle,
                        op,
                        op,
                        n,
                        m,
                        k,
                        &alpha,
                        b.as_ptr().cast(),
                        n,
                        a.as_ptr().cast(),
                        k,
                        &beta,
                        c.as_mut_ptr().cast(),
                        n,
                    )
                }
            }
        };
        let call = match c.dtype() {
            DType::F32 => "rocblas_sgemm",
            DType::F16 => "rocblas_hgemm",
        };
        self.blas.check(call, status)
    }
}

impl Drop for BlasHandle {
    fn drop(&mut self) {
        // SAFETY: the handle came from rocblas_create_handle and is destroyed once.
        let status = unsafe { (self.blas.destroy_handle)(self.handle) };
        if let Err(e) = self.blas.check("rocblas_destroy_handle", status) {
            warn!(error = %e, "failed to destroy rocBLAS handle");
        }
    }
}
