use std::sync::Arc;

use rc_tensor::{ComputeBackend, DType, Result, Shape, Tensor, TensorError};
use tracing::debug;

use crate::blas::BlasHandle;
use crate::error::HipResult;
use crate::ffi::{HipApi, RocblasApi};
use crate::memory::DeviceBuffer;

/// Compute backend on one HIP device, using rocBLAS for GEMM.
///
/// Work is enqueued on the null stream of the device selected at
/// construction; `synchronize` waits for it with `hipDeviceSynchronize`.
#[derive(Debug)]
pub struct HipBackend {
    hip: Arc<HipApi>,
    blas: BlasHandle,
}

impl HipBackend {
    /// Makes `ordinal` the current device and creates a rocBLAS handle on it.
    pub fn new(hip: Arc<HipApi>, blas: Arc<RocblasApi>, ordinal: usize) -> HipResult<Self> {
        // SAFETY: plain value argument; the ordinal was range-checked by the caller.
        let status = unsafe { (hip.set_device)(ordinal as i32) };
        hip.check("hipSetDevice", status)?;
        let blas = BlasHandle::new(blas)?;
        debug!(ordinal, "opened HIP backend");
        Ok(Self { hip, blas })
    }
}

fn check_numel(what: &str, buffer: &DeviceBuffer, expected: usize) -> Result<()> {
    let got = buffer.shape().numel();
    if got != expected {
        return Err(TensorError::Other(format!(
            "matmul: {what} has {got} elements but expected {expected}"
        )));
    }
    Ok(())
}

impl ComputeBackend for HipBackend {
    type Buffer = DeviceBuffer;

    fn name(&self) -> &str {
        "hip"
    }

    fn upload(&self, tensor: &Tensor) -> Result<DeviceBuffer> {
        Ok(DeviceBuffer::from_host(self.hip.clone(), tensor)?)
    }

    fn alloc(&self, shape: &Shape, dtype: DType) -> Result<DeviceBuffer> {
        Ok(DeviceBuffer::alloc(self.hip.clone(), shape.clone(), dtype)?)
    }

    fn matmul(
        &self,
        a: &DeviceBuffer,
        b: &DeviceBuffer,
        out: &mut DeviceBuffer,
        m: usize,
        k: usize,
        n: usize,
    ) -> Result<()> {
        for dtype in [b.dtype(), out.dtype()] {
            if dtype != a.dtype() {
                return Err(TensorError::DTypeMismatch {
                    expected: a.dtype().to_string(),
                    got: dtype.to_string(),
                });
            }
        }
        check_numel("a", a, m * k)?;
        check_numel("b", b, k * n)?;
        check_numel("out", out, m * n)?;

        Ok(self.blas.gemm(a, b, out, m, k, n)?)
    }

    fn download(&self, buffer: &DeviceBuffer) -> Result<Tensor> {
        Ok(buffer.to_host()?)
    }

    fn synchronize(&self) -> Result<()> {
        // SAFETY: no arguments.
        let status = unsafe { (self.hip.device_synchronize)() };
        Ok(self.hip.check("hipDeviceSynchronize", status)?)
    }
}
