use std::ffi::c_void;
use std::ptr;
use std::sync::Arc;

use half::f16;
use rc_tensor::{CpuStorage, DType, Shape, Tensor, TensorError};
use tracing::warn;

use crate::error::HipResult;
use crate::ffi::{HipApi, HIP_MEMCPY_DEVICE_TO_HOST, HIP_MEMCPY_HOST_TO_DEVICE};

/// Device memory holding one dense tensor. Freed on drop.
#[derive(Debug)]
pub struct DeviceBuffer {
    hip: Arc<HipApi>,
    ptr: *mut c_void,
    shape: Shape,
    dtype: DType,
}

impl DeviceBuffer {
    /// Allocates device memory for `shape` elements of `dtype`. Contents are
    /// undefined until written.
    pub fn alloc(hip: Arc<HipApi>, shape: Shape, dtype: DType) -> HipResult<Self> {
        let bytes = shape.numel() * dtype.size_in_bytes();
        let mut ptr = ptr::null_mut();
        // SAFETY: `ptr` is a valid out-parameter.
        let status = unsafe { (hip.malloc)(&mut ptr, bytes) };
        hip.check("hipMalloc", status)?;
        Ok(Self {
            hip,
            ptr,
            shape,
            dtype,
        })
    }

    /// Allocates a buffer and copies `tensor` into it.
    pub fn from_host(hip: Arc<HipApi>, tensor: &Tensor) -> HipResult<Self> {
        let mut buf = Self::alloc(hip, tensor.shape().clone(), tensor.dtype())?;
        buf.copy_from_host(tensor)?;
        Ok(buf)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn size_in_bytes(&self) -> usize {
        self.shape.numel() * self.dtype.size_in_bytes()
    }

    pub(crate) fn as_ptr(&self) -> *const c_void {
        self.ptr
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut c_void {
        self.ptr
    }

    /// Overwrites the buffer with `tensor`, which must match in shape and dtype.
    pub fn copy_from_host(&mut self, tensor: &Tensor) -> HipResult<()> {
        if tensor.dtype() != self.dtype {
            return Err(TensorError::DTypeMismatch {
                expected: self.dtype.to_string(),
                got: tensor.dtype().to_string(),
            }
            .into());
        }
        if tensor.shape() != &self.shape {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.dims().to_vec(),
                got: tensor.shape().dims().to_vec(),
            }
            .into());
        }
        let bytes = self.size_in_bytes();
        if bytes == 0 {
            return Ok(());
        }
        let src = match tensor.storage() {
            CpuStorage::F32(v) => v.as_ptr().cast::<c_void>(),
            CpuStorage::F16(v) => v.as_ptr().cast::<c_void>(),
        };
        // SAFETY: both regions hold `bytes` bytes; shapes and dtypes were checked above.
        let status = unsafe { (self.hip.memcpy)(self.ptr, src, bytes, HIP_MEMCPY_HOST_TO_DEVICE) };
        self.hip.check("hipMemcpy(HostToDevice)", status)
    }

    /// Copies the buffer into a new host tensor. `hipMemcpy` waits for
    /// prior work on the null stream.
    pub fn to_host(&self) -> HipResult<Tensor> {
        let n = self.shape.numel();
        let bytes = self.size_in_bytes();
        let storage = match self.dtype {
            DType::F32 => {
                let mut v = vec![0.0f32; n];
                self.copy_to(v.as_mut_ptr().cast::<c_void>(), bytes)?;
                CpuStorage::F32(v)
            }
            DType::F16 => {
                let mut v = vec![f16::ZERO; n];
                self.copy_to(v.as_mut_ptr().cast::<c_void>(), bytes)?;
                CpuStorage::F16(v)
            }
        };
        Ok(Tensor::from_storage(storage, self.shape.clone())?)
    }

    fn copy_to(&self, dst: *mut c_void, bytes: usize) -> HipResult<()> {
        if bytes == 0 {
            return Ok(());
        }
        // SAFETY: `dst` points at a host allocation of `bytes` bytes.
        let status = unsafe { (self.hip.memcpy)(dst, self.ptr, bytes, HIP_MEMCPY_DEVICE_TO_HOST) };
        self.hip.check("hipMemcpy(DeviceToHost)", status)
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        // SAFETY: `ptr` came from hipMalloc and is freed exactly once.
        let status = unsafe { (self.hip.free)(self.ptr) };
        if let Err(e) = self.hip.check("hipFree", status) {
            warn!(error = %e, "failed to free device buffer");
        }
    }
}
