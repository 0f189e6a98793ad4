use std::ffi::{c_char, c_int};
use std::sync::Arc;

use rc_tensor::{DeviceInfo, Platform, RuntimeInfo};
use tracing::{debug, info};

use crate::backend::HipBackend;
use crate::error::{HipError, HipResult};
use crate::ffi::{
    c_buffer_to_string, decode_hip_version, HipApi, HipStatus, RocblasApi, HIP_ERROR_NO_DEVICE,
    HIP_SUCCESS,
};
use crate::loader::RocmPaths;

const DEVICE_NAME_LEN: usize = 256;

/// The loaded ROCm runtime: HIP plus rocBLAS.
///
/// Loading succeeds whenever both libraries open and export the expected
/// symbols, even on a machine without a GPU. Device availability is a
/// separate question answered by `device_count`.
#[derive(Debug, Clone)]
pub struct HipRuntime {
    hip: Arc<HipApi>,
    blas: Arc<RocblasApi>,
    init_status: HipStatus,
}

impl HipRuntime {
    /// Opens the HIP runtime and rocBLAS under `paths` and calls `hipInit`.
    pub fn load(paths: &RocmPaths) -> HipResult<Self> {
        let hip = HipApi::load(paths)?;
        let blas = RocblasApi::load(paths)?;
        info!(
            hip = %hip.path().display(),
            rocblas = %blas.path().display(),
            "ROCm libraries loaded"
        );

        // SAFETY: hipInit takes flags by value; 0 is the only defined value.
        let init_status = unsafe { (hip.init)(0) };
        if init_status != HIP_SUCCESS {
            debug!(
                code = init_status,
                error = %hip.error_string(init_status),
                "hipInit failed, no devices will be reported"
            );
        }

        Ok(Self {
            hip: Arc::new(hip),
            blas: Arc::new(blas),
            init_status,
        })
    }

    fn read_version(&self, f: unsafe extern "C" fn(*mut c_int) -> HipStatus) -> Option<String> {
        let mut packed: c_int = 0;
        // SAFETY: `packed` is a valid out-parameter.
        let status = unsafe { f(&mut packed) };
        if status != HIP_SUCCESS {
            return None;
        }
        decode_hip_version(packed)
    }

    /// Number of visible devices. A failed `hipInit` and `hipErrorNoDevice`
    /// both count as zero.
    pub fn visible_devices(&self) -> HipResult<usize> {
        if self.init_status != HIP_SUCCESS {
            return Ok(0);
        }
        let mut count: c_int = 0;
        // SAFETY: `count` is a valid out-parameter.
        let status = unsafe { (self.hip.get_device_count)(&mut count) };
        if status == HIP_ERROR_NO_DEVICE {
            debug!("hipGetDeviceCount reported no device");
            return Ok(0);
        }
        self.hip.check("hipGetDeviceCount", status)?;
        Ok(count.max(0) as usize)
    }

    fn check_ordinal(&self, ordinal: usize) -> HipResult<()> {
        let count = self.visible_devices()?;
        if ordinal >= count {
            return Err(HipError::InvalidDevice { ordinal, count });
        }
        Ok(())
    }

    /// Name and memory size of the device at `ordinal`.
    pub fn describe(&self, ordinal: usize) -> HipResult<DeviceInfo> {
        self.check_ordinal(ordinal)?;
        let device = ordinal as c_int;

        let mut name = vec![0u8; DEVICE_NAME_LEN];
        // SAFETY: `name` has DEVICE_NAME_LEN writable bytes.
        let status = unsafe {
            (self.hip.device_get_name)(
                name.as_mut_ptr().cast::<c_char>(),
                DEVICE_NAME_LEN as c_int,
                device,
            )
        };
        self.hip.check("hipDeviceGetName", status)?;

        let mut total_memory = 0usize;
        // SAFETY: `total_memory` is a valid out-parameter.
        let status = unsafe { (self.hip.device_total_mem)(&mut total_memory, device) };
        self.hip.check("hipDeviceTotalMem", status)?;

        Ok(DeviceInfo {
            ordinal,
            name: c_buffer_to_string(&name).unwrap_or_else(|| "unknown".to_string()),
            total_memory: total_memory as u64,
        })
    }

    /// Opens a backend on the device at `ordinal`.
    pub fn backend(&self, ordinal: usize) -> HipResult<HipBackend> {
        self.check_ordinal(ordinal)?;
        HipBackend::new(self.hip.clone(), self.blas.clone(), ordinal)
    }
}

impl Platform for HipRuntime {
    type Backend = HipBackend;

    fn runtime_info(&self) -> RuntimeInfo {
        RuntimeInfo {
            runtime_version: self.read_version(self.hip.runtime_get_version),
            driver_version: self.read_version(self.hip.driver_get_version),
            blas_version: self.blas.version(),
        }
    }

    fn device_count(&self) -> rc_tensor::Result<usize> {
        Ok(self.visible_devices()?)
    }

    fn device_info(&self, ordinal: usize) -> rc_tensor::Result<DeviceInfo> {
        Ok(self.describe(ordinal)?)
    }

    fn open(&self, ordinal: usize) -> rc_tensor::Result<HipBackend> {
        Ok(self.backend(ordinal)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rc_tensor::{ComputeBackend, DType, Shape, Tensor};

    /// Needs a ROCm install and an AMD GPU.
    #[test]
    #[ignore]
    fn test_sgemm_on_device() {
        let runtime = HipRuntime::load(&RocmPaths::default()).unwrap();
        assert!(runtime.device_count().unwrap() > 0);
        let info = runtime.device_info(0).unwrap();
        assert!(info.total_memory > 0);

        let backend = runtime.open(0).unwrap();
        let a = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Shape::matrix(2, 3));
        let b = Tensor::new(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0], Shape::matrix(3, 2));
        let da = backend.upload(&a).unwrap();
        let db = backend.upload(&b).unwrap();
        let mut dc = backend.alloc(&Shape::matrix(2, 2), DType::F32).unwrap();
        backend.matmul(&da, &db, &mut dc, 2, 3, 2).unwrap();
        backend.synchronize().unwrap();
        let c = backend.download(&dc).unwrap();
        assert_eq!(c.to_f32_vec(), vec![4.0, 5.0, 10.0, 11.0]);
    }
}
