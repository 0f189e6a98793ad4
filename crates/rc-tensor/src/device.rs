use crate::backend::ComputeBackend;
use crate::error::Result;

/// Static description of a compute device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    /// Zero-based device ordinal as seen by the runtime.
    pub ordinal: usize,
    /// Marketing name reported by the driver.
    pub name: String,
    /// Total device memory in bytes.
    pub total_memory: u64,
}

impl DeviceInfo {
    /// Total memory in decimal gigabytes (1 GB = 1e9 bytes).
    pub fn total_memory_gb(&self) -> f64 {
        self.total_memory as f64 / 1e9
    }
}

/// Versions of the runtime components backing a platform.
///
/// Fields are `None` when the component does not expose a version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeInfo {
    pub runtime_version: Option<String>,
    pub driver_version: Option<String>,
    pub blas_version: Option<String>,
}

/// A compute platform: a loaded runtime that can enumerate devices and
/// open a backend on one of them.
pub trait Platform {
    type Backend: ComputeBackend;

    /// Versions of the runtime, driver and BLAS library.
    fn runtime_info(&self) -> RuntimeInfo;

    /// Number of usable devices. Zero means the runtime is present but
    /// found no device.
    fn device_count(&self) -> Result<usize>;

    /// Describes the device at `ordinal`.
    fn device_info(&self, ordinal: usize) -> Result<DeviceInfo>;

    /// Opens a compute backend bound to the device at `ordinal`.
    fn open(&self, ordinal: usize) -> Result<Self::Backend>;
}
