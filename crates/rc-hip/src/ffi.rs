//! Raw HIP and rocBLAS entry points, resolved from runtime-loaded libraries.
//!
//! Only the stable, unversioned C symbols are used. Device properties are
//! read through `hipDeviceGetName`/`hipDeviceTotalMem` rather than
//! `hipDeviceProp_t`, whose layout changes between ROCm releases.

use std::ffi::{c_char, c_int, c_uint, c_void, CStr};
use std::fmt;
use std::path::{Path, PathBuf};

use half::f16;
use libloading::Library;

use crate::error::{blas_status_name, HipError, HipResult};
use crate::loader::{RocmPaths, HIP_RUNTIME, ROCBLAS};

pub type HipStatus = c_int;
pub type RocblasStatus = c_int;
pub type RocblasHandle = *mut c_void;

pub const HIP_SUCCESS: HipStatus = 0;
pub const HIP_ERROR_NO_DEVICE: HipStatus = 100;

pub const HIP_MEMCPY_HOST_TO_DEVICE: c_int = 1;
pub const HIP_MEMCPY_DEVICE_TO_HOST: c_int = 2;

pub const ROCBLAS_STATUS_SUCCESS: RocblasStatus = 0;
pub const ROCBLAS_OPERATION_NONE: c_int = 111;

type GemmFn<T> = unsafe extern "C" fn(
    RocblasHandle,
    c_int,
    c_int,
    c_int,
    c_int,
    c_int,
    *const T,
    *const T,
    c_int,
    *const T,
    c_int,
    *const T,
    *mut T,
    c_int,
) -> RocblasStatus;

/// Copies a resolved function pointer out of `lib`.
///
/// # Safety
/// `T` must be the exact function pointer type of the symbol `name`.
unsafe fn symbol<T: Copy>(lib: &Library, library: &str, name: &str) -> HipResult<T> {
    let sym = lib
        .get::<T>(name.as_bytes())
        .map_err(|source| HipError::MissingSymbol {
            library: library.to_string(),
            symbol: name.to_string(),
            source,
        })?;
    Ok(*sym)
}

/// HIP runtime function table. The library stays open for as long as the
/// table lives, which keeps every pointer in it valid.
pub struct HipApi {
    pub init: unsafe extern "C" fn(c_uint) -> HipStatus,
    pub get_device_count: unsafe extern "C" fn(*mut c_int) -> HipStatus,
    pub set_device: unsafe extern "C" fn(c_int) -> HipStatus,
    pub device_get_name: unsafe extern "C" fn(*mut c_char, c_int, c_int) -> HipStatus,
    pub device_total_mem: unsafe extern "C" fn(*mut usize, c_int) -> HipStatus,
    pub runtime_get_version: unsafe extern "C" fn(*mut c_int) -> HipStatus,
    pub driver_get_version: unsafe extern "C" fn(*mut c_int) -> HipStatus,
    pub malloc: unsafe extern "C" fn(*mut *mut c_void, usize) -> HipStatus,
    pub free: unsafe extern "C" fn(*mut c_void) -> HipStatus,
    pub memcpy: unsafe extern "C" fn(*mut c_void, *const c_void, usize, c_int) -> HipStatus,
    pub device_synchronize: unsafe extern "C" fn() -> HipStatus,
    pub get_error_string: unsafe extern "C" fn(HipStatus) -> *const c_char,
    path: PathBuf,
    _lib: Library,
}

impl HipApi {
    pub fn load(paths: &RocmPaths) -> HipResult<Self> {
        let (lib, path) = paths.open(&HIP_RUNTIME)?;
        let name = HIP_RUNTIME.name;
        // SAFETY: signatures match hip_runtime_api.h.
        unsafe {
            Ok(Self {
                init: symbol(&lib, name, "hipInit")?,
                get_device_count: symbol(&lib, name, "hipGetDeviceCount")?,
                set_device: symbol(&lib, name, "hipSetDevice")?,
                device_get_name: symbol(&lib, name, "hipDeviceGetName")?,
                device_total_mem: symbol(&lib, name, "hipDeviceTotalMem")?,
                runtime_get_version: symbol(&lib, name, "hipRuntimeGetVersion")?,
                driver_get_version: symbol(&lib, name, "hipDriverGetVersion")?,
                malloc: symbol(&lib, name, "hipMalloc")?,
                free: symbol(&lib, name, "hipFree")?,
                memcpy: symbol(&lib, name, "hipMemcpy")?,
                device_synchronize: symbol(&lib, name, "hipDeviceSynchronize")?,
                get_error_string: symbol(&lib, name, "hipGetErrorString")?,
                path,
                _lib: lib,
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Human-readable text for a HIP status code.
    pub fn error_string(&self, status: HipStatus) -> String {
        // SAFETY: hipGetErrorString returns a static NUL-terminated string
        // (or null for codes it does not know).
        unsafe {
            let msg = (self.get_error_string)(status);
            if msg.is_null() {
                return "unknown HIP error".to_string();
            }
            CStr::from_ptr(msg).to_string_lossy().into_owned()
        }
    }

    /// Maps a HIP status to `Ok(())` or `HipError::Api`.
    pub fn check(&self, call: &'static str, status: HipStatus) -> HipResult<()> {
        if status == HIP_SUCCESS {
            Ok(())
        } else {
            Err(HipError::Api {
                call,
                code: status,
                message: self.error_string(status),
            })
        }
    }
}

impl fmt::Debug for HipApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HipApi").field("path", &self.path).finish()
    }
}

/// rocBLAS function table.
pub struct RocblasApi {
    pub create_handle: unsafe extern "C" fn(*mut RocblasHandle) -> RocblasStatus,
    pub destroy_handle: unsafe extern "C" fn(RocblasHandle) -> RocblasStatus,
    pub sgemm: GemmFn<f32>,
    /// `rocblas_half` is a transparent 16-bit struct, ABI-identical to `half::f16`.
    pub hgemm: GemmFn<f16>,
    /// Absent from very old releases.
    pub get_version_string_size: Option<unsafe extern "C" fn(*mut usize) -> RocblasStatus>,
    pub get_version_string: Option<unsafe extern "C" fn(*mut c_char, usize) -> RocblasStatus>,
    path: PathBuf,
    _lib: Library,
}

impl RocblasApi {
    pub fn load(paths: &RocmPaths) -> HipResult<Self> {
        let (lib, path) = paths.open(&ROCBLAS)?;
        let name = ROCBLAS.name;
        // SAFETY: signatures match rocblas-functions.h / rocblas-auxiliary.h.
        unsafe {
            Ok(Self {
                create_handle: symbol(&lib, name, "rocblas_create_handle")?,
                destroy_handle: symbol(&lib, name, "rocblas_destroy_handle")?,
                sgemm: symbol(&lib, name, "rocblas_sgemm")?,
                hgemm: symbol(&lib, name, "rocblas_hgemm")?,
                get_version_string_size: symbol(&lib, name, "rocblas_get_version_string_size")
                    .ok(),
                get_version_string: symbol(&lib, name, "rocblas_get_version_string").ok(),
                path,
                _lib: lib,
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Maps a rocBLAS status to `Ok(())` or `HipError::Blas`.
    pub fn check(&self, call: &'static str, status: RocblasStatus) -> HipResult<()> {
        if status == ROCBLAS_STATUS_SUCCESS {
            Ok(())
        } else {
            Err(HipError::Blas {
                call,
                status,
                name: blas_status_name(status),
            })
        }
    }

    /// Library version, e.g. "4.4.0.3c7b1d5a".
    pub fn version(&self) -> Option<String> {
        let (size_fn, string_fn) = (self.get_version_string_size?, self.get_version_string?);
        let mut size = 0usize;
        // SAFETY: both calls only write within the provided out-parameters.
        unsafe {
            if size_fn(&mut size) != ROCBLAS_STATUS_SUCCESS || size == 0 {
                return None;
            }
            let mut buf = vec![0u8; size];
            if string_fn(buf.as_mut_ptr().cast::<c_char>(), size) != ROCBLAS_STATUS_SUCCESS {
                return None;
            }
            c_buffer_to_string(&buf)
        }
    }
}

impl fmt::Debug for RocblasApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RocblasApi").field("path", &self.path).finish()
    }
}

/// Decodes a NUL-terminated C string written into `buf`.
pub fn c_buffer_to_string(buf: &[u8]) -> Option<String> {
    let s = CStr::from_bytes_until_nul(buf).ok()?.to_string_lossy().trim().to_string();
    (!s.is_empty()).then_some(s)
}

/// Decodes HIP's packed version integer
/// (`major * 10_000_000 + minor * 100_000 + patch`).
pub fn decode_hip_version(packed: c_int) -> Option<String> {
    if packed <= 0 {
        return None;
    }
    let major = packed / 10_000_000;
    let minor = (packed / 100_000) % 100;
    let patch = packed % 100_000;
    Some(format!("{major}.{minor}.{patch}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hip_version() {
        assert_eq!(decode_hip_version(60443482).as_deref(), Some("6.4.43482"));
        assert_eq!(decode_hip_version(50731921).as_deref(), Some("5.7.31921"));
        assert_eq!(decode_hip_version(0), None);
        assert_eq!(decode_hip_version(-1), None);
    }

    #[test]
    fn test_c_buffer_to_string() {
        assert_eq!(
            c_buffer_to_string(b"AMD Radeon RX 7900 XTX\0\0\0").as_deref(),
            Some("AMD Radeon RX 7900 XTX")
        );
        assert_eq!(c_buffer_to_string(b"\0garbage"), None);
        assert_eq!(c_buffer_to_string(b"no terminator"), None);
    }
}
