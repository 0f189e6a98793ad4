//! `rc-hip` - ROCm backend for rocm-check.
//!
//! The HIP runtime (`libamdhip64`) and rocBLAS (`librocblas`) are opened
//! with `libloading` at runtime, so the crate builds without a ROCm
//! install and a missing install is reported as an ordinary error.
//!
//! - `HipRuntime` implements `Platform`: version and device queries
//! - `HipBackend` implements `ComputeBackend`: device buffers and GEMM

pub mod backend;
pub mod blas;
pub mod error;
pub mod ffi;
pub mod loader;
pub mod memory;
pub mod runtime;

pub use backend::HipBackend;
pub use error::{HipError, HipResult};
pub use loader::{LibrarySpec, RocmPaths, HIP_RUNTIME, ROCBLAS};
pub use memory::DeviceBuffer;
pub use runtime::HipRuntime;
