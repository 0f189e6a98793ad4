//! `rc-tensor` - Host tensors and pluggable compute backends for rocm-check.
//!
//! This crate provides:
//! - A host-side `Tensor` type (F32 or F16 storage)
//! - A `ComputeBackend` trait for device compute (HIP, CPU reference)
//! - A `Platform` trait for runtime and device discovery
//! - A reference `CpuBackend` implementation
//! - Shape and data type definitions

pub mod backend;
pub mod cpu;
pub mod device;
pub mod dtype;
pub mod error;
pub mod shape;
pub mod storage;
pub mod tensor;

// Re-export primary types at the crate root for convenience.
pub use backend::ComputeBackend;
pub use cpu::CpuBackend;
pub use device::{DeviceInfo, Platform, RuntimeInfo};
pub use dtype::DType;
pub use error::{Result, TensorError};
pub use shape::Shape;
pub use storage::CpuStorage;
pub use tensor::Tensor;
