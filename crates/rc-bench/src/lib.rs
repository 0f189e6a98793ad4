//! `rc-bench` - Matrix-multiplication throughput benchmark for rocm-check.
//!
//! Runs a square GEMM on any `ComputeBackend`: untimed warm-up, then a
//! wall-clock-timed loop bracketed by `synchronize` calls, and reports the
//! achieved GFLOPS. Optionally checks leading rows of the result against
//! the CPU reference backend.

pub mod config;
pub mod error;
pub mod matmul;
pub mod report;
pub mod verify;

pub use config::BenchConfig;
pub use error::{BenchError, Result};
pub use matmul::run_matmul;
pub use report::BenchReport;
pub use verify::Verification;
