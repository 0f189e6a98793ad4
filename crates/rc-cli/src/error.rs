use std::io;

use rc_bench::BenchError;
use rc_hip::HipError;
use rc_tensor::TensorError;
use thiserror::Error;

/// Exit code for a passed check.
pub const EXIT_OK: u8 = 0;
/// Exit code for a diagnosed failure: runtime missing, no device, or a
/// wrong GEMM result.
pub const EXIT_CHECK_FAILED: u8 = 1;
/// Exit code for anything the check does not diagnose.
pub const EXIT_UNEXPECTED: u8 = 2;

/// Failures that abort the check before it reaches a verdict.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Hip(#[from] HipError),
    #[error(transparent)]
    Tensor(#[from] TensorError),
    #[error(transparent)]
    Bench(#[from] BenchError),
}

/// How a completed check ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    RuntimeMissing,
    NoDevice,
    VerificationFailed,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Passed => EXIT_OK,
            Outcome::RuntimeMissing | Outcome::NoDevice | Outcome::VerificationFailed => {
                EXIT_CHECK_FAILED
            }
        }
    }
}

pub fn exit_code_for_error(_err: &CheckError) -> u8 {
    EXIT_UNEXPECTED
}
