//! The check procedure: acquire the runtime, describe the device, run the
//! benchmark, and print a human-readable report.

use std::io::Write;

use rc_bench::{run_matmul, BenchConfig, BenchReport};
use rc_hip::HipResult;
use rc_tensor::{Platform, RuntimeInfo};
use tracing::{info, warn};

use crate::error::{CheckError, Outcome};

pub const INSTALL_HINT: &str = "Install with:  sudo apt install rocm-hip-runtime rocblas  \
     (or set ROCM_PATH to an existing ROCm installation)";

pub const NO_DEVICE_MESSAGE: &str = "No GPU detected by the HIP runtime. Check ROCm setup.";

/// What to run once the runtime is up.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Device ordinal to benchmark.
    pub device: usize,
    pub bench: BenchConfig,
}

fn or_na(v: Option<&str>) -> &str {
    v.unwrap_or("N/A")
}

fn write_runtime_info<W: Write>(out: &mut W, rt: &RuntimeInfo) -> std::io::Result<()> {
    writeln!(out, "HIP runtime     : {}", or_na(rt.runtime_version.as_deref()))?;
    writeln!(out, "HIP driver      : {}", or_na(rt.driver_version.as_deref()))?;
    writeln!(out, "rocBLAS version : {}", or_na(rt.blas_version.as_deref()))
}

fn write_bench_report<W: Write>(out: &mut W, report: &BenchReport) -> std::io::Result<()> {
    writeln!(
        out,
        "  {} iterations in {:.3}s",
        report.iterations,
        report.elapsed.as_secs_f64()
    )?;
    writeln!(out, "  {:.1} GFLOPS ({})", report.gflops(), report.dtype.label())?;
    if let Some(v) = &report.verification {
        writeln!(
            out,
            "  verified {} rows against CPU: max relative error {:.2e} (tolerance {:.0e})",
            v.rows, v.max_rel_error, v.tolerance
        )?;
    }
    Ok(())
}

/// Runs the check against an acquired (or failed-to-acquire) platform,
/// writing the report to `out`.
///
/// A missing runtime library and an absent device are diagnosed outcomes.
/// Any other failure is returned as an error.
pub fn run<P, W>(acquired: HipResult<P>, opts: &CheckOptions, out: &mut W) -> Result<Outcome, CheckError>
where
    P: Platform,
    W: Write,
{
    let platform = match acquired {
        Ok(platform) => platform,
        Err(err) if err.is_library_missing() => {
            info!(error = %err, "ROCm runtime not available");
            writeln!(out, "ROCm runtime libraries are not installed.")?;
            writeln!(out, "  ({err})")?;
            writeln!(out, "{INSTALL_HINT}")?;
            return Ok(Outcome::RuntimeMissing);
        }
        Err(err) => return Err(err.into()),
    };

    write_runtime_info(out, &platform.runtime_info())?;

    let count = platform.device_count().unwrap_or_else(|err| {
        warn!(error = %err, "device query failed, treating as no device");
        0
    });
    writeln!(out, "GPU available   : {}", count > 0)?;
    writeln!(out, "Device count    : {count}")?;

    if count == 0 {
        writeln!(out)?;
        writeln!(out, "{NO_DEVICE_MESSAGE}")?;
        return Ok(Outcome::NoDevice);
    }

    let device = platform.device_info(opts.device)?;
    writeln!(out, "Device name     : {}", device.name)?;
    writeln!(out, "Device memory   : {:.1} GB", device.total_memory_gb())?;

    let n = opts.bench.size;
    writeln!(out)?;
    writeln!(out, "Running matrix multiplication test ({n}x{n})...")?;
    out.flush()?;

    let backend = platform.open(opts.device)?;
    let report = run_matmul(&backend, &opts.bench)?;
    write_bench_report(out, &report)?;

    writeln!(out)?;
    if report.passed() {
        writeln!(out, "GPU compute test PASSED.")?;
        Ok(Outcome::Passed)
    } else {
        writeln!(out, "GPU compute test FAILED.")?;
        Ok(Outcome::VerificationFailed)
    }
}
