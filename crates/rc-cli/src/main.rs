//! rocm-check
//!
//! Verifies that the ROCm HIP runtime and rocBLAS are installed and can
//! see a GPU, then benchmarks FP32 matrix multiplication on it.
//!
//! With no arguments: 2048x2048 matrices, 1 warm-up and 100 timed
//! multiplications on device 0.
//!
//! # Exit codes
//! - 0: runtime present, device found, benchmark completed
//! - 1: runtime missing, no device, or result verification failed
//! - 2: any other error

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rc_bench::BenchConfig;
use rc_hip::loader::DEFAULT_ROCM_ROOT;
use rc_hip::{HipRuntime, RocmPaths};
use rc_tensor::DType;
use tracing_subscriber::{fmt, EnvFilter};

mod check;
mod error;

use check::CheckOptions;
use error::exit_code_for_error;

/// Check a ROCm install and benchmark GPU matrix multiplication
#[derive(Parser, Debug)]
#[command(name = "rocm-check")]
#[command(version)]
#[command(about = "Check a ROCm install and benchmark GPU matrix multiplication")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// ROCm installation root, searched before the system library path
    #[arg(long, env = "ROCM_PATH", default_value = DEFAULT_ROCM_ROOT)]
    rocm_path: PathBuf,

    /// Device ordinal to benchmark
    #[arg(long, default_value_t = 0)]
    device: usize,

    /// Side length of the square matrices
    #[arg(long, default_value_t = 2048)]
    size: usize,

    /// Timed multiplications
    #[arg(long, default_value_t = 100)]
    iterations: usize,

    /// Untimed warm-up multiplications
    #[arg(long, default_value_t = 1)]
    warmup: usize,

    /// Element type: f32 or f16
    #[arg(long, default_value = "f32")]
    dtype: DType,

    /// Seed for the random input matrices
    #[arg(long)]
    seed: Option<u64>,

    /// Check the first ROWS rows of the result against the CPU
    #[arg(long, value_name = "ROWS", default_value_t = 0)]
    verify: usize,
}

impl Cli {
    fn check_options(&self) -> CheckOptions {
        CheckOptions {
            device: self.device,
            bench: BenchConfig {
                size: self.size,
                iterations: self.iterations,
                warmup: self.warmup,
                dtype: self.dtype,
                seed: self.seed,
                verify_rows: self.verify,
            },
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let opts = cli.check_options();
    let acquired = HipRuntime::load(&RocmPaths::new(&cli.rocm_path));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match check::run(acquired, &opts, &mut out) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            let _ = out.flush();
            eprintln!("error: {err}");
            ExitCode::from(exit_code_for_error(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_match_defaults() {
        let cli = Cli::try_parse_from(["rocm-check"]).unwrap();
        let opts = cli.check_options();
        assert_eq!(opts.device, 0);
        assert_eq!(opts.bench, BenchConfig::default());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "rocm-check",
            "-vv",
            "--rocm-path",
            "/opt/rocm-6.4.0",
            "--dtype",
            "fp16",
            "--size",
            "4096",
            "--iterations",
            "10",
            "--verify",
            "8",
            "--seed",
            "42",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.rocm_path, PathBuf::from("/opt/rocm-6.4.0"));
        let opts = cli.check_options();
        assert_eq!(opts.bench.dtype, DType::F16);
        assert_eq!(opts.bench.size, 4096);
        assert_eq!(opts.bench.iterations, 10);
        assert_eq!(opts.bench.verify_rows, 8);
        assert_eq!(opts.bench.seed, Some(42));
    }

    #[test]
    fn test_bad_dtype_rejected() {
        assert!(Cli::try_parse_from(["rocm-check", "--dtype", "bf16"]).is_err());
    }
}
