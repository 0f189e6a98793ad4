use rc_tensor::TensorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HipError {
    #[error("{library} library not found (searched: {}): {reason}", .searched.join(", "))]
    LibraryNotFound {
        library: String,
        searched: Vec<String>,
        reason: String,
    },
    #[error("symbol `{symbol}` missing from {library}")]
    MissingSymbol {
        library: String,
        symbol: String,
        #[source]
        source: libloading::Error,
    },
    #[error("{call} failed: {message} (hipError_t {code})")]
    Api {
        call: &'static str,
        code: i32,
        message: String,
    },
    #[error("{call} failed: {name} (rocblas_status {status})")]
    Blas {
        call: &'static str,
        status: i32,
        name: &'static str,
    },
    #[error("invalid device ordinal {ordinal}: {count} device(s) available")]
    InvalidDevice { ordinal: usize, count: usize },
    #[error("dimension {value} of {what} exceeds the rocBLAS integer range")]
    DimensionOverflow { what: &'static str, value: usize },
    #[error("tensor error: {0}")]
    Tensor(#[from] TensorError),
}

impl HipError {
    /// True when a ROCm shared library could not be opened at all.
    pub fn is_library_missing(&self) -> bool {
        matches!(self, HipError::LibraryNotFound { .. })
    }
}

impl From<HipError> for TensorError {
    fn from(err: HipError) -> Self {
        match err {
            HipError::Tensor(inner) => inner,
            other => TensorError::Backend {
                backend: "hip".to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Symbolic name of a `rocblas_status` code.
pub fn blas_status_name(status: i32) -> &'static str {
    match status {
        0 => "rocblas_status_success",
        1 => "rocblas_status_invalid_handle",
        2 => "rocblas_status_not_implemented",
        3 => "rocblas_status_invalid_pointer",
        4 => "rocblas_status_invalid_size",
        5 => "rocblas_status_memory_error",
        6 => "rocblas_status_internal_error",
        7 => "rocblas_status_perf_degraded",
        8 => "rocblas_status_size_query_mismatch",
        9 => "rocblas_status_size_increased",
        10 => "rocblas_status_size_unchanged",
        11 => "rocblas_status_invalid_value",
        12 => "rocblas_status_continue",
        13 => "rocblas_status_check_numerics_fail",
        _ => "unknown rocblas status",
    }
}

pub type HipResult<T> = std::result::Result<T, HipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_not_found_message() {
        let err = HipError::LibraryNotFound {
            library: "HIP runtime".to_string(),
            searched: vec!["/opt/rocm/lib/libamdhip64.so".into(), "libamdhip64.so".into()],
            reason: "cannot open shared object file".to_string(),
        };
        assert!(err.is_library_missing());
        assert_eq!(
            err.to_string(),
            "HIP runtime library not found (searched: /opt/rocm/lib/libamdhip64.so, \
             libamdhip64.so): cannot open shared object file"
        );
    }

    #[test]
    fn test_blas_message() {
        let err = HipError::Blas {
            call: "rocblas_sgemm",
            status: 4,
            name: blas_status_name(4),
        };
        assert!(!err.is_library_missing());
        assert_eq!(
            err.to_string(),
            "rocblas_sgemm failed: rocblas_status_invalid_size (rocblas_status 4)"
        );
        assert_eq!(blas_status_name(99), "unknown rocblas status");
    }

    #[test]
    fn test_into_tensor_error() {
        let err: TensorError = HipError::InvalidDevice {
            ordinal: 3,
            count: 1,
        }
        .into();
        match err {
            TensorError::Backend { backend, message } => {
                assert_eq!(backend, "hip");
                assert_eq!(message, "invalid device ordinal 3: 1 device(s) available");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let inner: TensorError = HipError::Tensor(TensorError::Other("x".into())).into();
        assert!(matches!(inner, TensorError::Other(_)));
    }
}
