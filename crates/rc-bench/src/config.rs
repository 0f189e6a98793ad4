use rc_tensor::DType;

use crate::error::{BenchError, Result};

/// Benchmark parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Side length of the square matrices.
    pub size: usize,
    /// Timed multiplications.
    pub iterations: usize,
    /// Untimed multiplications run before timing starts.
    pub warmup: usize,
    pub dtype: DType,
    /// RNG seed for the input matrices; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Leading result rows to check against the CPU reference. 0 disables.
    pub verify_rows: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            size: 2048,
            iterations: 100,
            warmup: 1,
            dtype: DType::F32,
            seed: None,
            verify_rows: 0,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(BenchError::InvalidConfig("size must be > 0".to_string()));
        }
        if self.iterations == 0 {
            return Err(BenchError::InvalidConfig(
                "iterations must be > 0".to_string(),
            ));
        }
        // rocBLAS takes dimensions as 32-bit signed integers
        if self.size > i32::MAX as usize {
            return Err(BenchError::InvalidConfig(format!(
                "size {} exceeds the maximum of {}",
                self.size,
                i32::MAX
            )));
        }
        self.matrix_bytes()?;
        Ok(())
    }

    /// Bytes needed for one `size x size` matrix of `dtype`.
    pub fn matrix_bytes(&self) -> Result<usize> {
        self.size
            .checked_mul(self.size)
            .and_then(|n| n.checked_mul(self.dtype.size_in_bytes()))
            .filter(|&bytes| bytes <= isize::MAX as usize)
            .ok_or_else(|| {
                BenchError::InvalidConfig(format!(
                    "a {0}x{0} {1} matrix does not fit in memory",
                    self.size, self.dtype
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = BenchConfig::default();
        assert_eq!(c.size, 2048);
        assert_eq!(c.iterations, 100);
        assert_eq!(c.warmup, 1);
        assert_eq!(c.dtype, DType::F32);
        assert_eq!(c.verify_rows, 0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let c = BenchConfig {
            size: 0,
            ..BenchConfig::default()
        };
        assert!(c.validate().is_err());

        let c = BenchConfig {
            iterations: 0,
            ..BenchConfig::default()
        };
        assert_eq!(
            c.validate().unwrap_err().to_string(),
            "invalid benchmark configuration: iterations must be > 0"
        );

        // no warm-up is allowed
        let c = BenchConfig {
            warmup: 0,
            ..BenchConfig::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_size_beyond_blas_range() {
        let c = BenchConfig {
            size: 1 << 31,
            iterations: 1,
            ..BenchConfig::default()
        };
        let err = c.validate().unwrap_err();
        assert!(matches!(err, BenchError::InvalidConfig(_)));
        assert!(err.to_string().contains("exceeds the maximum"));

        let c = BenchConfig {
            size: i32::MAX as usize,
            ..BenchConfig::default()
        };
        // within the rocBLAS range, but the matrix byte count is checked too
        if cfg!(target_pointer_width = "64") {
            assert!(c.validate().is_err());
        }
    }

    #[test]
    fn test_matrix_bytes() {
        let c = BenchConfig::default();
        assert_eq!(c.matrix_bytes().unwrap(), 2048 * 2048 * 4);

        let c = BenchConfig {
            size: usize::MAX,
            ..BenchConfig::default()
        };
        assert!(c.matrix_bytes().is_err());
    }
}
