use std::fmt;
use std::str::FromStr;

use crate::error::TensorError;

/// Element types the benchmark can run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DType {
    /// 32-bit floating point.
    #[default]
    F32,
    /// 16-bit floating point (IEEE 754 half-precision, via the `half` crate).
    F16,
}

impl DType {
    /// Returns the size in bytes of a single element.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F16 => 2,
        }
    }

    /// Precision label used in throughput reports, e.g. "GFLOPS (FP32)".
    pub fn label(&self) -> &'static str {
        match self {
            DType::F32 => "FP32",
            DType::F16 => "FP16",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "f32"),
            DType::F16 => write!(f, "f16"),
        }
    }
}

impl FromStr for DType {
    type Err = TensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f32" | "fp32" | "float32" => Ok(DType::F32),
            "f16" | "fp16" | "half" | "float16" => Ok(DType::F16),
            other => Err(TensorError::UnsupportedDType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_in_bytes() {
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::F16.size_in_bytes(), 2);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("f32".parse::<DType>().unwrap(), DType::F32);
        assert_eq!("FP32".parse::<DType>().unwrap(), DType::F32);
        assert_eq!("half".parse::<DType>().unwrap(), DType::F16);
        assert_eq!("Float16".parse::<DType>().unwrap(), DType::F16);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "bf16".parse::<DType>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported dtype: bf16");
    }

    #[test]
    fn test_label_and_display() {
        assert_eq!(DType::F32.label(), "FP32");
        assert_eq!(DType::F16.label(), "FP16");
        assert_eq!(DType::default().to_string(), "f32");
    }
}
