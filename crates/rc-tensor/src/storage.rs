use half::f16;

use crate::dtype::DType;

/// CPU-side tensor storage.
#[derive(Debug, Clone, PartialEq)]
pub enum CpuStorage {
    /// 32-bit floating point storage.
    F32(Vec<f32>),
    /// 16-bit floating point storage.
    F16(Vec<f16>),
}

impl CpuStorage {
    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        match self {
            CpuStorage::F32(v) => v.len(),
            CpuStorage::F16(v) => v.len(),
        }
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Create zero-filled storage for the given dtype and element count.
    pub fn zeros(dtype: DType, n: usize) -> Self {
        match dtype {
            DType::F32 => CpuStorage::F32(vec![0.0; n]),
            DType::F16 => CpuStorage::F16(vec![f16::ZERO; n]),
        }
    }

    /// Create storage from an f32 vector.
    pub fn from_f32_vec(data: Vec<f32>) -> Self {
        CpuStorage::F32(data)
    }

    /// Build storage of `dtype` from f32 values, narrowing if needed.
    pub fn from_f32_as(data: Vec<f32>, dtype: DType) -> Self {
        match dtype {
            DType::F32 => CpuStorage::F32(data),
            DType::F16 => CpuStorage::F16(data.into_iter().map(f16::from_f32).collect()),
        }
    }

    /// Copies the data out as f32, widening F16 values.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            CpuStorage::F32(v) => v.clone(),
            CpuStorage::F16(v) => v.iter().map(|x| x.to_f32()).collect(),
        }
    }

    /// Copies `range` of elements into new storage of the same dtype.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Self {
        match self {
            CpuStorage::F32(v) => CpuStorage::F32(v[range].to_vec()),
            CpuStorage::F16(v) => CpuStorage::F16(v[range].to_vec()),
        }
    }

    /// Returns the dtype of this storage.
    pub fn dtype(&self) -> DType {
        match self {
            CpuStorage::F32(_) => DType::F32,
            CpuStorage::F16(_) => DType::F16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f32_vec() {
        let s = CpuStorage::from_f32_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(s.len(), 3);
        assert!(!s.is_empty());
        assert_eq!(s.to_f32_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_zeros() {
        let s = CpuStorage::zeros(DType::F32, 5);
        assert_eq!(s.to_f32_vec(), vec![0.0; 5]);

        let h = CpuStorage::zeros(DType::F16, 4);
        assert_eq!(h.dtype(), DType::F16);
        assert_eq!(h.len(), 4);
    }

    #[test]
    fn test_narrow_to_f16() {
        let s = CpuStorage::from_f32_as(vec![0.5, -2.0, 1024.0], DType::F16);
        assert_eq!(s.dtype(), DType::F16);
        // all three values are exactly representable in half precision
        assert_eq!(s.to_f32_vec(), vec![0.5, -2.0, 1024.0]);
    }

    #[test]
    fn test_slice() {
        let s = CpuStorage::from_f32_vec(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.slice(1..3).to_f32_vec(), vec![2.0, 3.0]);
    }
}
