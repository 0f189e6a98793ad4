use std::ops::Range;

use rand::Rng;
use rand_distr::StandardNormal;

use crate::dtype::DType;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// A host-resident tensor.
///
/// Holds contiguous, row-major data with an associated shape. The dtype is
/// that of the storage. Device computation goes through a
/// `ComputeBackend`, which uploads tensors into its own buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    storage: CpuStorage,
    shape: Shape,
}

impl Tensor {
    /// Create a new f32 tensor from data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {:?} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Tensor {
            storage: CpuStorage::from_f32_vec(data),
            shape,
        }
    }

    /// Wrap existing storage, checking that it holds `shape.numel()` elements.
    pub fn from_storage(storage: CpuStorage, shape: Shape) -> Result<Self> {
        if storage.len() != shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: shape.dims().to_vec(),
                got: vec![storage.len()],
            });
        }
        Ok(Tensor { storage, shape })
    }

    /// Create a zero-filled tensor with the given shape and dtype.
    pub fn zeros(shape: Shape, dtype: DType) -> Self {
        let n = shape.numel();
        Tensor {
            storage: CpuStorage::zeros(dtype, n),
            shape,
        }
    }

    /// Create a tensor with elements drawn from the standard normal
    /// distribution N(0, 1).
    pub fn randn<R: Rng + ?Sized>(shape: Shape, dtype: DType, rng: &mut R) -> Self {
        let data: Vec<f32> = (0..shape.numel())
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();
        Tensor {
            storage: CpuStorage::from_f32_as(data, dtype),
            shape,
        }
    }

    /// Returns a reference to the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the tensor's data type.
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Returns the underlying storage reference.
    pub fn storage(&self) -> &CpuStorage {
        &self.storage
    }

    /// Copies the elements out as f32.
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.storage.to_f32_vec()
    }

    /// Copies the leading-dimension slice `rows` of a 2-D tensor.
    pub fn rows(&self, rows: Range<usize>) -> Result<Tensor> {
        if self.shape.ndim() != 2 {
            return Err(TensorError::Other(format!(
                "rows requires a 2D tensor, got shape {}",
                self.shape
            )));
        }
        let (n_rows, n_cols) = (self.shape.dim(0), self.shape.dim(1));
        if rows.start > rows.end || rows.end > n_rows {
            return Err(TensorError::Other(format!(
                "row range {}..{} out of bounds for {} rows",
                rows.start, rows.end, n_rows
            )));
        }
        Ok(Tensor {
            storage: self.storage.slice(rows.start * n_cols..rows.end * n_cols),
            shape: Shape::matrix(rows.len(), n_cols),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_tensor() {
        let t = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], Shape::new(vec![2, 3]));
        assert_eq!(t.shape().ndim(), 2);
        assert_eq!(t.shape().dim(0), 2);
        assert_eq!(t.shape().dim(1), 3);
        assert_eq!(t.dtype(), DType::F32);
        assert_eq!(t.to_f32_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic]
    fn test_new_shape_mismatch_panics() {
        let _t = Tensor::new(vec![1.0, 2.0], Shape::new(vec![3]));
    }

    #[test]
    fn test_from_storage_mismatch() {
        let s = CpuStorage::from_f32_vec(vec![1.0, 2.0]);
        assert!(Tensor::from_storage(s, Shape::matrix(2, 2)).is_err());
    }

    #[test]
    fn test_zeros() {
        let z = Tensor::zeros(Shape::new(vec![2, 3]), DType::F16);
        assert_eq!(z.dtype(), DType::F16);
        assert_eq!(z.to_f32_vec(), vec![0.0; 6]);
    }

    #[test]
    fn test_randn_is_seeded_and_roughly_standard() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Tensor::randn(Shape::matrix(64, 64), DType::F32, &mut rng);
        let mut rng = StdRng::seed_from_u64(7);
        let b = Tensor::randn(Shape::matrix(64, 64), DType::F32, &mut rng);
        assert_eq!(a, b);

        let data = a.to_f32_vec();
        let n = data.len() as f32;
        let mean = data.iter().sum::<f32>() / n;
        let var = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n;
        assert!(mean.abs() < 0.1, "mean = {mean}");
        assert!((var - 1.0).abs() < 0.1, "var = {var}");
    }

    #[test]
    fn test_randn_f16() {
        let mut rng = StdRng::seed_from_u64(11);
        let h = Tensor::randn(Shape::matrix(4, 4), DType::F16, &mut rng);
        assert_eq!(h.dtype(), DType::F16);
        assert_eq!(h.to_f32_vec().len(), 16);
    }

    #[test]
    fn test_rows() {
        let t = Tensor::new((0..12).map(|x| x as f32).collect(), Shape::matrix(4, 3));
        let r = t.rows(1..3).unwrap();
        assert_eq!(r.shape().dims(), &[2, 3]);
        assert_eq!(r.to_f32_vec(), vec![3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert!(t.rows(2..5).is_err());
    }
}
