//! Dense row-major storage for tensor data.
//!
//! Storage is either real (`f64`) or complex (`Complex64`). Binary operations
//! on mixed storage promote to complex. The last axis varies fastest.

use crate::any_scalar::AnyScalar;
use faer::Mat;
use faer_traits::ComplexField;
use num_complex::Complex64;

/// Storage backend for tensor data.
#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    /// Dense real storage.
    DenseF64(Vec<f64>),
    /// Dense complex storage.
    DenseC64(Vec<Complex64>),
}

/// Row-major strides for `dims`.
pub fn row_major_strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }
    strides
}

/// Decompose a linear offset into a multi-index for row-major `dims`.
pub fn unravel_index(mut offset: usize, dims: &[usize]) -> Vec<usize> {
    let mut multi = vec![0usize; dims.len()];
    for (axis, &d) in dims.iter().enumerate().rev() {
        multi[axis] = offset % d;
        offset /= d;
    }
    multi
}

impl Storage {
    /// Build storage from dynamic scalars.
    ///
    /// The result is real when every value is real, complex otherwise.
    pub fn from_scalars(values: Vec<AnyScalar>) -> Self {
        if values.iter().any(AnyScalar::is_complex) {
            Self::DenseC64(values.into_iter().map(Complex64::from).collect())
        } else {
            Self::DenseF64(values.into_iter().map(|v| v.real()).collect())
        }
    }

    /// Zero-filled real storage of the given length.
    pub fn zeros_f64(len: usize) -> Self {
        Self::DenseF64(vec![0.0; len])
    }

    /// Get the length of the storage (number of elements).
    pub fn len(&self) -> usize {
        match self {
            Self::DenseF64(v) => v.len(),
            Self::DenseC64(v) => v.len(),
        }
    }

    /// Check if the storage is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the storage holds complex values.
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::DenseC64(_))
    }

    /// Element at a linear offset.
    pub fn get(&self, offset: usize) -> AnyScalar {
        match self {
            Self::DenseF64(v) => AnyScalar::F64(v[offset]),
            Self::DenseC64(v) => AnyScalar::C64(v[offset]),
        }
    }

    /// Promote to complex storage (no-op if already complex).
    pub fn to_complex(&self) -> Self {
        match self {
            Self::DenseF64(v) => {
                Self::DenseC64(v.iter().map(|&x| Complex64::new(x, 0.0)).collect())
            }
            Self::DenseC64(v) => Self::DenseC64(v.clone()),
        }
    }

    /// Copy out as complex values.
    pub fn to_c64_vec(&self) -> Vec<Complex64> {
        match self {
            Self::DenseF64(v) => v.iter().map(|&x| Complex64::new(x, 0.0)).collect(),
            Self::DenseC64(v) => v.clone(),
        }
    }

    /// Gather elements according to `offsets`.
    pub fn gather(&self, offsets: &[usize]) -> Self {
        match self {
            Self::DenseF64(v) => Self::DenseF64(offsets.iter().map(|&o| v[o]).collect()),
            Self::DenseC64(v) => Self::DenseC64(offsets.iter().map(|&o| v[o]).collect()),
        }
    }

    /// Permute axes: axis `i` of the result is axis `perm[i]` of `self`.
    pub fn permute(&self, dims: &[usize], perm: &[usize]) -> Self {
        if perm.iter().enumerate().all(|(i, &p)| i == p) {
            return self.clone();
        }
        let strides = row_major_strides(dims);
        let new_dims: Vec<usize> = perm.iter().map(|&p| dims[p]).collect();
        let new_strides: Vec<usize> = perm.iter().map(|&p| strides[p]).collect();
        let total: usize = dims.iter().product();
        let offsets: Vec<usize> = (0..total)
            .map(|lin| {
                unravel_index(lin, &new_dims)
                    .iter()
                    .zip(&new_strides)
                    .map(|(i, s)| i * s)
                    .sum()
            })
            .collect();
        self.gather(&offsets)
    }

    /// Multiply every element by `scalar`.
    pub fn scale(&self, scalar: AnyScalar) -> Self {
        match (self, scalar) {
            (Self::DenseF64(v), AnyScalar::F64(s)) => {
                Self::DenseF64(v.iter().map(|x| x * s).collect())
            }
            (Self::DenseF64(v), AnyScalar::C64(s)) => {
                Self::DenseC64(v.iter().map(|&x| s * x).collect())
            }
            (Self::DenseC64(v), s) => {
                let s = s.to_c64();
                Self::DenseC64(v.iter().map(|&x| x * s).collect())
            }
        }
    }

    /// Elementwise sum with storage of identical layout.
    pub fn add(&self, other: &Self) -> Self {
        assert_eq!(self.len(), other.len(), "storage lengths must match");
        match (self, other) {
            (Self::DenseF64(a), Self::DenseF64(b)) => {
                Self::DenseF64(a.iter().zip(b).map(|(x, y)| x + y).collect())
            }
            _ => {
                let a = self.to_c64_vec();
                let b = other.to_c64_vec();
                Self::DenseC64(a.iter().zip(&b).map(|(x, y)| x + y).collect())
            }
        }
    }

    /// Complex conjugate.
    pub fn conj(&self) -> Self {
        match self {
            Self::DenseF64(v) => Self::DenseF64(v.clone()),
            Self::DenseC64(v) => Self::DenseC64(v.iter().map(|z| z.conj()).collect()),
        }
    }

    /// Sum of squared magnitudes.
    pub fn norm_squared(&self) -> f64 {
        match self {
            Self::DenseF64(v) => v.iter().map(|x| x * x).sum(),
            Self::DenseC64(v) => v.iter().map(|z| z.norm_sqr()).sum(),
        }
    }
}

/// Matrix product `C[m, n] = A[m, k] B[k, n]` of row-major storages.
///
/// Real inputs stay real. Any complex input promotes both operands.
pub fn matmul_storage(a: &Storage, b: &Storage, m: usize, k: usize, n: usize) -> Storage {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);
    match (a, b) {
        (Storage::DenseF64(a), Storage::DenseF64(b)) => {
            Storage::DenseF64(matmul_dense(a, b, m, k, n))
        }
        _ => Storage::DenseC64(matmul_dense(&a.to_c64_vec(), &b.to_c64_vec(), m, k, n)),
    }
}

fn matmul_dense<T>(a: &[T], b: &[T], m: usize, k: usize, n: usize) -> Vec<T>
where
    T: ComplexField + Copy,
{
    let a_mat = Mat::<T>::from_fn(m, k, |i, l| a[i * k + l]);
    let b_mat = Mat::<T>::from_fn(k, n, |l, j| b[l * n + j]);
    let c_mat = &a_mat * &b_mat;
    let mut c = Vec::with_capacity(m * n);
    for i in 0..m {
        for j in 0..n {
            c.push(c_mat[(i, j)]);
        }
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides_and_unravel() {
        assert_eq!(row_major_strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(unravel_index(17, &[2, 3, 4]), vec![1, 1, 1]);
        assert!(row_major_strides(&[]).is_empty());
    }

    #[test]
    fn test_permute_transpose() {
        // [[0, 1, 2], [3, 4, 5]] -> transpose
        let s = Storage::DenseF64((0..6).map(f64::from).collect());
        let t = s.permute(&[2, 3], &[1, 0]);
        assert_eq!(t, Storage::DenseF64(vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]));
    }

    #[test]
    fn test_from_scalars_demotes_real() {
        let s = Storage::from_scalars(vec![AnyScalar::new_real(1.0), AnyScalar::new_real(2.0)]);
        assert!(!s.is_complex());
        let c = Storage::from_scalars(vec![
            AnyScalar::new_real(1.0),
            AnyScalar::new_complex(0.0, 1.0),
        ]);

        assert!(c.is_complex());
    }

    #[test]
    fn test_matmul_mixed_promotes() {
        let a = Storage::DenseF64(vec![1.0, 2.0, 3.0, 4.0]);
        let b = Storage::DenseC64(vec![Complex64::new(0.0, 1.0), Complex64::new(1.0, 0.0)]);
        let c = matmul_storage(&a, &b, 2, 2, 1);
        assert_eq!(
            c,
            Storage::DenseC64(vec![Complex64::new(2.0, 1.0), Complex64::new(4.0, 3.0)])
        );
    }

    #[test]
    fn test_matmul_real() {
        let a = Storage::DenseF64(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = Storage::DenseF64(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let c = matmul_storage(&a, &b, 2, 3, 2);
        assert_eq!(c, Storage::DenseF64(vec![4.0, 5.0, 10.0, 11.0]));
    }
}
