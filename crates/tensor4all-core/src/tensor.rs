//! Dynamic-rank dense tensor with named indices.
//!
//! Data is stored row-major in index order (last index fastest). Operations
//! identify axes by [`DynIndex`] identity, never by position, so callers are
//! free to permute.

use crate::any_scalar::AnyScalar;
use crate::index::DynIndex;
use crate::storage::{matmul_storage, row_major_strides, unravel_index, Storage};
use anyhow::{anyhow, ensure, Result};
use num_complex::Complex64;
use rand_distr::{Distribution, StandardNormal};
use std::collections::HashSet;
use std::ops::Mul;
use std::sync::Arc;

/// Compute the permutation array from original indices to new indices.
///
/// `new_indices[i]` corresponds to `original_indices[perm[i]]`.
///
/// # Panics
/// Panics if `new_indices` is not a permutation of `original_indices`.
///
/// # Example
/// ```
/// use tensor4all_core::tensor::compute_permutation_from_indices;
/// use tensor4all_core::DynIndex;
///
/// let i = DynIndex::new_dyn(2);
/// let j = DynIndex::new_dyn(3);
/// let original = vec![i.clone(), j.clone()];
/// let new_order = vec![j.clone(), i.clone()];
///
/// let perm = compute_permutation_from_indices(&original, &new_order);
/// assert_eq!(perm, vec![1, 0]);
/// ```
pub fn compute_permutation_from_indices(
    original_indices: &[DynIndex],
    new_indices: &[DynIndex],
) -> Vec<usize> {
    assert_eq!(
        new_indices.len(),
        original_indices.len(),
        "new_indices length must match original_indices length"
    );

    let mut perm = Vec::with_capacity(new_indices.len());
    let mut used = HashSet::new();
    for new_idx in new_indices {
        let pos = original_indices
            .iter()
            .position(|old| old == new_idx)
            .unwrap_or_else(|| panic!("index {:?} not found in original indices", new_idx));
        assert!(
            used.insert(pos),
            "duplicate index {:?} in new indices",
            new_idx
        );
        perm.push(pos);
    }
    perm
}

/// Tensor with dynamic rank and dynamic element type.
///
/// # Example
/// ```
/// use tensor4all_core::{DynIndex, TensorDynLen};
///
/// let i = DynIndex::new_dyn(2);
/// let j = DynIndex::new_dyn(3);
/// let a = TensorDynLen::from_dense_f64(vec![i.clone(), j.clone()], vec![1.0; 6]);
/// let b = TensorDynLen::from_dense_f64(vec![j.clone()], vec![1.0, 2.0, 3.0]);
/// let c = &a * &b;
/// assert_eq!(c.indices, vec![i]);
/// assert_eq!(c.get(&[0]).real(), 6.0);
/// ```
#[derive(Clone)]
pub struct TensorDynLen {
    /// Indices in storage order.
    pub indices: Vec<DynIndex>,
    /// Dimensions, `dims[i] == indices[i].dim()`.
    pub dims: Vec<usize>,
    storage: Arc<Storage>,
}

impl TensorDynLen {
    /// Create a tensor from indices, dimensions and shared storage.
    ///
    /// # Panics
    /// Panics on duplicate indices, on a dimension mismatch or if the storage
    /// length differs from the product of dimensions.
    pub fn new(indices: Vec<DynIndex>, dims: Vec<usize>, storage: Arc<Storage>) -> Self {
        assert_eq!(
            indices.len(),
            dims.len(),
            "indices and dims length mismatch"
        );
        for (idx, &d) in indices.iter().zip(&dims) {
            assert_eq!(idx.dim(), d, "dimension mismatch for index {:?}", idx);
        }
        let unique: HashSet<_> = indices.iter().collect();
        assert_eq!(unique.len(), indices.len(), "tensor has duplicate indices");
        let total: usize = dims.iter().product();
        assert_eq!(
            storage.len(),
            total,
            "storage length {} does not match dims {:?}",
            storage.len(),
            dims
        );
        Self {
            indices,
            dims,
            storage,
        }
    }

    /// Create a tensor from indices and storage, taking dimensions from the indices.
    pub fn from_indices(indices: Vec<DynIndex>, storage: Storage) -> Self {
        let dims = indices.iter().map(DynIndex::dim).collect();
        Self::new(indices, dims, Arc::new(storage))
    }

    /// Real tensor from row-major data.
    pub fn from_dense_f64(indices: Vec<DynIndex>, data: Vec<f64>) -> Self {
        Self::from_indices(indices, Storage::DenseF64(data))
    }

    /// Complex tensor from row-major data.
    pub fn from_dense_c64(indices: Vec<DynIndex>, data: Vec<Complex64>) -> Self {
        Self::from_indices(indices, Storage::DenseC64(data))
    }

    /// Tensor from dynamic scalars; real storage when every value is real.
    pub fn from_scalars(indices: Vec<DynIndex>, data: Vec<AnyScalar>) -> Self {
        Self::from_indices(indices, Storage::from_scalars(data))
    }

    /// Rank-0 tensor holding `value`.
    pub fn scalar(value: AnyScalar) -> Self {
        Self::from_scalars(vec![], vec![value])
    }

    /// All-ones real tensor.
    pub fn ones(indices: Vec<DynIndex>) -> Self {
        let total: usize = indices.iter().map(DynIndex::dim).product();
        Self::from_dense_f64(indices, vec![1.0; total])
    }

    /// Generalized delta tensor: one where all index values coincide, zero elsewhere.
    ///
    /// With a single index this is the all-ones vector, and with no index the
    /// scalar one.
    ///
    /// # Panics
    /// Panics if the indices do not all share one dimension.
    pub fn delta(indices: Vec<DynIndex>) -> Self {
        let dims: Vec<usize> = indices.iter().map(DynIndex::dim).collect();
        if let Some(&d) = dims.first() {
            assert!(
                dims.iter().all(|&x| x == d),
                "delta requires equal dimensions, got {:?}",
                dims
            );
        }
        let total: usize = dims.iter().product();
        let mut data = vec![0.0; total];
        match dims.first() {
            None => data[0] = 1.0,
            Some(&d) => {
                let diag_stride: usize = row_major_strides(&dims).iter().sum();
                for k in 0..d {
                    data[k * diag_stride] = 1.0;
                }
            }
        }
        Self::from_dense_f64(indices, data)
    }

    /// Create a random f64 tensor with values from the standard normal distribution.
    ///
    /// # Example
    /// ```
    /// use tensor4all_core::{DynIndex, TensorDynLen};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let mut rng = ChaCha8Rng::seed_from_u64(42);
    /// let i = DynIndex::new_dyn(2);
    /// let j = DynIndex::new_dyn(3);
    /// let tensor = TensorDynLen::random_f64(&mut rng, vec![i, j]);
    /// assert_eq!(tensor.dims, vec![2, 3]);
    /// ```
    pub fn random_f64<R: rand::Rng>(rng: &mut R, indices: Vec<DynIndex>) -> Self {
        let total: usize = indices.iter().map(DynIndex::dim).product();
        let data: Vec<f64> = (0..total).map(|_| StandardNormal.sample(rng)).collect();
        Self::from_dense_f64(indices, data)
    }

    /// Create a random Complex64 tensor; real and imaginary parts are standard normal.
    pub fn random_c64<R: rand::Rng>(rng: &mut R, indices: Vec<DynIndex>) -> Self {
        let total: usize = indices.iter().map(DynIndex::dim).product();
        let data: Vec<Complex64> = (0..total)
            .map(|_| Complex64::new(StandardNormal.sample(rng), StandardNormal.sample(rng)))
            .collect();
        Self::from_dense_c64(indices, data)
    }

    /// Shared storage.
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Number of indices.
    pub fn ndim(&self) -> usize {
        self.indices.len()
    }

    /// Whether the data is complex.
    pub fn is_complex(&self) -> bool {
        self.storage.is_complex()
    }

    /// Check if the tensor carries `index`.
    pub fn has_index(&self, index: &DynIndex) -> bool {
        self.indices.contains(index)
    }

    /// Position of `index` among the tensor's indices.
    pub fn position(&self, index: &DynIndex) -> Option<usize> {
        self.indices.iter().position(|i| i == index)
    }

    /// Indices shared with `other`, in `self`'s order.
    pub fn common_indices(&self, other: &Self) -> Vec<DynIndex> {
        self.indices
            .iter()
            .filter(|i| other.has_index(i))
            .cloned()
            .collect()
    }

    /// Element at a multi-index given in the tensor's index order.
    pub fn get(&self, multi: &[usize]) -> AnyScalar {
        assert_eq!(multi.len(), self.ndim(), "multi-index rank mismatch");
        let offset: usize = multi
            .iter()
            .zip(row_major_strides(&self.dims))
            .map(|(i, s)| i * s)
            .sum();
        self.storage.get(offset)
    }

    /// Promote to complex storage.
    pub fn to_complex(&self) -> Self {
        if self.is_complex() {
            return self.clone();
        }
        Self::new(
            self.indices.clone(),
            self.dims.clone(),
            Arc::new(self.storage.to_complex()),
        )
    }

    /// Extract the value of a tensor with exactly one element.
    ///
    /// # Panics
    /// Panics if the tensor has more than one element.
    pub fn only(&self) -> AnyScalar {
        assert_eq!(
            self.storage.len(),
            1,
            "only() requires a single-element tensor, got dims {:?}",
            self.dims
        );
        self.storage.get(0)
    }

    /// Permute the tensor to the given index order.
    pub fn permute_indices(&self, new_indices: &[DynIndex]) -> Self {
        let perm = compute_permutation_from_indices(&self.indices, new_indices);
        let storage = self.storage.permute(&self.dims, &perm);
        let dims = perm.iter().map(|&p| self.dims[p]).collect();
        Self::new(new_indices.to_vec(), dims, Arc::new(storage))
    }

    /// Replace `old_index` by `new_index` (same dimension). No-op if absent.
    ///
    /// # Panics
    /// Panics if the dimensions differ.
    pub fn replaceind(&self, old_index: &DynIndex, new_index: &DynIndex) -> Self {
        let Some(pos) = self.position(old_index) else {
            return self.clone();
        };
        assert_eq!(
            old_index.dim(),
            new_index.dim(),
            "replaceind: dimension mismatch"
        );
        let mut indices = self.indices.clone();
        indices[pos] = new_index.clone();
        Self::new(indices, self.dims.clone(), Arc::clone(&self.storage))
    }

    /// Replace several indices at once.
    pub fn replaceinds(&self, old_indices: &[DynIndex], new_indices: &[DynIndex]) -> Self {
        assert_eq!(old_indices.len(), new_indices.len());
        let mut indices = self.indices.clone();
        for (old, new) in old_indices.iter().zip(new_indices) {
            if let Some(pos) = indices.iter().position(|i| i == old) {
                assert_eq!(old.dim(), new.dim(), "replaceinds: dimension mismatch");
                indices[pos] = new.clone();
            }
        }
        Self::new(indices, self.dims.clone(), Arc::clone(&self.storage))
    }

    /// Fix `index` to `value`, removing it from the tensor.
    pub fn fix_index(&self, index: &DynIndex, value: usize) -> Result<Self> {
        let pos = self
            .position(index)
            .ok_or_else(|| anyhow!("fix_index: index {:?} not in tensor", index))?;
        ensure!(
            value < self.dims[pos],
            "fix_index: value {} out of range for dimension {}",
            value,
            self.dims[pos]
        );
        let strides = row_major_strides(&self.dims);
        let mut indices = self.indices.clone();
        indices.remove(pos);
        let mut rest_dims = self.dims.clone();
        rest_dims.remove(pos);
        let mut rest_strides = strides.clone();
        rest_strides.remove(pos);
        let total: usize = rest_dims.iter().product();
        let offsets: Vec<usize> = (0..total)
            .map(|lin| {
                value * strides[pos]
                    + unravel_index(lin, &rest_dims)
                        .iter()
                        .zip(&rest_strides)
                        .map(|(i, s)| i * s)
                        .sum::<usize>()
            })
            .collect();
        Ok(Self::new(
            indices,
            rest_dims,
            Arc::new(self.storage.gather(&offsets)),
        ))
    }

    /// Fuse `indices` into a single `new_index` appended as the last axis.
    ///
    /// The fused value is the row-major combination of the original values
    /// (the first listed index varies slowest).
    pub fn fuse_indices(&self, indices: &[DynIndex], new_index: DynIndex) -> Result<Self> {
        let fused_dim: usize = indices.iter().map(DynIndex::dim).product();
        ensure!(
            new_index.dim() == fused_dim,
            "fuse_indices: new index dimension {} != product {}",
            new_index.dim(),
            fused_dim
        );
        for idx in indices {
            ensure!(
                self.has_index(idx),
                "fuse_indices: index {:?} not in tensor",
                idx
            );
        }
        let mut order: Vec<DynIndex> = self
            .indices
            .iter()
            .filter(|i| !indices.contains(i))
            .cloned()
            .collect();
        let mut result_indices = order.clone();
        order.extend(indices.iter().cloned());
        let permuted = self.permute_indices(&order);
        result_indices.push(new_index);
        Ok(Self::from_indices(
            result_indices,
            permuted.storage.as_ref().clone(),
        ))
    }

    /// Contract with `other` over all common indices.
    ///
    /// Without common indices this is the outer product. Result indices are
    /// the remaining indices of `self` followed by those of `other`.
    pub fn contract(&self, other: &Self) -> Self {
        let common = self.common_indices(other);
        let a_keep: Vec<DynIndex> = self
            .indices
            .iter()
            .filter(|i| !common.contains(i))
            .cloned()
            .collect();
        let b_keep: Vec<DynIndex> = other
            .indices
            .iter()
            .filter(|i| !common.contains(i))
            .cloned()
            .collect();

        let mut a_order = a_keep.clone();
        a_order.extend(common.iter().cloned());
        let mut b_order = common.clone();
        b_order.extend(b_keep.iter().cloned());
        let a = self.permute_indices(&a_order);
        let b = other.permute_indices(&b_order);

        let m: usize = a_keep.iter().map(DynIndex::dim).product();
        let k: usize = common.iter().map(DynIndex::dim).product();
        let n: usize = b_keep.iter().map(DynIndex::dim).product();
        let storage = matmul_storage(&a.storage, &b.storage, m, k, n);

        let mut indices = a_keep;
        indices.extend(b_keep);
        Self::from_indices(indices, storage)
    }

    /// Elementwise sum with a tensor over the same set of indices.
    pub fn add(&self, other: &Self) -> Result<Self> {
        ensure!(
            self.ndim() == other.ndim() && self.indices.iter().all(|i| other.has_index(i)),
            "add: index sets differ"
        );
        let other = other.permute_indices(&self.indices);
        Ok(Self::new(
            self.indices.clone(),
            self.dims.clone(),
            Arc::new(self.storage.add(&other.storage)),
        ))
    }

    /// Multiply all elements by `scalar`.
    pub fn scale(&self, scalar: AnyScalar) -> Self {
        Self::new(
            self.indices.clone(),
            self.dims.clone(),
            Arc::new(self.storage.scale(scalar)),
        )
    }

    /// Complex conjugate.
    pub fn conj(&self) -> Self {
        Self::new(
            self.indices.clone(),
            self.dims.clone(),
            Arc::new(self.storage.conj()),
        )
    }

    /// Squared Frobenius norm.
    pub fn norm_squared(&self) -> f64 {
        self.storage.norm_squared()
    }

    /// Frobenius norm.
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Frobenius distance `||self - other||`.
    pub fn distance(&self, other: &Self) -> Result<f64> {
        Ok(self.add(&other.scale(AnyScalar::new_real(-1.0)))?.norm())
    }
}

/// Compute the direct sum of two tensors along specified index pairs.
///
/// For each pair `(a_index, b_index)` the result carries the matching entry
/// of `new_indices`, of dimension `dim(a_index) + dim(b_index)`; values of
/// `a` occupy the leading block and values of `b` the trailing one. All
/// other indices must be shared by `a` and `b`. Result indices are the
/// shared ones in `a`'s order followed by `new_indices`.
pub fn direct_sum_with_indices(
    a: &TensorDynLen,
    b: &TensorDynLen,
    pairs: &[(DynIndex, DynIndex)],
    new_indices: &[DynIndex],
) -> Result<TensorDynLen> {
    ensure!(
        pairs.len() == new_indices.len(),
        "direct_sum: {} pairs but {} new indices",
        pairs.len(),
        new_indices.len()
    );
    for ((ia, ib), n) in pairs.iter().zip(new_indices) {
        ensure!(a.has_index(ia), "direct_sum: {:?} not in first tensor", ia);
        ensure!(b.has_index(ib), "direct_sum: {:?} not in second tensor", ib);
        ensure!(
            n.dim() == ia.dim() + ib.dim(),
            "direct_sum: new index dimension {} != {} + {}",
            n.dim(),
            ia.dim(),
            ib.dim()
        );
    }
    let paired_a: Vec<DynIndex> = pairs.iter().map(|(ia, _)| ia.clone()).collect();
    let paired_b: Vec<DynIndex> = pairs.iter().map(|(_, ib)| ib.clone()).collect();
    let common: Vec<DynIndex> = a
        .indices
        .iter()
        .filter(|i| !paired_a.contains(i))
        .cloned()
        .collect();
    ensure!(
        b.ndim() == common.len() + paired_b.len() && common.iter().all(|i| b.has_index(i)),
        "direct_sum: non-paired indices must match"
    );

    let mut a_order = common.clone();
    a_order.extend(paired_a.iter().cloned());
    let mut b_order = common.clone();
    b_order.extend(paired_b.iter().cloned());
    let a = a.permute_indices(&a_order);
    let b = b.permute_indices(&b_order);

    let mut result_indices = common;
    result_indices.extend(new_indices.iter().cloned());
    let result_dims: Vec<usize> = result_indices.iter().map(DynIndex::dim).collect();
    let result_strides = row_major_strides(&result_dims);
    let n_common = a_order.len() - pairs.len();
    let total: usize = result_dims.iter().product();

    // Offsets of every element of `t` inside the result, shifting the paired
    // axes by `shift`.
    let place = |t: &TensorDynLen, shift: &[usize]| -> Vec<usize> {
        (0..t.storage.len())
            .map(|lin| {
                unravel_index(lin, &t.dims)
                    .iter()
                    .enumerate()
                    .map(|(axis, &v)| {
                        let s = if axis >= n_common {
                            shift[axis - n_common]
                        } else {
                            0
                        };
                        (v + s) * result_strides[axis]

                    })
                    .sum()
            })
            .collect()
    };
    let a_offsets = place(&a, &vec![0; pairs.len()]);
    let b_shift: Vec<usize> = paired_a.iter().map(DynIndex::dim).collect();
    let b_offsets = place(&b, &b_shift);

    let storage = if a.is_complex() || b.is_complex() {
        let mut data = vec![Complex64::new(0.0, 0.0); total];
        let (av, bv) = (a.storage.to_c64_vec(), b.storage.to_c64_vec());
        for (o, v) in a_offsets.iter().zip(av) {
            data[*o] = v;
        }
        for (o, v) in b_offsets.iter().zip(bv) {
            data[*o] = v;
        }
        Storage::DenseC64(data)
    } else {
        let mut data = vec![0.0; total];
        for (lin, o) in a_offsets.iter().enumerate() {
            data[*o] = a.storage.get(lin).real();
        }
        for (lin, o) in b_offsets.iter().enumerate() {
            data[*o] = b.storage.get(lin).real();
        }
        Storage::DenseF64(data)
    };
    Ok(TensorDynLen::from_indices(result_indices, storage))
}

/// Direct sum creating fresh link indices for every pair.
///
/// Returns the result together with the new indices (one per pair).
pub fn direct_sum(
    a: &TensorDynLen,
    b: &TensorDynLen,
    pairs: &[(DynIndex, DynIndex)],
) -> Result<(TensorDynLen, Vec<DynIndex>)> {
    let new_indices: Vec<DynIndex> = pairs
        .iter()
        .map(|(ia, ib)| DynIndex::new_link(ia.dim() + ib.dim()))
        .collect();
    let result = direct_sum_with_indices(a, b, pairs, &new_indices)?;
    Ok((result, new_indices))
}

/// The `*` operator performs tensor contraction along common indices.
impl Mul<&TensorDynLen> for &TensorDynLen {
    type Output = TensorDynLen;

    fn mul(self, other: &TensorDynLen) -> Self::Output {
        self.contract(other)
    }
}

impl Mul<TensorDynLen> for TensorDynLen {
    type Output = TensorDynLen;

    fn mul(self, other: TensorDynLen) -> Self::Output {
        self.contract(&other)
    }
}

impl std::fmt::Debug for TensorDynLen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TensorDynLen")
            .field("indices", &self.indices)
            .field("dims", &self.dims)
            .field("is_complex", &self.is_complex())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seq(indices: Vec<DynIndex>) -> TensorDynLen {
        let total: usize = indices.iter().map(DynIndex::dim).product();
        TensorDynLen::from_dense_f64(indices, (0..total).map(|x| x as f64).collect())
    }

    // ========================================================================
    // Construction
    // ========================================================================

    #[test]
    fn test_delta_three_way() {
        let i = DynIndex::new_dyn(3);
        let j = DynIndex::new_dyn(3);
        let k = DynIndex::new_dyn(3);
        let d = TensorDynLen::delta(vec![i, j, k]);
        for a in 0..3 {
            for b in 0..3 {
                for c in 0..3 {
                    let expected = if a == b && b == c { 1.0 } else { 0.0 };
                    assert_eq!(d.get(&[a, b, c]).real(), expected);
                }
            }
        }
    }

    #[test]
    fn test_delta_single_index_is_ones() {
        let i = DynIndex::new_dyn(4);
        let d = TensorDynLen::delta(vec![i]);
        assert_eq!(d.storage().as_ref(), &Storage::DenseF64(vec![1.0; 4]));
        assert_eq!(TensorDynLen::delta(vec![]).only().real(), 1.0);
    }

    // ========================================================================
    // Index manipulation
    // ========================================================================

    #[test]
    fn test_permute_roundtrip() {
        let i = DynIndex::new_dyn(2);
        let j = DynIndex::new_dyn(3);
        let k = DynIndex::new_dyn(4);
        let t = seq(vec![i.clone(), j.clone(), k.clone()]);
        let p = t.permute_indices(&[k.clone(), i.clone(), j.clone()]);
        assert_eq!(p.dims, vec![4, 2, 3]);
        assert_eq!(p.get(&[3, 1, 2]), t.get(&[1, 2, 3]));
        let back = p.permute_indices(&[i, j, k]);
        assert_eq!(back.storage(), t.storage());
    }

    #[test]
    fn test_fix_index_slices() {
        let i = DynIndex::new_dyn(2);
        let j = DynIndex::new_dyn(3);
        let t = seq(vec![i.clone(), j.clone()]);
        let s = t.fix_index(&j, 2).unwrap();
        assert_eq!(s.indices, vec![i.clone()]);
        assert_eq!(s.storage().as_ref(), &Storage::DenseF64(vec![2.0, 5.0]));
        assert!(t.fix_index(&j, 3).is_err());
        assert!(t.fix_index(&DynIndex::new_dyn(2), 0).is_err());
    }

    #[test]
    fn test_fuse_indices_row_major() {
        let i = DynIndex::new_dyn(2);
        let j = DynIndex::new_dyn(3);
        let k = DynIndex::new_dyn(2);
        let t = seq(vec![i.clone(), j.clone(), k.clone()]);
        let f = DynIndex::new_dyn(4);
        let fused = t.fuse_indices(&[i.clone(), k.clone()], f.clone()).unwrap();
        assert_eq!(fused.indices, vec![j.clone(), f.clone()]);
        // fused value = 2 * i + k
        for vi in 0..2 {
            for vj in 0..3 {
                for vk in 0..2 {
                    assert_eq!(fused.get(&[vj, 2 * vi + vk]), t.get(&[vi, vj, vk]));
                }
            }
        }
        assert!(t.fuse_indices(&[i, k], DynIndex::new_dyn(3)).is_err());
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    #[test]
    fn test_contract_matrix_product() {
        let i = DynIndex::new_dyn(2);
        let j = DynIndex::new_dyn(3);
        let k = DynIndex::new_dyn(2);
        let a = seq(vec![i.clone(), j.clone()]);
        let b = seq(vec![j.clone(), k.clone()]);
        let c = &a * &b;
        assert_eq!(c.indices, vec![i, k]);
        // [[0,1,2],[3,4,5]] * [[0,1],[2,3],[4,5]]
        assert_eq!(
            c.storage().as_ref(),
            &Storage::DenseF64(vec![10.0, 13.0, 28.0, 40.0])
        );
    }

    #[test]
    fn test_contract_full_gives_scalar() {
        let i = DynIndex::new_dyn(3);
        let a = seq(vec![i.clone()]);
        let c = a.contract(&a);
        assert!(c.indices.is_empty());
        assert_eq!(c.only().real(), 5.0);
    }

    #[test]
    fn test_outer_product() {
        let i = DynIndex::new_dyn(2);
        let j = DynIndex::new_dyn(2);
        let a = TensorDynLen::from_dense_f64(vec![i.clone()], vec![1.0, 2.0]);
        let b = TensorDynLen::from_dense_c64(
            vec![j.clone()],
            vec![Complex64::new(0.0, 1.0), Complex64::new(3.0, 0.0)],
        );
        let c = a.contract(&b);
        assert!(c.is_complex());
        assert_eq!(c.get(&[1, 0]), AnyScalar::new_complex(0.0, 2.0));
        assert_eq!(c.get(&[1, 1]), AnyScalar::new_real(6.0));
    }

    #[test]
    fn test_add_permuted() {
        let i = DynIndex::new_dyn(2);
        let j = DynIndex::new_dyn(3);
        let a = seq(vec![i.clone(), j.clone()]);
        let b = a.permute_indices(&[j.clone(), i.clone()]);
        let c = a.add(&b).unwrap();
        assert_eq!(c.get(&[1, 2]).real(), 10.0);
        assert_relative_eq!(a.distance(&b).unwrap(), 0.0);
    }

    #[test]
    fn test_direct_sum_block_layout() {
        let s = DynIndex::new_dyn(2);
        let la = DynIndex::new_dyn(1);
        let lb = DynIndex::new_dyn(2);
        let a = TensorDynLen::from_dense_f64(vec![s.clone(), la.clone()], vec![1.0, 2.0]);
        let b = TensorDynLen::from_dense_f64(vec![lb.clone(), s.clone()], vec![3.0, 4.0, 5.0, 6.0]);
        let (c, new) = direct_sum(&a, &b, &[(la, lb)]).unwrap();
        assert_eq!(new[0].dim(), 3);
        assert_eq!(c.indices, vec![s, new[0].clone()]);
        // rows: s, columns: [a | b]
        assert_eq!(
            c.storage().as_ref(),
            &Storage::DenseF64(vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0])
        );
    }

    #[test]
    fn test_direct_sum_two_pairs_is_block_diagonal() {
        let l1a = DynIndex::new_dyn(1);
        let l2a = DynIndex::new_dyn(1);
        let l1b = DynIndex::new_dyn(1);
        let l2b = DynIndex::new_dyn(1);
        let a = TensorDynLen::from_dense_f64(vec![l1a.clone(), l2a.clone()], vec![7.0]);
        let b = TensorDynLen::from_dense_f64(vec![l1b.clone(), l2b.clone()], vec![9.0]);
        let (c, _) = direct_sum(&a, &b, &[(l1a, l1b), (l2a, l2b)]).unwrap();
        assert_eq!(
            c.storage().as_ref(),
            &Storage::DenseF64(vec![7.0, 0.0, 0.0, 9.0])
        );
    }
}
