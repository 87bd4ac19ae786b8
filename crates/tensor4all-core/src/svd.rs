//! SVD factorization of tensors with truncation.
//!
//! The tensor is unfolded into a matrix with the given left indices as rows
//! and the remaining indices as columns, decomposed with faer's thin SVD and
//! truncated according to [`TruncationParams`].

use crate::global_default::default_svd_rtol;
use crate::index::DynIndex;
use crate::storage::Storage;
use crate::tensor::TensorDynLen;
use crate::truncation::{retained_rank, TruncationParams};
use faer::Mat;
use faer_traits::ComplexField;
use num_complex::Complex64;
use thiserror::Error;

/// Error type for SVD operations.
#[derive(Debug, Error)]
pub enum SvdError {
    /// SVD computation failed.
    #[error("SVD computation failed: {0}")]
    ComputationError(String),
    /// Invalid relative tolerance value (must be finite and non-negative).
    #[error("Invalid rtol value: {0}. rtol must be finite and non-negative.")]
    InvalidRtol(f64),
    /// A left index is not an index of the tensor.
    #[error("Invalid left indices: {0}")]
    InvalidSplit(String),
}

/// Result of [`factorize_svd`]: `t ≈ left * right` contracted over `bond`.
#[derive(Debug, Clone)]
pub struct SvdFactorization {
    /// Left-orthogonal factor `U` with indices `left_inds ++ [bond]`.
    pub left: TensorDynLen,
    /// Remainder `S V^H` with indices `[bond] ++ right_inds`.
    pub right: TensorDynLen,
    /// New bond index, tagged `"Link"`.
    pub bond: DynIndex,
    /// Retained singular values in descending order.
    pub singular_values: Vec<f64>,
    /// Weight of the discarded singular values, `Σ_{i>r} σ_i²`.
    pub discarded_weight: f64,
}

/// Factorize `t` into a left-orthogonal `U` and `S V^H` with truncation.
///
/// # Arguments
/// * `t` - Tensor to factorize
/// * `left_inds` - Indices forming the rows of the unfolded matrix; either side
///   may be empty, giving a unit-dimension bond
/// * `params` - Truncation parameters; a missing `rtol` falls back to
///   [`default_svd_rtol`]
///
/// # Errors
/// Returns an error for an invalid split, an invalid tolerance or a failed
/// decomposition.
///
/// # Example
/// ```
/// use tensor4all_core::{factorize_svd, DynIndex, TensorDynLen, TruncationParams};
///
/// let i = DynIndex::new_dyn(2);
/// let j = DynIndex::new_dyn(2);
/// // Rank-1 matrix [[1, 2], [2, 4]]
/// let t = TensorDynLen::from_dense_f64(vec![i.clone(), j.clone()], vec![1.0, 2.0, 2.0, 4.0]);
/// let f = factorize_svd(&t, &[i], &TruncationParams::new()).unwrap();
/// assert_eq!(f.bond.dim(), 1);
/// let back = f.left.contract(&f.right);
/// assert!(back.distance(&t).unwrap() < 1e-12);
/// ```
pub fn factorize_svd(
    t: &TensorDynLen,
    left_inds: &[DynIndex],
    params: &TruncationParams,
) -> Result<SvdFactorization, SvdError> {
    let rtol = params.effective_rtol(default_svd_rtol());
    if !rtol.is_finite() || rtol < 0.0 {
        return Err(SvdError::InvalidRtol(rtol));
    }
    for idx in left_inds {
        if !t.has_index(idx) {
            return Err(SvdError::InvalidSplit(format!("{:?} not in tensor", idx)));
        }
    }
    let right_inds: Vec<DynIndex> = t
        .indices
        .iter()
        .filter(|i| !left_inds.contains(i))
        .cloned()
        .collect();

    let mut order = left_inds.to_vec();
    order.extend(right_inds.iter().cloned());
    let unfolded = t.permute_indices(&order);
    let m: usize = left_inds.iter().map(DynIndex::dim).product();
    let n: usize = right_inds.iter().map(DynIndex::dim).product();

    let params = params.with_rtol(rtol);
    let (u_storage, sv_storage, s_kept, discarded) = match unfolded.storage().as_ref() {
        Storage::DenseF64(data) => {
            let (u, sv, s, d) = truncated_usvh(data, m, n, &params, |x: f64| x, |x| x)?;
            (Storage::DenseF64(u), Storage::DenseF64(sv), s, d)
        }
        Storage::DenseC64(data) => {
            let (u, sv, s, d) = truncated_usvh(
                data,
                m,
                n,
                &params,
                |z: Complex64| z.re,
                |z: Complex64| z.conj(),
            )?;
            (Storage::DenseC64(u), Storage::DenseC64(sv), s, d)
        }
    };

    let bond = DynIndex::new_link(s_kept.len());
    let mut left_indices = left_inds.to_vec();
    left_indices.push(bond.clone());
    let mut right_indices = vec![bond.clone()];
    right_indices.extend(right_inds);

    tracing::trace!(m, n, rank = s_kept.len(), discarded, "svd factorization");

    Ok(SvdFactorization {
        left: TensorDynLen::from_indices(left_indices, u_storage),
        right: TensorDynLen::from_indices(right_indices, sv_storage),
        bond,
        singular_values: s_kept,
        discarded_weight: discarded,
    })
}

type UsvhParts<T> = (Vec<T>, Vec<T>, Vec<f64>, f64);

/// Thin SVD of a row-major `m×n` matrix, truncated.
///
/// Returns `U` (`m×r`), `S V^H` (`r×n`), the kept singular values and the
/// discarded weight.
fn truncated_usvh<T>(
    data: &[T],
    m: usize,
    n: usize,
    params: &TruncationParams,
    re: impl Fn(T) -> f64,
    conj: impl Fn(T) -> T,
) -> Result<UsvhParts<T>, SvdError>
where
    T: ComplexField + Copy + std::ops::Mul<f64, Output = T>,
{
    let mat = Mat::<T>::from_fn(m, n, |i, j| data[i * n + j]);
    let svd = mat
        .thin_svd()
        .map_err(|e| SvdError::ComputationError(format!("{:?}", e)))?;
    let k = m.min(n);
    let s_col = svd.S().column_vector();
    let s_full: Vec<f64> = (0..k).map(|i| re(s_col[i])).collect();
    let r = retained_rank(&s_full, params, 0.0).min(k);
    let discarded: f64 = s_full[r..].iter().map(|s| s * s).sum();

    let u = svd.U();
    let v = svd.V();
    let mut u_vec = Vec::with_capacity(m * r);
    for i in 0..m {
        for j in 0..r {
            u_vec.push(u[(i, j)]);
        }
    }
    // (S V^H)[a, j] = s_a * conj(V[j, a])
    let mut sv_vec = Vec::with_capacity(r * n);
    for a in 0..r {
        for j in 0..n {
            sv_vec.push(conj(v[(j, a)]) * s_full[a]);
        }
    }
    Ok((u_vec, sv_vec, s_full[..r].to_vec(), discarded))
}
