//! Dense tensors with named indices.
//!
//! - [`DynIndex`]: index identity with a dimension and tags
//! - [`TensorDynLen`]: dynamic-rank tensor over `f64` or `Complex64` storage
//! - [`factorize_svd`]: truncated SVD split of a tensor
//! - [`TruncationParams`]: shared truncation configuration

pub mod any_scalar;
pub mod global_default;
pub mod index;
pub mod storage;
pub mod svd;
pub mod tensor;
pub mod truncation;

pub use any_scalar::AnyScalar;
pub use global_default::{default_svd_rtol, set_default_svd_rtol, GlobalDefault, InvalidRtolError};
pub use index::{DynId, DynIndex, TagSet};
pub use storage::Storage;
pub use svd::{factorize_svd, SvdError, SvdFactorization};
pub use tensor::{
    compute_permutation_from_indices, direct_sum, direct_sum_with_indices, TensorDynLen,
};
pub use truncation::{HasTruncationParams, TruncationParams};
