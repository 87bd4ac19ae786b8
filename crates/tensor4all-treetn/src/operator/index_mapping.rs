//! Index mapping between true site indices and internal operator indices.
//!
//! In `y = A x` both `x` and `y` carry the same site index `s`, but a single
//! operator tensor cannot hold `s` twice. The operator network therefore
//! uses independent internal indices `s_in` and `s_out`; this mapping records
//! the correspondence.

use tensor4all_core::DynIndex;

/// Mapping between a true site index and an internal operator index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexMapping {
    /// True site index (from the state)
    pub true_index: DynIndex,
    /// Internal operator index (`s_in` or `s_out`)
    pub internal_index: DynIndex,
}

impl IndexMapping {
    /// Mapping to a fresh internal index of the same dimension.
    pub fn fresh(true_index: &DynIndex) -> Self {
        Self {
            true_index: true_index.clone(),
            internal_index: true_index.sim(),
        }
    }
}
