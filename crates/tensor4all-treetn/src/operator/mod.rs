//! Linear operators on tree tensor networks.
//!
//! # Key Types
//!
//! - [`LinearOperator`]: operator network with index mapping for automatic transformations
//! - [`IndexMapping`]: mapping between true site indices and internal operator indices
//! - [`OpSum`]: sum of [`OpString`]s, compiled into a [`LinearOperator`]
//! - [`apply_linear_operator`]: compute `A|x⟩`
//!
//! # Example
//!
//! ```
//! use tensor4all_core::{AnyScalar, DynIndex};
//! use tensor4all_treetn::graphs::path_graph;
//! use tensor4all_treetn::{LocalOp, OpString, OpSum, SiteIndexNetwork, TruncationOptions};
//!
//! let sites =
//!     SiteIndexNetwork::from_topology(&path_graph(2), |_| vec![DynIndex::new_dyn(2)]).unwrap();
//! let s0 = sites.all_site_indices()[0].clone();
//! let flip = LocalOp::from_fn(2, |o, i| AnyScalar::new_real(if o != i { 1.0 } else { 0.0 }));
//!
//! let mut sum = OpSum::new();
//! sum.push(OpString::new(AnyScalar::new_real(1.0)).with(s0, flip));
//! let op = sum.compile(&sites, &TruncationOptions::new()).unwrap();
//! assert_eq!(op.max_bond_dim(), 1);
//! ```

mod apply;
mod identity;
mod index_mapping;
mod linear_operator;
mod opstring;

pub use apply::apply_linear_operator;
pub use identity::build_identity_operator_tensor;
pub use index_mapping::IndexMapping;
pub use linear_operator::LinearOperator;
pub use opstring::{LocalOp, OpString, OpSum};

use anyhow::Result;
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::AnyScalar;

use crate::options::TruncationOptions;
use crate::site_index_network::SiteIndexNetwork;

impl<V> LinearOperator<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    /// Identity operator on a tree site network.
    pub fn identity(sites: &SiteIndexNetwork<V>) -> Result<Self> {
        let mut sum = OpSum::new();
        sum.push(OpString::new(AnyScalar::new_real(1.0)));
        sum.compile(sites, &TruncationOptions::new())
    }
}
