//! Tensor networks on named graphs.
//!
//! - [`NamedGraph`] and the constructors in [`graphs`]: topologies with
//!   arbitrary vertex names
//! - [`SiteIndexNetwork`]: a topology with the site indices of each vertex
//! - [`TensorNetwork`]: one tensor per vertex, one link per edge; addition,
//!   contraction and (on trees) SVD truncation
//! - [`LinearOperator`] and [`OpSum`]: tree operator networks and their
//!   application to states

pub mod graphs;
pub mod named_graph;
pub mod network;
pub mod operator;
pub mod options;
pub mod random;
pub mod site_index_network;

pub use named_graph::{NamedGraph, Topology};
pub use network::{combine_vertexwise, LinkPair, TensorNetwork};
pub use operator::{
    apply_linear_operator, build_identity_operator_tensor, IndexMapping, LinearOperator, LocalOp,
    OpString, OpSum,
};
pub use options::TruncationOptions;
pub use random::{
    random_connected_graph, random_network_c64, random_network_f64, random_tree, LinkSpace,
};
pub use site_index_network::SiteIndexNetwork;
