//! Pointwise products and operator application, followed by truncation.

use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::{DynIndex, TensorDynLen};
use tensor4all_treetn::{
    apply_linear_operator, combine_vertexwise, LinearOperator, TruncationOptions,
};
use tracing::debug;

use crate::error::{FunctionNetworkError, Result};
use crate::function_network::FunctionNetwork;

/// Pointwise product `(f·g)(x) = f(x)·g(x)`.
///
/// At every vertex each site index `s` is split into two copies joined by
/// the delta `δ(s, s₁, s₂)`, one copy contracted with `f` and one with `g`.
/// Link pairs are fused, so bond dimensions multiply before truncation.
/// Networks on graphs with cycles are returned untruncated.
///
/// # Errors
/// Returns a mismatch error unless both networks share vertices, site
/// indices and edges.
pub fn elementwise_product<V>(
    f: &FunctionNetwork<V>,
    g: &FunctionNetwork<V>,
    options: &TruncationOptions,
) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!("elementwise_product").entered();
    f.ensure_compatible(g)?;
    let fnet = f.network();
    let product = combine_vertexwise(fnet, g.network(), |v, ta, tb| {
        let sites = fnet.site_indices(v);
        let left: Vec<DynIndex> = sites.iter().map(DynIndex::sim).collect();
        let right: Vec<DynIndex> = sites.iter().map(DynIndex::sim).collect();
        let mut t = ta.replaceinds(&sites, &left);
        for ((s, l), r) in sites.iter().zip(&left).zip(&right) {
            t = t.contract(&TensorDynLen::delta(vec![s.clone(), l.clone(), r.clone()]));
        }
        Ok(t.contract(&tb.replaceinds(&sites, &right)))
    })?;
    debug!(
        max_bond_dim = product.max_bond_dim(),
        "product before truncation"
    );
    let product = if product.is_tree() {
        product.truncate(options)?
    } else {
        product
    };
    FunctionNetwork::new(product, f.map().clone())
}

/// Left-to-right product of all networks.
pub fn elementwise_product_all<V>(
    fs: &[FunctionNetwork<V>],
    options: &TruncationOptions,
) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let (first, rest) = fs.split_first().ok_or_else(|| {
        FunctionNetworkError::InvalidArgument("product of no networks".into())
    })?;
    rest.iter().try_fold(first.clone(), |acc, g| {
        elementwise_product(&acc, g, options)
    })

}

/// `A f`, truncated.
///
/// # Errors
/// [`FunctionNetworkError::NotATree`] if `f` has cycles, a mismatch error
/// if the operator lives on other vertices, edges or site indices.
pub fn apply_operator<V>(
    op: &LinearOperator<V>,
    f: &FunctionNetwork<V>,
    options: &TruncationOptions,
) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!("apply_operator").entered();
    if !f.network().is_tree() {
        return Err(FunctionNetworkError::NotATree);
    }
    let mpo = op.mpo();
    if mpo.node_names() != f.network().node_names() {
        return Err(FunctionNetworkError::VertexMismatch);
    }
    if mpo.edges() != f.network().edges() {
        return Err(FunctionNetworkError::EdgeMismatch);
    }
    let op_sites = op.site_index_network()?;
    for v in op_sites.node_names() {
        let mut expected = op_sites.site_space(&v).cloned().unwrap_or_default();
        let mut actual = f.network().site_indices(&v);
        expected.sort();
        actual.sort();
        if actual != expected {
            return Err(FunctionNetworkError::SiteIndexMismatch(format!("{:?}", v)));
        }
    }
    let result = apply_linear_operator(op, f.network(), options)?;
    debug!(max_bond_dim = result.max_bond_dim(), "applied operator");
    FunctionNetwork::new(result, f.map().clone())
}

/// Apply `ops` left to right, truncating after every step.
pub fn apply_operators<V>(
    ops: &[LinearOperator<V>],
    f: &FunctionNetwork<V>,
    options: &TruncationOptions,
) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    ops.iter()
        .try_fold(f.clone(), |acc, op| apply_operator(op, &acc, options))
}
