//! Tensor networks representing functions of encoded coordinates.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use num_complex::Complex64;
use tensor4all_core::{AnyScalar, DynIndex};
use tensor4all_treetn::{TensorNetwork, TruncationOptions};

use crate::error::{FunctionNetworkError, Result};
use crate::index_map::IndexMap;
use crate::inds_network_map::IndsNetworkMap;

/// A tensor network together with the digit encoding of its site indices.
///
/// Fixing every site index to the digits of a coordinate tuple `x` and
/// contracting the network gives `f(x)`.
#[derive(Debug, Clone)]
pub struct FunctionNetwork<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    network: TensorNetwork<V>,
    map: IndsNetworkMap<V>,
}

impl<V> FunctionNetwork<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    /// Pair a network with the map of its site indices.
    ///
    /// # Errors
    /// Returns an error if the vertex sets differ or a vertex carries other
    /// site indices than the map assigns to it.
    pub fn new(network: TensorNetwork<V>, map: IndsNetworkMap<V>) -> Result<Self> {
        if network.node_names() != map.vertices() {
            return Err(FunctionNetworkError::VertexMismatch);
        }
        for v in map.vertices() {
            if !same_set(&network.site_indices(&v), &map.site_indices(&v)) {
                return Err(FunctionNetworkError::SiteIndexMismatch(format!("{:?}", v)));
            }
        }
        Ok(Self { network, map })
    }

    /// Underlying tensor network.
    pub fn network(&self) -> &TensorNetwork<V> {
        &self.network
    }

    /// Site index network and digit encoding.
    pub fn map(&self) -> &IndsNetworkMap<V> {
        &self.map
    }

    /// Digit encoding.
    pub fn index_map(&self) -> &IndexMap {
        self.map.index_map()
    }

    /// Split into network and map.
    pub fn into_parts(self) -> (TensorNetwork<V>, IndsNetworkMap<V>) {
        (self.network, self.map)
    }

    /// Largest link dimension.
    pub fn max_bond_dim(&self) -> usize {
        self.network.max_bond_dim()
    }

    /// Whether any tensor has complex storage.
    pub fn is_complex(&self) -> bool {
        self.network.is_complex()
    }

    /// Value at a full digit assignment.
    ///
    /// # Errors
    /// Returns [`FunctionNetworkError::MissingSiteValue`] if a site index
    /// has no value.
    pub fn evaluate_at(&self, assignment: &HashMap<DynIndex, usize>) -> Result<AnyScalar> {
        for v in self.network.node_names() {
            if let Some(s) = self
                .network
                .site_indices(&v)
                .into_iter()
                .find(|s| !assignment.contains_key(s))
            {
                return Err(FunctionNetworkError::MissingSiteValue(format!("{:?}", s)));
            }
        }
        Ok(self.network.evaluate(assignment)?)
    }

    /// Value at real coordinates `xs` along `dims`.
    ///
    /// Every dimension of the map must be listed.
    pub fn evaluate(&self, xs: &[f64], dims: &[usize]) -> Result<AnyScalar> {
        let assignment = self.index_map().calculate_ind_values(xs, dims)?;
        self.evaluate_at(&assignment)
    }

    /// Value at complex coordinates `zs` along `dims`.
    pub fn evaluate_complex(&self, zs: &[Complex64], dims: &[usize]) -> Result<AnyScalar> {
        let assignment = self.index_map().calculate_ind_values_complex(zs, dims)?;
        self.evaluate_at(&assignment)
    }

    /// Check that `other` lives on the same vertices, edges and site indices.
    pub fn ensure_compatible(&self, other: &Self) -> Result<()> {
        ensure_same_layout(&self.network, &other.network)
    }

    /// Pointwise sum `f + g`; bond dimensions add.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.ensure_compatible(other)?;
        let network = self.network.add(&other.network)?;
        Ok(Self {
            network,
            map: self.map.clone(),
        })
    }

    /// `s · f`.
    pub fn scale(&self, scalar: AnyScalar) -> Result<Self> {
        Ok(Self {
            network: self.network.scale(scalar)?,
            map: self.map.clone(),
        })
    }

    /// SVD truncation of the links.
    ///
    /// # Errors
    /// Returns [`FunctionNetworkError::NotATree`] on graphs with cycles.
    pub fn truncate(&self, options: &TruncationOptions) -> Result<Self> {
        if !self.network.is_tree() {
            return Err(FunctionNetworkError::NotATree);
        }
        Ok(Self {
            network: self.network.truncate(options)?,
            map: self.map.clone(),
        })
    }
}

fn same_set(a: &[DynIndex], b: &[DynIndex]) -> bool {
    let a: HashSet<&DynIndex> = a.iter().collect();
    let b: HashSet<&DynIndex> = b.iter().collect();
    a == b
}

/// Vertex, site index and edge agreement of two networks.
fn ensure_same_layout<V>(a: &TensorNetwork<V>, b: &TensorNetwork<V>) -> Result<()>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    if a.node_names() != b.node_names() {
        return Err(FunctionNetworkError::VertexMismatch);
    }
    for v in a.node_names() {
        if !same_set(&a.site_indices(&v), &b.site_indices(&v)) {
            return Err(FunctionNetworkError::SiteIndexMismatch(format!("{:?}", v)));
        }
    }
    if a.edges() != b.edges() {
        return Err(FunctionNetworkError::EdgeMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inds_network_map::continuous_siteinds;
    use tensor4all_core::TensorDynLen;
    use tensor4all_treetn::graphs::path_graph;

    /// f(x) = x on two binary digits, one per vertex.
    fn linear_function() -> FunctionNetwork<usize> {
        let map = continuous_siteinds(&path_graph(2), &[vec![0, 1]], 2).unwrap();
        let s0 = map.site_indices(&0)[0].clone();
        let s1 = map.site_indices(&1)[0].clone();
        let l = DynIndex::new_link(2);
        // t0[s0, l] = [s0/2, 1], t1[l, s1] = [1, s1/4]
        let t0 = TensorDynLen::from_dense_f64(vec![s0, l.clone()], vec![0.0, 1.0, 0.5, 1.0]);
        let t1 = TensorDynLen::from_dense_f64(vec![l, s1], vec![1.0, 1.0, 0.0, 0.25]);
        let net = TensorNetwork::from_tensors(vec![t0, t1], vec![0, 1]).unwrap();
        FunctionNetwork::new(net, map).unwrap()
    }

    #[test]
    fn test_evaluate_linear() {
        let f = linear_function();
        for x in [0.0, 0.25, 0.5, 0.75] {
            assert!((f.evaluate(&[x], &[1]).unwrap().real() - x).abs() < 1e-14);
        }
    }

    #[test]
    fn test_missing_site_value() {
        let f = linear_function();
        let err = f.evaluate_at(&HashMap::new()).unwrap_err();
        assert!(matches!(err, FunctionNetworkError::MissingSiteValue(_)));
    }

    #[test]
    fn test_add_and_scale() {
        let f = linear_function();
        let g = f.add(&f.scale(AnyScalar::new_real(2.0)).unwrap()).unwrap();
        assert_eq!(g.max_bond_dim(), 4);
        assert!((g.evaluate(&[0.75], &[1]).unwrap().real() - 2.25).abs() < 1e-14);
        let t = g.truncate(&TruncationOptions::new()).unwrap();
        assert!(t.max_bond_dim() <= 2);
        assert!((t.evaluate(&[0.5], &[1]).unwrap().real() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_network_must_match_map() {
        let f = linear_function();
        let other = continuous_siteinds(&path_graph(2), &[vec![0, 1]], 2).unwrap();
        let (net, _) = f.into_parts();
        assert!(matches!(
            FunctionNetwork::new(net, other),
            Err(FunctionNetworkError::SiteIndexMismatch(_))
        ));
    }
}
