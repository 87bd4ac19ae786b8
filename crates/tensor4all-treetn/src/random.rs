//! Random tensor networks and random graphs.
//!
//! Provides utilities for creating random tensor networks and topologies,
//! useful for testing.

use crate::named_graph::Topology;
use crate::network::TensorNetwork;
use crate::site_index_network::SiteIndexNetwork;
use anyhow::{anyhow, Result};
use rand::Rng;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tensor4all_core::{DynIndex, TensorDynLen};

/// Specification for link (bond) dimensions.
///
/// Used when creating random tensor networks to specify the dimension of each bond.
#[derive(Debug, Clone)]
pub enum LinkSpace<V> {
    /// All links have the same dimension.
    Uniform(usize),
    /// Each edge has its own dimension.
    /// The map uses ordered pairs `(min(a, b), max(a, b))` as keys for consistency.
    PerEdge(HashMap<(V, V), usize>),
}

impl<V> LinkSpace<V> {
    /// Create a uniform link space where all bonds have the same dimension.
    pub fn uniform(dim: usize) -> Self {
        Self::Uniform(dim)
    }

    /// Create a per-edge link space from a map of edge dimensions.
    pub fn per_edge(dims: HashMap<(V, V), usize>) -> Self {
        Self::PerEdge(dims)
    }
}

impl<V: Clone + Ord + Hash> LinkSpace<V> {
    /// Get the dimension for an edge between two nodes.
    ///
    /// For `PerEdge`, the key is normalized to `(min(a, b), max(a, b))`.
    pub fn get(&self, a: &V, b: &V) -> Option<usize> {
        match self {
            LinkSpace::Uniform(dim) => Some(*dim),
            LinkSpace::PerEdge(map) => {
                let key = if a < b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                };
                map.get(&key).copied()
            }
        }
    }
}

/// Create a random f64 network from a site index network.
///
/// Every vertex tensor carries the vertex's site indices followed by its
/// link indices (ordered by neighbor), with standard normal entries.
///
/// # Example
/// ```
/// use tensor4all_treetn::{random_network_f64, LinkSpace, SiteIndexNetwork};
/// use tensor4all_core::DynIndex;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut sites = SiteIndexNetwork::new();
/// sites.add_node("A".to_string(), vec![DynIndex::new_dyn(2)]).unwrap();
/// sites.add_node("B".to_string(), vec![DynIndex::new_dyn(3)]).unwrap();
/// sites.add_edge(&"A".to_string(), &"B".to_string()).unwrap();
///
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// let net = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(4)).unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.max_bond_dim(), 4);
/// ```
pub fn random_network_f64<R, V>(
    rng: &mut R,
    site_network: &SiteIndexNetwork<V>,
    link_space: &LinkSpace<V>,
) -> Result<TensorNetwork<V>>
where
    R: Rng,
    V: Clone + Hash + Eq + Ord + Debug,
{
    random_network_impl(rng, site_network, link_space, false)
}

/// Create a random Complex64 network from a site index network.
///
/// Similar to [`random_network_f64`], with real and imaginary parts drawn
/// from the standard normal distribution.
pub fn random_network_c64<R, V>(
    rng: &mut R,
    site_network: &SiteIndexNetwork<V>,
    link_space: &LinkSpace<V>,
) -> Result<TensorNetwork<V>>
where
    R: Rng,
    V: Clone + Hash + Eq + Ord + Debug,
{
    random_network_impl(rng, site_network, link_space, true)
}

fn random_network_impl<R, V>(
    rng: &mut R,
    site_network: &SiteIndexNetwork<V>,
    link_space: &LinkSpace<V>,
    is_complex: bool,
) -> Result<TensorNetwork<V>>
where
    R: Rng,
    V: Clone + Hash + Eq + Ord + Debug,
{
    // Step 1: one link index per edge
    let mut link_indices: HashMap<(V, V), DynIndex> = HashMap::new();
    for (a, b) in site_network.edges() {
        let dim = link_space
            .get(&a, &b)
            .ok_or_else(|| anyhow!("LinkSpace has no dimension for edge {:?} - {:?}", a, b))?;
        link_indices.insert((a, b), DynIndex::new_link(dim));
    }

    // Step 2: one random tensor per vertex
    let mut net = TensorNetwork::new();
    for v in site_network.node_names() {
        let mut indices = site_network.site_space(&v).cloned().unwrap_or_default();
        for n in site_network.neighbors(&v) {
            let key = if v < n {
                (v.clone(), n)
            } else {
                (n, v.clone())
            };
            if let Some(l) = link_indices.get(&key) {
                indices.push(l.clone());
            }
        }
        let tensor = if is_complex {
            TensorDynLen::random_c64(rng, indices)
        } else {
            TensorDynLen::random_f64(rng, indices)
        };
        net.add_tensor(v, tensor)?;
    }

    // Step 3: connect
    let mut edges: Vec<_> = link_indices.into_iter().collect();
    edges.sort_by(|x, y| x.0.cmp(&y.0));
    for ((a, b), l) in edges {
        net.connect(&a, &b, l)?;
    }
    Ok(net)
}

/// Random labelled tree on vertices `0..n`.
///
/// Built as a random recursive tree (each new vertex attaches to a uniformly
/// chosen earlier one) under a random relabelling.
pub fn random_tree<R: Rng>(rng: &mut R, n: usize) -> Topology<usize> {
    let mut labels: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        labels.swap(i, j);
    }
    let mut g = Topology::new();
    for v in 0..n {
        let _ = g.add_node(v, ());
    }
    for k in 1..n {
        let parent = rng.gen_range(0..k);
        let _ = g.add_edge(&labels[parent], &labels[k], ());
    }
    g
}

/// Random connected graph: a [`random_tree`] plus up to `extra_edges`
/// additional edges, which generally close cycles.
pub fn random_connected_graph<R: Rng>(
    rng: &mut R,
    n: usize,
    extra_edges: usize,
) -> Topology<usize> {
    let mut g = random_tree(rng, n);
    let max_edges = n * n.saturating_sub(1) / 2;
    let mut added = 0;
    let mut attempts = 0;
    while added < extra_edges && g.edge_count() < max_edges && attempts < 100 * (extra_edges + 1) {
        attempts += 1;
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        if g.add_edge(&a, &b, ()).is_ok() {
            added += 1;
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::path_graph;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn binary_sites(n: usize) -> SiteIndexNetwork<usize> {
        SiteIndexNetwork::from_topology(&path_graph(n), |_| vec![DynIndex::new_dyn(2)]).unwrap()
    }

    #[test]
    fn test_random_network_f64_two_nodes() {
        let mut sites = SiteIndexNetwork::new();
        sites.add_node("A", vec![DynIndex::new_dyn(2)]).unwrap();
        sites.add_node("B", vec![DynIndex::new_dyn(3)]).unwrap();
        sites.add_edge(&"A", &"B").unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let net = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(4)).unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 1);
        assert!(!net.is_complex());
    }

    #[test]
    fn test_random_network_c64_chain() {
        let sites = binary_sites(3);
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        let net = random_network_c64(&mut rng, &sites, &LinkSpace::uniform(3)).unwrap();
        assert_eq!(net.edge_count(), 2);
        assert!(net.is_complex());
        let recovered = net.site_index_network().unwrap();
        assert!(recovered.share_equivalent_site_index_network(&sites));

    }

    #[test]
    fn test_link_space_per_edge() {
        let sites = SiteIndexNetwork::from_topology(&path_graph(3), |_| vec![]).unwrap();
        let dims = HashMap::from([((0, 1), 5), ((1, 2), 10)]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let net = random_network_f64(&mut rng, &sites, &LinkSpace::per_edge(dims)).unwrap();
        assert_eq!(net.link_index(&2, &1).map(DynIndex::dim), Some(10));
        assert_eq!(net.max_bond_dim(), 10);
    }

    #[test]
    fn test_link_space_missing_edge() {
        let sites = SiteIndexNetwork::from_topology(&path_graph(2), |_| vec![]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let space = LinkSpace::per_edge(HashMap::new());
        assert!(random_network_f64(&mut rng, &sites, &space).is_err());
    }

    #[test]
    fn test_random_tree_is_tree() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for n in 1..10 {
            assert!(random_tree(&mut rng, n).is_tree());
        }
    }

    #[test]
    fn test_random_connected_graph_has_cycles() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let g = random_connected_graph(&mut rng, 6, 3);
        assert!(g.is_connected());
        assert_eq!(g.edge_count(), 8);
        assert!(!g.is_tree());
    }
}
