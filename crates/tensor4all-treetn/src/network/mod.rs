//! Tensor networks on named graphs.
//!
//! A [`TensorNetwork`] holds one tensor per vertex and one link index per
//! edge. Each link index appears in exactly the two tensors at the ends of
//! its edge; all remaining indices of a vertex tensor are its site indices.
//! Arbitrary graphs (including cycles) are allowed; operations that need a
//! tree check for it.

mod addition;
mod contraction;
mod ops;
mod truncate;

pub use ops::{combine_vertexwise, LinkPair};

use anyhow::{anyhow, ensure, Context, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::{AnyScalar, DynIndex, TensorDynLen};

use crate::named_graph::{NamedGraph, Topology};
use crate::site_index_network::SiteIndexNetwork;

/// Tensor network with one tensor per named vertex.
///
/// Edge data is the link index shared by the two endpoint tensors.
#[derive(Debug, Clone)]
pub struct TensorNetwork<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    pub(crate) graph: NamedGraph<V, TensorDynLen, DynIndex>,
}

impl<V> TensorNetwork<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    /// Create an empty network.
    pub fn new() -> Self {
        Self {
            graph: NamedGraph::new(),
        }
    }

    /// Build a network from tensors, connecting tensors that share an index.
    ///
    /// An index appearing in exactly two tensors becomes the link of an edge
    /// between them. An index appearing in one tensor is a site index.
    ///
    /// # Errors
    /// Returns an error if the lengths differ, a name is repeated, an index
    /// is shared by more than two tensors, or two tensors share more than
    /// one index.
    pub fn from_tensors(tensors: Vec<TensorDynLen>, node_names: Vec<V>) -> Result<Self> {
        ensure!(
            tensors.len() == node_names.len(),
            "from_tensors: {} tensors but {} node names",
            tensors.len(),
            node_names.len()
        );

        // Index -> nodes holding it, in insertion order
        let mut owners: HashMap<DynIndex, Vec<V>> = HashMap::new();
        for (tensor, name) in tensors.iter().zip(&node_names) {
            for idx in &tensor.indices {
                owners.entry(idx.clone()).or_default().push(name.clone());
            }
        }

        let mut net = Self::new();
        for (tensor, name) in tensors.into_iter().zip(node_names) {
            net.add_tensor(name, tensor)?;
        }

        let mut shared: Vec<(DynIndex, Vec<V>)> =
            owners.into_iter().filter(|(_, o)| o.len() > 1).collect();
        shared.sort_by(|a, b| a.0.cmp(&b.0));
        for (idx, nodes) in shared {
            match nodes.as_slice() {
                [a, b] => net
                    .connect(a, b, idx.clone())
                    .with_context(|| format!("from_tensors: failed to connect via {:?}", idx))?,
                _ => {
                    return Err(anyhow!(
                        "from_tensors: index {:?} appears in {} tensors (at most 2 allowed)",
                        idx,
                        nodes.len()
                    ))
                }
            }
        }
        Ok(net)
    }

    /// Add an isolated vertex holding `tensor`.
    pub fn add_tensor(&mut self, name: V, tensor: TensorDynLen) -> Result<()> {
        self.graph
            .add_node(name, tensor)
            .map_err(|e| anyhow!(e))
            .context("add_tensor")?;
        Ok(())
    }

    /// Connect two vertices through `link`, which both tensors must carry.
    pub fn connect(&mut self, a: &V, b: &V, link: DynIndex) -> Result<()> {
        for v in [a, b] {
            let t = self
                .tensor(v)
                .ok_or_else(|| anyhow!("connect: node {:?} not found", v))?;
            ensure!(
                t.has_index(&link),
                "connect: tensor at {:?} lacks link {:?}",
                v,
                link
            );
        }
        self.graph
            .add_edge(a, b, link)
            .map_err(|e| anyhow!(e))
            .context("connect")?;
        Ok(())
    }

    /// Tensor at a vertex.
    pub fn tensor(&self, v: &V) -> Option<&TensorDynLen> {
        self.graph.node_data(v)
    }

    /// Replace the tensor at a vertex.
    ///
    /// The new tensor must carry the link indices of every incident edge.
    pub fn set_tensor(&mut self, v: &V, tensor: TensorDynLen) -> Result<()> {
        for link in self.link_indices(v) {
            ensure!(
                tensor.has_index(&link),
                "set_tensor: new tensor at {:?} lacks link {:?}",
                v,
                link
            );
        }
        let slot = self
            .graph
            .node_data_mut(v)
            .ok_or_else(|| anyhow!("set_tensor: node {:?} not found", v))?;
        *slot = tensor;
        Ok(())
    }

    /// Link index of the edge `a - b`.
    pub fn link_index(&self, a: &V, b: &V) -> Option<&DynIndex> {
        self.graph.edge_weight(a, b)
    }

    /// Link indices of a vertex, ordered by neighbor name.
    pub fn link_indices(&self, v: &V) -> Vec<DynIndex> {
        self.graph
            .neighbors(v)
            .iter()
            .filter_map(|n| self.link_index(v, n).cloned())
            .collect()
    }

    /// Site indices of a vertex in tensor order.
    pub fn site_indices(&self, v: &V) -> Vec<DynIndex> {
        let links = self.link_indices(v);
        self.tensor(v)
            .map(|t| {
                t.indices
                    .iter()
                    .filter(|i| !links.contains(i))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Graph with the site indices of every vertex.
    pub fn site_index_network(&self) -> Result<SiteIndexNetwork<V>> {
        let mut net = SiteIndexNetwork::new();
        for v in self.node_names() {
            let sites = self.site_indices(&v);
            net.add_node(v, sites).map_err(|e| anyhow!(e))?;
        }
        for (a, b) in self.edges() {
            net.add_edge(&a, &b).map_err(|e| anyhow!(e))?;
        }
        Ok(net)
    }

    /// Check if a vertex exists.
    pub fn has_node(&self, v: &V) -> bool {
        self.graph.has_node(v)
    }

    /// Sorted vertex names.
    pub fn node_names(&self) -> Vec<V> {
        self.graph.node_names()
    }

    /// Number of vertices.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sorted `(min, max)` edges.
    pub fn edges(&self) -> Vec<(V, V)> {
        self.graph.edges()
    }

    /// Sorted neighbors of a vertex.
    pub fn neighbors(&self, v: &V) -> Vec<V> {
        self.graph.neighbors(v)
    }

    /// Check whether the graph is a tree.
    pub fn is_tree(&self) -> bool {
        self.graph.is_tree()
    }

    /// Topology only.
    pub fn topology(&self) -> Topology<V> {
        self.graph.topology()
    }

    /// The underlying named graph.
    pub fn graph(&self) -> &NamedGraph<V, TensorDynLen, DynIndex> {
        &self.graph
    }

    /// Dimension of every link, keyed by sorted edge.
    pub fn bond_dims(&self) -> Vec<((V, V), usize)> {
        self.edges()
            .into_iter()
            .filter_map(|(a, b)| {
                let d = self.link_index(&a, &b)?.dim();
                Some(((a, b), d))
            })
            .collect()
    }

    /// Largest link dimension (1 for a network without edges).
    pub fn max_bond_dim(&self) -> usize {
        self.bond_dims()
            .into_iter()
            .map(|(_, d)| d)
            .max()
            .unwrap_or(1)
    }

    /// Whether any tensor holds complex data.
    pub fn is_complex(&self) -> bool {
        self.node_names()
            .iter()
            .any(|v| self.tensor(v).is_some_and(TensorDynLen::is_complex))
    }

    /// Copy with every link index replaced by a fresh one of equal dimension.
    pub fn sim_link_indices(&self) -> Self {
        let mut result = self.clone();
        for (a, b) in self.edges() {
            let Some(old) = self.link_index(&a, &b).cloned() else {
                continue;
            };
            let new = old.sim();
            for v in [&a, &b] {
                if let Some(t) = result.graph.node_data_mut(v) {
                    *t = t.replaceind(&old, &new);
                }
            }
            if let Some(w) = result.graph.edge_weight_mut(&a, &b) {
                *w = new;
            }
        }
        result
    }

    /// Copy with the tensor at `v` multiplied by `scalar`.
    pub fn scale_vertex(&self, v: &V, scalar: AnyScalar) -> Result<Self> {
        let mut result = self.clone();
        let t = result
            .graph
            .node_data_mut(v)
            .ok_or_else(|| anyhow!("scale_vertex: node {:?} not found", v))?;
        *t = t.scale(scalar);
        Ok(result)
    }

    /// Copy representing `scalar` times this network.
    ///
    /// The factor is absorbed by the first vertex in sorted order.
    pub fn scale(&self, scalar: AnyScalar) -> Result<Self> {
        let first = self
            .node_names()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("scale: empty network"))?;
        self.scale_vertex(&first, scalar)
    }
}

impl<V> Default for TensorNetwork<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
