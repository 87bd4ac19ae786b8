//! Site Index Network (inspired by ITensorNetworks.jl's IndsNetwork)
//!
//! Combines a graph topology with the physical (site) indices living at each
//! node. It describes the index structure of a tensor network independently
//! of tensor data.

use crate::named_graph::{NamedGraph, Topology};
use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use tensor4all_core::DynIndex;

/// Site Index Network (inspired by ITensorNetworks.jl's IndsNetwork)
///
/// Site indices are kept in insertion order per node. An index may live at
/// most at one node.
#[derive(Debug, Clone)]
pub struct SiteIndexNetwork<NodeName>
where
    NodeName: Clone + Hash + Eq + Ord + Debug,
{
    graph: NamedGraph<NodeName, Vec<DynIndex>, ()>,
}

impl<NodeName> SiteIndexNetwork<NodeName>
where
    NodeName: Clone + Hash + Eq + Ord + Debug,
{
    /// Create a new empty SiteIndexNetwork.
    pub fn new() -> Self {
        Self {
            graph: NamedGraph::new(),
        }
    }

    /// Build from a topology, creating the site indices of each node with `sites`.
    pub fn from_topology(
        topology: &Topology<NodeName>,
        mut sites: impl FnMut(&NodeName) -> Vec<DynIndex>,
    ) -> Result<Self, String> {
        let mut net = Self::new();
        for v in topology.node_names() {
            let inds = sites(&v);
            net.add_node(v, inds)?;
        }
        for (a, b) in topology.edges() {
            net.add_edge(&a, &b)?;
        }
        Ok(net)
    }

    /// Add a node with its site indices.
    ///
    /// Returns an error if the node already exists or if an index already
    /// lives at another node.
    pub fn add_node(
        &mut self,
        node_name: NodeName,
        site_space: Vec<DynIndex>,
    ) -> Result<NodeIndex, String> {
        for idx in &site_space {
            if let Some(owner) = self.find_node_by_index(idx) {
                return Err(format!(
                    "Index {:?} already lives at node {:?}",
                    idx, owner
                ));
            }
        }
        let unique: HashSet<&DynIndex> = site_space.iter().collect();
        if unique.len() != site_space.len() {
            return Err(format!("Duplicate site index at node {:?}", node_name));
        }
        self.graph.add_node(node_name, site_space)
    }

    /// Add an edge between two nodes.
    pub fn add_edge(&mut self, n1: &NodeName, n2: &NodeName) -> Result<EdgeIndex, String> {
        self.graph.add_edge(n1, n2, ())
    }

    /// Check if a node exists.
    pub fn has_node(&self, node_name: &NodeName) -> bool {
        self.graph.has_node(node_name)
    }

    /// Site indices of a node.
    pub fn site_space(&self, node_name: &NodeName) -> Option<&Vec<DynIndex>> {
        self.graph.node_data(node_name)
    }

    /// Node holding `index`, if any.
    pub fn find_node_by_index(&self, index: &DynIndex) -> Option<NodeName> {
        self.graph
            .node_names()
            .into_iter()
            .find(|v| self.site_space(v).is_some_and(|s| s.contains(index)))
    }

    /// All site indices, grouped by node in sorted node order.
    pub fn all_site_indices(&self) -> Vec<DynIndex> {
        self.graph
            .node_names()
            .iter()
            .flat_map(|v| self.site_space(v).cloned().unwrap_or_default())
            .collect()
    }

    /// Get all node names, sorted.
    pub fn node_names(&self) -> Vec<NodeName> {
        self.graph.node_names()
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges as sorted `(min, max)` pairs.
    pub fn edges(&self) -> Vec<(NodeName, NodeName)> {
        self.graph.edges()
    }

    /// Sorted neighbors of a node.
    pub fn neighbors(&self, node_name: &NodeName) -> Vec<NodeName> {
        self.graph.neighbors(node_name)
    }

    /// Check whether the topology is a tree.
    pub fn is_tree(&self) -> bool {
        self.graph.is_tree()
    }

    /// The underlying named graph.
    pub fn graph(&self) -> &NamedGraph<NodeName, Vec<DynIndex>, ()> {
        &self.graph
    }

    /// Topology only.
    pub fn topology(&self) -> Topology<NodeName> {
        self.graph.topology()
    }

    /// Same site indices restricted to the BFS spanning tree rooted at `root`.
    pub fn bfs_spanning_tree(&self, root: &NodeName) -> Result<Self, String> {
        Ok(Self {
            graph: self.graph.bfs_spanning_tree(root)?,
        })
    }

    /// Check whether both networks have the same topology and the same site
    /// indices (as sets) at every node.
    pub fn share_equivalent_site_index_network(&self, other: &Self) -> bool {
        if !self.graph.same_topology(&other.graph) {
            return false;
        }
        self.node_names().iter().all(|v| {
            let a: HashSet<&DynIndex> = self.site_space(v).into_iter().flatten().collect();
            let b: HashSet<&DynIndex> = other.site_space(v).into_iter().flatten().collect();
            a == b
        })
    }
}

impl<NodeName> Default for SiteIndexNetwork<NodeName>
where
    NodeName: Clone + Hash + Eq + Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}
