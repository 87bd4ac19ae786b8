//! Named graph wrapper inspired by NamedGraphs.jl
//! (https://github.com/mtfishman/NamedGraphs.jl)
//!
//! Provides a mapping between arbitrary node name types (NodeName) and internal NodeIndex.
//! This allows using meaningful identifiers (coordinates, strings, etc.) instead of raw indices.
//!
//! All name-returning queries are sorted by `NodeName`, so iteration order
//! (and everything built on it) is reproducible.

use petgraph::algo::astar;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::DfsPostOrder;
use petgraph::Undirected;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

/// Generic undirected named graph (inspired by NamedGraphs.jl)
///
/// # Type Parameters
/// - `NodeName`: Node name type (must be Clone, Hash, Eq, Ord, Debug)
/// - `NodeData`: Node weight/data type
/// - `EdgeData`: Edge weight/data type
pub struct NamedGraph<NodeName, NodeData, EdgeData>
where
    NodeName: Clone + Hash + Eq + Ord + Debug,
{
    /// Internal graph structure (uses NodeIndex)
    graph: StableGraph<NodeData, EdgeData, Undirected>,

    /// Mapping: node name (NodeName) -> NodeIndex
    node_name_to_index: HashMap<NodeName, NodeIndex>,

    /// Reverse mapping: NodeIndex -> node name (NodeName)
    index_to_node_name: HashMap<NodeIndex, NodeName>,
}

/// Graph with names only (no node or edge data).
pub type Topology<NodeName> = NamedGraph<NodeName, (), ()>;

impl<NodeName, NodeData, EdgeData> NamedGraph<NodeName, NodeData, EdgeData>
where
    NodeName: Clone + Hash + Eq + Ord + Debug,
{
    /// Create a new empty NamedGraph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::with_capacity(0, 0),
            node_name_to_index: HashMap::new(),
            index_to_node_name: HashMap::new(),
        }
    }

    /// Add a node with the given name and data.
    ///
    /// Returns an error if the node already exists.
    pub fn add_node(&mut self, node_name: NodeName, data: NodeData) -> Result<NodeIndex, String> {
        if self.node_name_to_index.contains_key(&node_name) {
            return Err(format!("Node already exists: {:?}", node_name));
        }
        let node = self.graph.add_node(data);
        self.node_name_to_index.insert(node_name.clone(), node);
        self.index_to_node_name.insert(node, node_name);
        Ok(node)
    }

    /// Check if a node exists.
    pub fn has_node(&self, node_name: &NodeName) -> bool {
        self.node_name_to_index.contains_key(node_name)
    }

    /// Get the NodeIndex for a node name.
    pub fn node_index(&self, node_name: &NodeName) -> Option<NodeIndex> {
        self.node_name_to_index.get(node_name).copied()
    }

    /// Get the node name for a NodeIndex.
    pub fn node_name(&self, node: NodeIndex) -> Option<&NodeName> {
        self.index_to_node_name.get(&node)
    }

    /// Get a reference to the data of a node.
    pub fn node_data(&self, node_name: &NodeName) -> Option<&NodeData> {
        self.node_name_to_index
            .get(node_name)
            .and_then(|node| self.graph.node_weight(*node))
    }

    /// Get a mutable reference to the data of a node.
    pub fn node_data_mut(&mut self, node_name: &NodeName) -> Option<&mut NodeData> {
        self.node_name_to_index
            .get(node_name)
            .and_then(|node| self.graph.node_weight_mut(*node))
    }

    /// Add an edge between two nodes.
    ///
    /// Returns an error if either node doesn't exist, for self loops and for
    /// duplicate edges.
    pub fn add_edge(
        &mut self,
        n1: &NodeName,
        n2: &NodeName,
        weight: EdgeData,
    ) -> Result<EdgeIndex, String> {
        let node1 = self
            .node_name_to_index
            .get(n1)
            .ok_or_else(|| format!("Node not found: {:?}", n1))?;
        let node2 = self
            .node_name_to_index
            .get(n2)
            .ok_or_else(|| format!("Node not found: {:?}", n2))?;
        if node1 == node2 {
            return Err(format!("Self loop at {:?}", n1));
        }
        if self.graph.find_edge(*node1, *node2).is_some() {
            return Err(format!("Edge already exists: {:?} - {:?}", n1, n2));
        }
        Ok(self.graph.add_edge(*node1, *node2, weight))
    }

    /// Check whether `n1` and `n2` are adjacent.
    pub fn has_edge(&self, n1: &NodeName, n2: &NodeName) -> bool {
        self.edge_weight(n1, n2).is_some()
    }

    /// Get the weight of an edge between two nodes.
    pub fn edge_weight(&self, n1: &NodeName, n2: &NodeName) -> Option<&EdgeData> {
        let node1 = self.node_name_to_index.get(n1)?;
        let node2 = self.node_name_to_index.get(n2)?;
        self.graph
            .find_edge(*node1, *node2)
            .and_then(|edge| self.graph.edge_weight(edge))
    }

    /// Get a mutable reference to the weight of an edge between two nodes.
    pub fn edge_weight_mut(&mut self, n1: &NodeName, n2: &NodeName) -> Option<&mut EdgeData> {
        let node1 = self.node_name_to_index.get(n1)?;
        let node2 = self.node_name_to_index.get(n2)?;
        self.graph
            .find_edge(*node1, *node2)
            .and_then(|edge| self.graph.edge_weight_mut(edge))
    }

    /// Get all neighbors of a node, sorted.
    pub fn neighbors(&self, node_name: &NodeName) -> Vec<NodeName> {
        let mut result: Vec<NodeName> = self
            .node_name_to_index
            .get(node_name)
            .map(|node| {
                self.graph
                    .neighbors(*node)
                    .filter_map(|n| self.index_to_node_name.get(&n).cloned())
                    .collect()
            })
            .unwrap_or_default();
        result.sort();
        result
    }

    /// Number of neighbors of a node.
    pub fn degree(&self, node_name: &NodeName) -> usize {
        self.neighbors(node_name).len()
    }

    /// Get all node names, sorted.
    pub fn node_names(&self) -> Vec<NodeName> {
        let mut names: Vec<NodeName> = self.node_name_to_index.keys().cloned().collect();
        names.sort();
        names
    }

    /// All edges as `(min, max)` name pairs, sorted.
    pub fn edges(&self) -> Vec<(NodeName, NodeName)> {
        let mut edges: Vec<(NodeName, NodeName)> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                let a = self.index_to_node_name.get(&a)?.clone();
                let b = self.index_to_node_name.get(&b)?.clone();
                Some(if a < b { (a, b) } else { (b, a) })
            })
            .collect();
        edges.sort();
        edges
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_name_to_index.len()
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get a reference to the internal graph.
    ///
    /// This allows direct access to petgraph algorithms that work with NodeIndex.
    pub fn graph(&self) -> &StableGraph<NodeData, EdgeData, Undirected> {
        &self.graph
    }

    /// Connected components, each sorted, ordered by their smallest member.
    pub fn connected_components(&self) -> Vec<Vec<NodeName>> {
        let mut seen: HashSet<NodeName> = HashSet::new();
        let mut components = Vec::new();
        for start in self.node_names() {
            if seen.contains(&start) {
                continue;
            }
            let mut component: Vec<NodeName> =
                self.bfs_order(&start).into_iter().map(|(v, _)| v).collect();
            seen.extend(component.iter().cloned());
            component.sort();
            components.push(component);
        }
        components
    }

    /// Check whether the graph is connected. The empty graph counts as connected.
    pub fn is_connected(&self) -> bool {
        self.connected_components().len() <= 1
    }

    /// Check whether the graph is a tree (connected and acyclic).
    pub fn is_tree(&self) -> bool {
        self.node_count() > 0 && self.is_connected() && self.edge_count() + 1 == self.node_count()
    }

    /// Breadth-first traversal from `root`, visiting neighbors in sorted order.
    ///
    /// Returns `(node, parent)` pairs in visiting order; the root has no
    /// parent. Only the component of `root` is visited.
    pub fn bfs_order(&self, root: &NodeName) -> Vec<(NodeName, Option<NodeName>)> {
        let mut order = Vec::new();
        if !self.has_node(root) {
            return order;
        }
        let mut visited: HashSet<NodeName> = HashSet::from([root.clone()]);
        let mut queue = VecDeque::from([(root.clone(), None)]);
        while let Some((v, parent)) = queue.pop_front() {
            for n in self.neighbors(&v) {
                if visited.insert(n.clone()) {
                    queue.push_back((n, Some(v.clone())));
                }
            }
            order.push((v, parent));
        }
        order
    }

    /// Perform a post-order DFS traversal starting from the given root node.
    ///
    /// Returns node names in post-order (children before parents, leaves first),
    /// or `None` if root doesn't exist.
    pub fn post_order_dfs(&self, root: &NodeName) -> Option<Vec<NodeName>> {
        let root_idx = self.node_index(root)?;
        let mut dfs = DfsPostOrder::new(&self.graph, root_idx);
        let mut result = Vec::new();
        while let Some(node_idx) = dfs.next(&self.graph) {
            if let Some(name) = self.node_name(node_idx) {
                result.push(name.clone());
            }
        }
        Some(result)
    }

    /// Find the shortest path between two nodes (inclusive of both ends).
    ///
    /// Uses A* with unit edge weights and no heuristic.
    pub fn path_between(&self, from: &NodeName, to: &NodeName) -> Option<Vec<NodeName>> {
        let from_idx = self.node_index(from)?;
        let to_idx = self.node_index(to)?;
        if from_idx == to_idx {
            return Some(vec![from.clone()]);
        }
        let (_, path) = astar(
            &self.graph,
            from_idx,
            |n| n == to_idx,
            |_| 1usize,
            |_| 0usize,
        )?;
        Some(
            path.into_iter()
                .filter_map(|n| self.node_name(n).cloned())
                .collect(),
        )

    }

    /// Neighbor of `from` on a shortest path toward `target`.
    ///
    /// Returns `None` if `from == target` or if `target` is unreachable.
    pub fn edge_toward_vertex(&self, from: &NodeName, target: &NodeName) -> Option<NodeName> {
        self.path_between(from, target)
            .and_then(|path| path.get(1).cloned())
    }

    /// Spanning tree obtained by breadth-first search from `root`.
    ///
    /// Keeps every node (with its data) and only the BFS tree edges. Nodes
    /// outside the component of `root` stay isolated.
    pub fn bfs_spanning_tree(&self, root: &NodeName) -> Result<Self, String>
    where
        NodeData: Clone,
        EdgeData: Clone,
    {
        if !self.has_node(root) {
            return Err(format!("Node not found: {:?}", root));
        }
        let mut tree = self.map_nodes(|_, d| d.clone());
        tree.graph.clear_edges();
        for (v, parent) in self.bfs_order(root) {
            if let Some(p) = parent {
                let w = self
                    .edge_weight(&p, &v)
                    .cloned()
                    .ok_or_else(|| format!("Missing edge {:?} - {:?}", p, v))?;
                tree.add_edge(&p, &v, w)?;
            }
        }
        Ok(tree)
    }

    /// Same names and edges with node data transformed by `f`.
    pub fn map_nodes<N2>(
        &self,
        f: impl Fn(&NodeName, &NodeData) -> N2,
    ) -> NamedGraph<NodeName, N2, EdgeData>
    where
        EdgeData: Clone,
    {
        let graph = self.graph.map(
            |idx, data| {
                let name = &self.index_to_node_name[&idx];
                f(name, data)
            },
            |_, e| e.clone(),
        );
        NamedGraph {
            graph,
            node_name_to_index: self.node_name_to_index.clone(),
            index_to_node_name: self.index_to_node_name.clone(),
        }
    }

    /// Topology only (names and edges, no data).
    pub fn topology(&self) -> Topology<NodeName> {
        let graph = self.graph.map(|_, _| (), |_, _| ());
        NamedGraph {
            graph,
            node_name_to_index: self.node_name_to_index.clone(),
            index_to_node_name: self.index_to_node_name.clone(),
        }
    }

    /// Check whether both graphs have the same node names and edges.
    pub fn same_topology<N2, E2>(&self, other: &NamedGraph<NodeName, N2, E2>) -> bool {
        self.node_names() == other.node_names() && self.edges() == other.edges()
    }
}

impl<NodeName, NodeData, EdgeData> Default for NamedGraph<NodeName, NodeData, EdgeData>
where
    NodeName: Clone + Hash + Eq + Ord + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<NodeName, NodeData, EdgeData> Clone for NamedGraph<NodeName, NodeData, EdgeData>
where
    NodeName: Clone + Hash + Eq + Ord + Debug,
    NodeData: Clone,
    EdgeData: Clone,
{
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            node_name_to_index: self.node_name_to_index.clone(),
            index_to_node_name: self.index_to_node_name.clone(),
        }
    }
}

impl<NodeName, NodeData, EdgeData> Debug for NamedGraph<NodeName, NodeData, EdgeData>
where
    NodeName: Clone + Hash + Eq + Ord + Debug,
    NodeData: Debug,
    EdgeData: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedGraph")
            .field("nodes", &self.node_names())
            .field("edges", &self.edges())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle4() -> Topology<usize> {
        let mut g = Topology::new();
        for v in 0..4 {
            g.add_node(v, ()).unwrap();
        }
        for v in 0..4 {
            g.add_edge(&v, &((v + 1) % 4), ()).unwrap();
        }
        g
    }

    #[test]
    fn test_named_graph_basic() {
        let mut g: NamedGraph<String, i32, ()> = NamedGraph::new();
        g.add_node("A".to_string(), 1).unwrap();
        g.add_node("B".to_string(), 2).unwrap();
        g.add_node("C".to_string(), 3).unwrap();
        assert!(g.add_node("A".to_string(), 4).is_err());

        g.add_edge(&"A".to_string(), &"B".to_string(), ()).unwrap();
        g.add_edge(&"B".to_string(), &"C".to_string(), ()).unwrap();
        assert!(g.add_edge(&"C".to_string(), &"B".to_string(), ()).is_err());
        assert!(g.add_edge(&"C".to_string(), &"C".to_string(), ()).is_err());

        assert_eq!(g.edge_count(), 2);
        assert_eq!(
            g.neighbors(&"B".to_string()),
            vec!["A".to_string(), "C".to_string()]
        );
        assert_eq!(g.node_data(&"B".to_string()), Some(&2));
        assert!(g.is_tree());
    }

    #[test]
    fn test_cycle_is_not_tree() {
        let g = cycle4();
        assert!(g.is_connected());
        assert!(!g.is_tree());
        assert_eq!(g.edges(), vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
    }

    #[test]
    fn test_bfs_spanning_tree_of_cycle() {
        let g = cycle4();
        let t = g.bfs_spanning_tree(&0).unwrap();
        assert!(t.is_tree());
        assert_eq!(t.node_count(), 4);
        // BFS from 0 visits 1 and 3 first, then 2 via 1
        assert_eq!(t.edges(), vec![(0, 1), (0, 3), (1, 2)]);
    }

    #[test]
    fn test_components_and_paths() {
        let mut g = cycle4();
        g.add_node(10, ()).unwrap();
        assert_eq!(g.connected_components(), vec![vec![0, 1, 2, 3], vec![10]]);
        assert!(!g.is_connected());
        assert_eq!(g.path_between(&0, &2).map(|p| p.len()), Some(3));
        assert_eq!(g.path_between(&0, &10), None);
        assert_eq!(g.edge_toward_vertex(&1, &1), None);
        assert_eq!(g.edge_toward_vertex(&1, &0), Some(0));
    }

    #[test]
    fn test_post_order_leaves_first() {
        let mut g: Topology<&str> = Topology::new();
        for v in ["root", "a", "b"] {
            g.add_node(v, ()).unwrap();
        }
        g.add_edge(&"root", &"a", ()).unwrap();
        g.add_edge(&"root", &"b", ()).unwrap();
        let order = g.post_order_dfs(&"root").unwrap();
        assert_eq!(order.len(), 3);
        assert_eq!(order.last(), Some(&"root"));
    }

    #[test]
    fn test_map_nodes_preserves_topology() {
        let g = cycle4();
        let m = g.map_nodes(|v, _| *v * 10);
        assert_eq!(m.node_data(&3), Some(&30));
        assert!(m.same_topology(&g));
    }
}
