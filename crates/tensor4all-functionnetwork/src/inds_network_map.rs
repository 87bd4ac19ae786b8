//! Site index networks paired with their digit encoding.

use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::DynIndex;
use tensor4all_treetn::{SiteIndexNetwork, Topology};

use crate::error::{FunctionNetworkError, Result};
use crate::index_map::{DigitSpec, IndexMap, Part, ScalarDomain};

/// A [`SiteIndexNetwork`] whose site indices are the digits of an [`IndexMap`].
///
/// Every index of the map lives at exactly one vertex and every site index
/// of the network is known to the map. The vertices holding one dimension's
/// digits need not form a connected subgraph.
#[derive(Debug, Clone)]
pub struct IndsNetworkMap<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    sites: SiteIndexNetwork<V>,
    index_map: IndexMap,
}

impl<V> IndsNetworkMap<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    /// Pair a site network with an index map.
    ///
    /// # Errors
    /// Returns [`FunctionNetworkError::InvalidIndexMap`] if a site index is
    /// unknown to the map or a map index is not a site index.
    pub fn new(sites: SiteIndexNetwork<V>, index_map: IndexMap) -> Result<Self> {
        let all = sites.all_site_indices();
        if let Some(s) = all.iter().find(|s| !index_map.contains(s)) {
            return Err(FunctionNetworkError::InvalidIndexMap(format!(
                "site index {:?} is not in the map",
                s
            )));
        }
        if all.len() != index_map.len() {
            return Err(FunctionNetworkError::InvalidIndexMap(format!(
                "{} map indices but {} site indices",
                index_map.len(),
                all.len()
            )));
        }
        Ok(Self { sites, index_map })
    }

    /// Site index network.
    pub fn sites(&self) -> &SiteIndexNetwork<V> {
        &self.sites
    }

    /// Digit encoding.
    pub fn index_map(&self) -> &IndexMap {
        &self.index_map
    }

    /// Graph topology.
    pub fn topology(&self) -> Topology<V> {
        self.sites.topology()
    }

    /// Vertex names, sorted.
    pub fn vertices(&self) -> Vec<V> {
        self.sites.node_names()
    }

    /// Site indices of a vertex.
    pub fn site_indices(&self, v: &V) -> Vec<DynIndex> {
        self.sites.site_space(v).cloned().unwrap_or_default()
    }

    /// Whether the graph is a tree.
    pub fn is_tree(&self) -> bool {
        self.sites.is_tree()
    }

    /// Whether coordinates are complex.
    pub fn is_complex(&self) -> bool {
        self.index_map.is_complex()
    }

    /// Vertex holding `index`.
    pub fn vertex_of(&self, index: &DynIndex) -> Option<V> {
        self.sites.find_node_by_index(index)
    }

    /// Vertices holding digits of `dimension`, in digit order, each once.
    pub fn dimension_vertices(&self, dimension: usize) -> Vec<V> {
        let mut out: Vec<V> = Vec::new();
        for index in self.index_map.dimension_indices(dimension) {
            if let Some(v) = self.vertex_of(&index) {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
        }
        out
    }

    /// Vertex of the most significant digit of `dimension`.
    ///
    /// The real-part digit 1 when present, else the imaginary-part digit 1.
    pub fn leading_vertex(&self, dimension: usize) -> Result<V> {
        self.index_map
            .dimension_indices(dimension)
            .first()
            .and_then(|i| self.vertex_of(i))
            .ok_or(FunctionNetworkError::UnknownDimension(dimension))
    }

    /// Same indices on the breadth-first spanning tree rooted at `root`.
    pub fn bfs_spanning_tree(&self, root: &V) -> Result<Self> {
        let sites = self
            .sites
            .bfs_spanning_tree(root)
            .map_err(FunctionNetworkError::InvalidArgument)?;
        Ok(Self {
            sites,
            index_map: self.index_map.clone(),
        })
    }
}

fn checked_topology<V>(graph: &Topology<V>, dimension_vertices: &[Vec<V>]) -> Result<()>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    for list in dimension_vertices {
        if let Some(v) = list.iter().find(|v| !graph.has_node(v)) {
            return Err(FunctionNetworkError::InvalidArgument(format!(
                "vertex {:?} is not in the graph",
                v
            )));
        }
    }
    Ok(())
}

fn build<V>(
    graph: &Topology<V>,
    base: usize,
    domain: ScalarDomain,
    entries: Vec<(V, DynIndex, DigitSpec)>,
) -> Result<IndsNetworkMap<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let sites = SiteIndexNetwork::from_topology(graph, |v| {
        entries
            .iter()
            .filter(|(w, _, _)| w == v)
            .map(|(_, i, _)| i.clone())
            .collect()
    })
    .map_err(FunctionNetworkError::InvalidArgument)?;
    let index_map = IndexMap::new(
        base,
        domain,
        entries.into_iter().map(|(_, i, spec)| (i, spec)),
    )?;
    IndsNetworkMap::new(sites, index_map)
}

/// Digit indices of size `base` for real coordinates on `graph`.
///
/// `dimension_vertices[d - 1]` lists, most significant first, the vertex of
/// each digit of dimension `d`. A vertex may hold several digits; vertices
/// not listed get no site index. Indices are tagged `d=<dim>,n=<digit>`.
pub fn continuous_siteinds<V>(
    graph: &Topology<V>,
    dimension_vertices: &[Vec<V>],
    base: usize,
) -> Result<IndsNetworkMap<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    checked_topology(graph, dimension_vertices)?;
    let mut entries = Vec::new();
    for (d, list) in dimension_vertices.iter().enumerate() {
        for (n, v) in list.iter().enumerate() {
            let tags = format!("d={},n={}", d + 1, n + 1);
            entries.push((
                v.clone(),
                DynIndex::new_dyn_with_tag(base, &tags),
                DigitSpec::real(d + 1, n + 1),
            ));
        }
    }
    build(graph, base, ScalarDomain::Real, entries)
}

/// Digit indices for complex coordinates: each listed vertex holds one
/// real-part and one imaginary-part digit of the same level.
pub fn complex_continuous_siteinds<V>(
    graph: &Topology<V>,
    dimension_vertices: &[Vec<V>],
    base: usize,
) -> Result<IndsNetworkMap<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    checked_topology(graph, dimension_vertices)?;
    let mut entries = Vec::new();
    for (d, list) in dimension_vertices.iter().enumerate() {
        for (n, v) in list.iter().enumerate() {
            for (part, tag) in [(Part::Real, "re"), (Part::Imaginary, "im")] {
                let tags = format!("d={},n={},{}", d + 1, n + 1, tag);
                let spec = DigitSpec {
                    dimension: d + 1,
                    digit: n + 1,
                    part,
                };
                entries.push((v.clone(), DynIndex::new_dyn_with_tag(base, &tags), spec));
            }
        }
    }
    build(graph, base, ScalarDomain::Complex, entries)
}
