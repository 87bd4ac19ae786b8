//! Addition of tensor networks by direct-sum (block) construction.
//!
//! Each link of the sum has dimension `dim_a + dim_b`. Every vertex tensor
//! is block diagonal over its links, so that contracting the sum selects
//! either all blocks of `self` or all blocks of `other`.

use anyhow::{ensure, Context, Result};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::{direct_sum_with_indices, DynIndex, TensorDynLen};

use super::TensorNetwork;

/// Information about a merged link index for direct-sum addition.
#[derive(Debug, Clone)]
pub struct MergedBondInfo {
    /// Link of the first network
    pub link_a: DynIndex,
    /// Link of the second network
    pub link_b: DynIndex,
    /// The new merged link (with dimension `dim_a + dim_b`)
    pub merged_index: DynIndex,
}

impl<V> TensorNetwork<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    /// Check that both networks have the same vertices, edges and site
    /// indices (as sets) at every vertex.
    pub fn ensure_same_structure(&self, other: &Self) -> Result<()> {
        ensure!(
            self.node_names() == other.node_names(),
            "networks have different vertex sets"
        );
        ensure!(
            self.edges() == other.edges(),
            "networks have different edge sets"
        );
        for v in self.node_names() {
            let a: HashSet<DynIndex> = self.site_indices(&v).into_iter().collect();
            let b: HashSet<DynIndex> = other.site_indices(&v).into_iter().collect();
            ensure!(a == b, "site indices differ at vertex {:?}", v);
        }
        Ok(())
    }

    /// Merged link per edge, in sorted edge order.
    pub fn compute_merged_bond_indices(
        &self,
        other: &Self,
    ) -> Result<Vec<((V, V), MergedBondInfo)>> {
        self.edges()
            .into_iter()
            .map(|(a, b)| {
                let link_a = self
                    .link_index(&a, &b)
                    .cloned()
                    .with_context(|| format!("link {:?} - {:?} not found in self", a, b))?;
                let link_b = other
                    .link_index(&a, &b)
                    .cloned()
                    .with_context(|| format!("link {:?} - {:?} not found in other", a, b))?;
                let merged_index = DynIndex::new_link(link_a.dim() + link_b.dim());
                Ok((
                    (a, b),
                    MergedBondInfo {
                        link_a,
                        link_b,
                        merged_index,
                    },
                ))
            })
            .collect()
    }

    /// Network representing the elementwise sum `self + other`.
    ///
    /// Both networks must share vertices, edges and site indices. A network
    /// with more than one vertex must be connected: the block structure only
    /// couples vertices joined by links.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let _span = tracing::debug_span!("network_add", nodes = self.node_count()).entered();
        self.ensure_same_structure(other)
            .context("add: incompatible networks")?;
        ensure!(self.node_count() > 0, "add: empty network");

        if self.node_count() == 1 {
            let v = &self.node_names()[0];
            let (ta, tb) = (self.tensor_at(v)?, other.tensor_at(v)?);
            let mut result = Self::new();
            result.add_tensor(v.clone(), ta.add(tb)?)?;
            return Ok(result);
        }
        ensure!(
            self.graph.is_connected(),
            "add: direct sum requires a connected network"
        );

        let merged = self.compute_merged_bond_indices(other)?;
        let mut tensors = Vec::with_capacity(self.node_count());
        let names = self.node_names();
        for v in &names {
            let mut pairs = Vec::new();
            let mut new_links = Vec::new();
            for ((a, b), info) in &merged {
                if a == v || b == v {
                    pairs.push((info.link_a.clone(), info.link_b.clone()));
                    new_links.push(info.merged_index.clone());
                }
            }
            let t = direct_sum_with_indices(
                self.tensor_at(v)?,
                other.tensor_at(v)?,
                &pairs,
                &new_links,
            )
            .with_context(|| format!("add: direct sum failed at vertex {:?}", v))?;
            tensors.push(t);
        }
        let mut result = Self::new();
        for (v, t) in names.into_iter().zip(tensors) {
            result.add_tensor(v, t)?;
        }
        for ((a, b), info) in merged {
            result.connect(&a, &b, info.merged_index)?;
        }
        tracing::debug!(max_bond_dim = result.max_bond_dim(), "network sum");
        Ok(result)
    }

    pub(crate) fn tensor_at(&self, v: &V) -> Result<&TensorDynLen> {
        self.tensor(v)
            .with_context(|| format!("tensor at {:?} not found", v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::path_graph;
    use crate::random::{random_network_f64, LinkSpace};
    use crate::site_index_network::SiteIndexNetwork;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn binary_sites(n: usize) -> SiteIndexNetwork<usize> {
        SiteIndexNetwork::from_topology(&path_graph(n), |_| vec![DynIndex::new_dyn(2)]).unwrap()
    }

    #[test]
    fn test_add_matches_dense_sum() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let sites = binary_sites(3);
        let a = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(2)).unwrap();
        let b = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(3)).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.max_bond_dim(), 5);

        let dense_b = b.contract_all().unwrap();
        let expected = a.contract_all().unwrap().add(&dense_b).unwrap();
        let got = sum.contract_all().unwrap();
        assert!(got.distance(&expected).unwrap() < 1e-10);
    }

    #[test]
    fn test_add_single_vertex() {
        let i = DynIndex::new_dyn(2);
        let t = TensorDynLen::from_dense_f64(vec![i.clone()], vec![1.0, 2.0]);
        let a = TensorNetwork::from_tensors(vec![t], vec![0]).unwrap();

        let sum = a.add(&a).unwrap();
        let t = sum.tensor(&0).unwrap();
        assert_eq!(t.get(&[1]).real(), 4.0);
    }

    #[test]
    fn test_add_rejects_different_sites() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let s1 = binary_sites(2);
        let s2 = binary_sites(2);
        let a = random_network_f64(&mut rng, &s1, &LinkSpace::uniform(1)).unwrap();
        let b = random_network_f64(&mut rng, &s2, &LinkSpace::uniform(1)).unwrap();
        assert!(a.add(&b).is_err());
    }
}
