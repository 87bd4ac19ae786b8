//! SVD truncation of tree tensor networks.
//!
//! Two sweeps over a tree rooted at the canonical center:
//! 1. Orthogonalize every vertex toward the center (leaves first, exact SVD).
//! 2. Walk down from the center, truncating each edge while the orthogonality
//!    center sits at its upper end, then move the center back up.
//!
//! During the second sweep every truncated bond is seen with the rest of the
//! network isometric, so each local truncation is optimal in the 2-norm.

use anyhow::{anyhow, ensure, Context, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::{default_svd_rtol, factorize_svd, DynIndex, TruncationParams};

use super::TensorNetwork;
use crate::options::TruncationOptions;

impl<V> TensorNetwork<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    /// Truncate the network with the smallest vertex as canonical center.
    ///
    /// # Errors
    /// Returns an error if the network is not a tree.
    pub fn truncate(&self, options: &TruncationOptions) -> Result<Self> {
        let center = self
            .node_names()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("truncate: empty network"))?;
        self.truncate_towards(&center, options)
    }

    /// Truncate the network with `center` as canonical center.
    ///
    /// The result is orthogonal toward `center`.
    pub fn truncate_towards(&self, center: &V, options: &TruncationOptions) -> Result<Self> {
        let _span = tracing::debug_span!(
            "truncate",
            nodes = self.node_count(),
            max_bond_dim = self.max_bond_dim()
        )
        .entered();
        ensure!(self.is_tree(), "truncate: network is not a tree");
        ensure!(
            self.has_node(center),
            "truncate: center {:?} not found",
            center
        );

        let mut net = self.clone();
        let order = self.graph.bfs_order(center);

        // Sweep 1: leaves toward center
        for (v, parent) in order.iter().rev() {
            if let Some(p) = parent {
                net.move_center(v, p, &TruncationParams::exact())
                    .with_context(|| format!("truncate: orthogonalizing {:?}", v))?;
            }
        }

        // Sweep 2: truncate away from center, children in sorted order
        let mut children: HashMap<V, Vec<V>> = HashMap::new();
        for (v, parent) in &order {
            if let Some(p) = parent {
                children.entry(p.clone()).or_default().push(v.clone());
            }
        }
        let params = options.truncation.with_rtol(
            options
                .truncation
                .effective_rtol(default_svd_rtol()),
        );
        net.truncate_subtree(center, &children, &params)?;

        tracing::debug!(max_bond_dim = net.max_bond_dim(), "truncated");
        Ok(net)
    }

    fn truncate_subtree(
        &mut self,
        v: &V,
        children: &HashMap<V, Vec<V>>,
        params: &TruncationParams,
    ) -> Result<()> {
        let Some(kids) = children.get(v) else {
            return Ok(());
        };
        for c in kids {
            self.move_center(v, c, params)
                .with_context(|| format!("truncate: edge {:?} - {:?}", v, c))?;
            self.truncate_subtree(c, children, params)?;
            self.move_center(c, v, &TruncationParams::exact())?;
        }
        Ok(())
    }

    /// Split the tensor at `from` by SVD across the edge to `to`, keep `U`
    /// at `from` and absorb `S V^H` into `to`.
    fn move_center(&mut self, from: &V, to: &V, params: &TruncationParams) -> Result<()> {
        let link = self
            .link_index(from, to)
            .cloned()
            .ok_or_else(|| anyhow!("no edge {:?} - {:?}", from, to))?;
        let t_from = self.tensor_at(from)?.clone();
        let left: Vec<DynIndex> = t_from
            .indices
            .iter()
            .filter(|i| **i != link)
            .cloned()
            .collect();
        let f = factorize_svd(&t_from, &left, params)?;
        tracing::trace!(
            from = ?from,
            to = ?to,
            rank = f.bond.dim(),
            discarded = f.discarded_weight,
            "move center"
        );
        let t_to = f.right.contract(self.tensor_at(to)?);
        if let Some(t) = self.graph.node_data_mut(from) {
            *t = f.left;
        }
        if let Some(t) = self.graph.node_data_mut(to) {
            *t = t_to;
        }
        if let Some(w) = self.graph.edge_weight_mut(from, to) {
            *w = f.bond;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::{comb_tree, grid_graph, path_graph};
    use crate::random::{random_network_c64, random_network_f64, LinkSpace};
    use crate::site_index_network::SiteIndexNetwork;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tensor4all_core::HasTruncationParams;

    fn binary_sites(n: usize) -> SiteIndexNetwork<usize> {
        SiteIndexNetwork::from_topology(&path_graph(n), |_| vec![DynIndex::new_dyn(2)]).unwrap()
    }

    #[test]
    fn test_truncate_compresses_redundant_sum() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sites = binary_sites(4);
        let f = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(2)).unwrap();
        // f + f has bond dimension 4 but rank 2
        let doubled = f.add(&f).unwrap();
        assert_eq!(doubled.max_bond_dim(), 4);
        let options = TruncationOptions::new().with_rtol(1e-10);
        let t = doubled.truncate(&options).unwrap();
        assert!(t.max_bond_dim() <= 2);

        let expected = f
            .contract_all()
            .unwrap()
            .scale(tensor4all_core::AnyScalar::new_real(2.0));
        assert!(t.contract_all().unwrap().distance(&expected).unwrap() < 1e-8);
    }

    #[test]
    fn test_truncate_max_rank_on_comb() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let sites = SiteIndexNetwork::from_topology(&comb_tree(2, 3), |_| {
            vec![DynIndex::new_dyn(2)]
        })
        .unwrap();
        let f = random_network_c64(&mut rng, &sites, &LinkSpace::uniform(4)).unwrap();
        let options = TruncationOptions::new().with_max_rank(2);
        let t = f.truncate(&options).unwrap();
        assert!(t.max_bond_dim() <= 2);
        assert!(t.is_complex());
        assert_eq!(t.edges(), f.edges());
    }

    #[test]
    fn test_exact_truncation_preserves_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let sites = SiteIndexNetwork::from_topology(&comb_tree(2, 2), |_| {
            vec![DynIndex::new_dyn(2)]
        })
        .unwrap();
        let f = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(3)).unwrap();
        let options = TruncationOptions::exact();
        let t = f.truncate_towards(&(1, 1), &options).unwrap();

        let d = t
            .contract_all()
            .unwrap()
            .distance(&f.contract_all().unwrap())
            .unwrap();
        assert!(d < 1e-10 * f.contract_all().unwrap().norm());
    }

    #[test]
    fn test_retruncation_is_stable() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let sites = binary_sites(5);
        let f = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(4)).unwrap();
        let opts = TruncationOptions::new().with_max_rank(2);
        let once = f.truncate(&opts).unwrap();
        let twice = once.truncate(&opts).unwrap();
        let a = once.contract_all().unwrap();
        let b = twice.contract_all().unwrap();
        assert!(a.distance(&b).unwrap() < 1e-10 * a.norm());
    }

    #[test]
    fn test_truncate_rejects_cycles() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let sites = SiteIndexNetwork::from_topology(&grid_graph(2, 2), |_| {
            vec![DynIndex::new_dyn(2)]
        })
        .unwrap();
        let f = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(2)).unwrap();
        assert!(f.truncate(&TruncationOptions::new()).is_err());
    }
}
