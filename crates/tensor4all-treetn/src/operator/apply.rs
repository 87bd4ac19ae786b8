//! Apply a LinearOperator to a tensor network state.
//!
//! # Algorithm
//!
//! 1. **Index Transformation**: Replace the state's site indices with the
//!    operator's input indices.
//! 2. **Contraction**: Contract state and operator vertex by vertex; the
//!    two links of every edge are fused into one.
//! 3. **Output Transformation**: Replace the operator's output indices with
//!    the true site indices.
//! 4. **Truncation**: Compress the result.

use anyhow::{ensure, Context, Result};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::DynIndex;

use super::linear_operator::LinearOperator;
use crate::network::{combine_vertexwise, TensorNetwork};
use crate::options::TruncationOptions;

/// Apply a LinearOperator to a state: compute `A|x⟩`.
///
/// The state must be a tree with the operator's vertices and edges, and
/// every site index of the state must be a site index of the operator at
/// the same vertex.
///
/// # Example
///
/// ```ignore
/// let options = TruncationOptions::new().with_max_rank(50);
/// let result = apply_linear_operator(&operator, &state, &options)?;

/// ```
pub fn apply_linear_operator<V>(
    operator: &LinearOperator<V>,
    state: &TensorNetwork<V>,
    options: &TruncationOptions,
) -> Result<TensorNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!(
        "apply_linear_operator",
        op_bond_dim = operator.max_bond_dim(),
        state_bond_dim = state.max_bond_dim()
    )
    .entered();
    ensure!(
        state.is_tree(),
        "apply_linear_operator: state is not a tree"
    );
    ensure!(
        state.node_names() == operator.mpo.node_names() && state.edges() == operator.mpo.edges(),
        "apply_linear_operator: operator and state have different graphs"
    );

    let op_sites = operator.site_index_network()?;
    for v in state.node_names() {
        let ours: HashSet<DynIndex> = state.site_indices(&v).into_iter().collect();
        let theirs: HashSet<DynIndex> = op_sites
            .site_space(&v)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .collect();
        ensure!(
            ours == theirs,
            "apply_linear_operator: site indices differ at vertex {:?}",
            v
        );
    }

    let result = combine_vertexwise(&operator.mpo, state, |v, op_t, state_t| {
        let trues = state.site_indices(v);
        let mut ins = Vec::with_capacity(trues.len());
        let mut outs = Vec::with_capacity(trues.len());
        for s in &trues {
            let inp = operator.input_index(s).context("missing input index")?;
            let out = operator.output_index(s).context("missing output index")?;
            ins.push(inp.clone());
            outs.push(out.clone());
        }
        let x = state_t.replaceinds(&trues, &ins);
        Ok(op_t.contract(&x).replaceinds(&outs, &trues))
    })?;
    let result = result.truncate(options)?;
    tracing::debug!(max_bond_dim = result.max_bond_dim(), "applied operator");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::path_graph;
    use crate::operator::{LocalOp, OpString, OpSum};
    use crate::random::{random_network_f64, LinkSpace};
    use crate::site_index_network::SiteIndexNetwork;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;
    use tensor4all_core::AnyScalar;

    fn binary_sites(n: usize) -> SiteIndexNetwork<usize> {
        SiteIndexNetwork::from_topology(&path_graph(n), |_| vec![DynIndex::new_dyn(2)]).unwrap()
    }

    #[test]
    fn test_apply_flip_on_one_site() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let sites = binary_sites(3);
        let s = sites.all_site_indices();
        let f = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(2)).unwrap();

        let flip = LocalOp::from_fn(2, |o, i| {
            AnyScalar::new_real(if o != i { 1.0 } else { 0.0 })
        });
        let mut sum = OpSum::new();
        sum.push(OpString::new(AnyScalar::new_real(3.0)).with(s[1].clone(), flip));
        let op = sum.compile(&sites, &TruncationOptions::new()).unwrap();

        let g = apply_linear_operator(&op, &f, &TruncationOptions::new()).unwrap();
        for x in 0..8usize {
            let bits: Vec<usize> = (0..3).map(|k| (x >> k) & 1).collect();
            let at = |b: &[usize]| -> HashMap<DynIndex, usize> {
                s.iter().cloned().zip(b.iter().copied()).collect()
            };
            let flipped = vec![bits[0], 1 - bits[1], bits[2]];
            let expected = f.evaluate(&at(&flipped)).unwrap() * 3.0;
            let got = g.evaluate(&at(&bits)).unwrap();
            assert!((got - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_apply_rejects_foreign_sites() {
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let sites = binary_sites(2);
        let other = binary_sites(2);

        let op = OpSum::new().compile(&sites, &TruncationOptions::new()).unwrap();
        let f = random_network_f64(&mut rng, &other, &LinkSpace::uniform(1)).unwrap();
        assert!(apply_linear_operator(&op, &f, &TruncationOptions::new()).is_err());
    }
}
