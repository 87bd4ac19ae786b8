//! Full contraction and pointwise evaluation.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::{AnyScalar, DynIndex, TensorDynLen};

use super::TensorNetwork;

impl<V> TensorNetwork<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    /// Contract every tensor into one dense tensor over all site indices.
    ///
    /// Tensors are absorbed component by component in breadth-first order,
    /// so intermediate results only carry the links of the visited frontier.
    /// Disconnected components combine as an outer product.
    pub fn contract_all(&self) -> Result<TensorDynLen> {
        contract_in_bfs_order(self, |_, t| Ok(t.clone()))
    }

    /// Value of the network with every site index fixed by `assignment`.
    ///
    /// # Errors
    /// Returns an error if a site index has no value or a value is out of range.
    pub fn evaluate(&self, assignment: &HashMap<DynIndex, usize>) -> Result<AnyScalar> {
        let links: Vec<DynIndex> = self
            .edges()
            .iter()
            .filter_map(|(a, b)| self.link_index(a, b).cloned())
            .collect();
        let result = contract_in_bfs_order(self, |v, t| {
            let mut fixed = t.clone();
            for idx in &t.indices {
                if links.contains(idx) {
                    continue;
                }
                let value = assignment.get(idx).with_context(|| {
                    format!("evaluate: no value for site index {:?} at {:?}", idx, v)
                })?;

                fixed = fixed.fix_index(idx, *value)?;
            }
            Ok(fixed)
        })?;
        Ok(result.only())
    }
}

fn contract_in_bfs_order<V>(
    net: &TensorNetwork<V>,
    mut prepare: impl FnMut(&V, &TensorDynLen) -> Result<TensorDynLen>,
) -> Result<TensorDynLen>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let mut result = TensorDynLen::scalar(AnyScalar::new_real(1.0));
    for component in net.graph.connected_components() {
        let Some(root) = component.iter().min() else {
            continue;
        };
        let mut acc = TensorDynLen::scalar(AnyScalar::new_real(1.0));
        for (v, _) in net.graph.bfs_order(root) {
            let t = prepare(&v, net.tensor_at(&v)?)?;
            acc = acc.contract(&t);
        }
        result = result.contract(&acc);
    }
    Ok(result)
}
