//! Vertex-wise combination of two networks on the same graph.

use anyhow::{ensure, Context, Result};
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::{DynIndex, TensorDynLen};

use super::TensorNetwork;

/// Links of one edge in the two combined networks and their fused link.
#[derive(Debug, Clone)]
pub struct LinkPair {
    /// Link of the first network
    pub a: DynIndex,
    /// Link of the second network
    pub b: DynIndex,
    /// Fused link, dimension `dim(a) * dim(b)`
    pub fused: DynIndex,
}

/// Combine two networks on the same graph vertex by vertex.
///
/// Links of `b` are first replaced by fresh copies. At every vertex
/// `local(v, ta, tb)` must return a tensor carrying the links of both `ta`
/// and `tb`; the two links of every edge are then fused into one link of
/// dimension `dim_a * dim_b` (the link of `a` varying slowest).
///
/// # Errors
/// Returns an error if the vertex or edge sets differ, or if `local` fails
/// or drops a link.
pub fn combine_vertexwise<V>(
    a: &TensorNetwork<V>,
    b: &TensorNetwork<V>,
    mut local: impl FnMut(&V, &TensorDynLen, &TensorDynLen) -> Result<TensorDynLen>,
) -> Result<TensorNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    ensure!(
        a.node_names() == b.node_names(),
        "combine_vertexwise: vertex sets differ"
    );
    ensure!(
        a.edges() == b.edges(),
        "combine_vertexwise: edge sets differ"
    );
    let b = b.sim_link_indices();

    let mut pairs: Vec<((V, V), LinkPair)> = Vec::with_capacity(a.edge_count());
    for (u, w) in a.edges() {
        let la = a
            .link_index(&u, &w)
            .cloned()
            .with_context(|| format!("missing link {:?} - {:?}", u, w))?;
        let lb = b
            .link_index(&u, &w)
            .cloned()
            .with_context(|| format!("missing link {:?} - {:?}", u, w))?;
        let fused = DynIndex::new_link(la.dim() * lb.dim());
        pairs.push((
            (u, w),
            LinkPair {
                a: la,
                b: lb,
                fused,
            },
        ));
    }

    let mut result = TensorNetwork::new();
    for v in a.node_names() {
        let mut t = local(&v, a.tensor_at(&v)?, b.tensor_at(&v)?).with_context(|| {
            format!("combine_vertexwise: local combination failed at {:?}", v)
        })?;

        for ((u, w), pair) in &pairs {
            if *u == v || *w == v {
                t = t.fuse_indices(&[pair.a.clone(), pair.b.clone()], pair.fused.clone())?;
            }
        }
        result.add_tensor(v, t)?;
    }
    for ((u, w), pair) in pairs {
        result.connect(&u, &w, pair.fused)?;
    }
    Ok(result)
}
