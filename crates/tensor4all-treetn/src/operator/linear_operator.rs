//! LinearOperator: operator network with index mapping.
//!
//! A `LinearOperator` wraps a tree operator network whose tensors carry, for
//! each true site index `s`, an internal input index `s_in` and an internal
//! output index `s_out`, plus the mapping between them.

use anyhow::{anyhow, ensure, Context, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::{AnyScalar, DynIndex};

use super::index_mapping::IndexMapping;
use crate::network::TensorNetwork;
use crate::options::TruncationOptions;
use crate::site_index_network::SiteIndexNetwork;

/// Operator network with input/output index mappings.
///
/// Mappings are keyed by the true site index.
#[derive(Debug, Clone)]
pub struct LinearOperator<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    /// The operator network with internal indices
    pub mpo: TensorNetwork<V>,
    /// Input index mapping: true s -> internal s_in
    pub input_mapping: HashMap<DynIndex, IndexMapping>,
    /// Output index mapping: true s -> internal s_out
    pub output_mapping: HashMap<DynIndex, IndexMapping>,
}

impl<V> LinearOperator<V>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    /// Create a LinearOperator from an operator network and index mappings.
    ///
    /// # Errors
    /// Returns an error if the mappings cover different true indices or an
    /// internal index is not a site index of the network.
    pub fn new(
        mpo: TensorNetwork<V>,
        input_mapping: HashMap<DynIndex, IndexMapping>,
        output_mapping: HashMap<DynIndex, IndexMapping>,
    ) -> Result<Self> {
        ensure!(
            input_mapping.len() == output_mapping.len()
                && input_mapping.keys().all(|k| output_mapping.contains_key(k)),
            "input and output mappings cover different site indices"
        );
        let op = Self {
            mpo,
            input_mapping,
            output_mapping,
        };
        for s in op.input_mapping.keys() {
            op.node_of(s)?;
        }
        Ok(op)
    }

    /// The operator network.
    pub fn mpo(&self) -> &TensorNetwork<V> {
        &self.mpo
    }

    /// Internal input index of a true site index.
    pub fn input_index(&self, true_index: &DynIndex) -> Option<&DynIndex> {
        self.input_mapping
            .get(true_index)
            .map(|m| &m.internal_index)
    }

    /// Internal output index of a true site index.
    pub fn output_index(&self, true_index: &DynIndex) -> Option<&DynIndex> {
        self.output_mapping
            .get(true_index)
            .map(|m| &m.internal_index)
    }

    /// Vertex holding both internal indices of `true_index`.
    pub fn node_of(&self, true_index: &DynIndex) -> Result<V> {
        let (i, o) = self
            .input_index(true_index)
            .zip(self.output_index(true_index))
            .ok_or_else(|| anyhow!("{:?} is not a site index of the operator", true_index))?;
        self.mpo
            .node_names()
            .into_iter()
            .find(|v| {
                self.mpo
                    .tensor(v)
                    .is_some_and(|t| t.has_index(i) && t.has_index(o))
            })
            .ok_or_else(|| {
                anyhow!(
                    "internal indices of {:?} not found at one vertex",
                    true_index
                )
            })

    }

    /// True site indices in network order (vertex by vertex, tensor order).
    pub fn site_indices(&self) -> Vec<DynIndex> {
        let site_index_network = self.site_index_network();
        site_index_network
            .map(|n| n.all_site_indices())
            .unwrap_or_default()
    }

    /// Graph with the true site indices of every vertex.
    pub fn site_index_network(&self) -> Result<SiteIndexNetwork<V>> {
        let reverse: HashMap<&DynIndex, &DynIndex> = self
            .input_mapping
            .values()
            .map(|m| (&m.internal_index, &m.true_index))
            .collect();
        let mut net = SiteIndexNetwork::new();
        for v in self.mpo.node_names() {
            let sites: Vec<DynIndex> = self
                .mpo
                .site_indices(&v)
                .iter()
                .filter_map(|i| reverse.get(i).map(|t| (*t).clone()))
                .collect();
            net.add_node(v, sites).map_err(|e| anyhow!(e))?;
        }
        for (a, b) in self.mpo.edges() {
            net.add_edge(&a, &b).map_err(|e| anyhow!(e))?;
        }
        Ok(net)
    }

    /// Copy with internal indices renamed to those of `other`.
    fn with_internal_indices_of(&self, other: &Self) -> Result<Self> {
        let mut old = Vec::new();
        let mut new = Vec::new();
        for (s, m) in &self.input_mapping {
            let target = other
                .input_index(s)
                .with_context(|| format!("{:?} missing from other operator", s))?;
            old.push(m.internal_index.clone());
            new.push(target.clone());
        }
        for (s, m) in &self.output_mapping {
            let target = other
                .output_index(s)
                .with_context(|| format!("{:?} missing from other operator", s))?;
            old.push(m.internal_index.clone());
            new.push(target.clone());
        }
        let mut mpo = self.mpo.clone();
        for v in self.mpo.node_names() {
            let t = mpo.tensor_at(&v)?.replaceinds(&old, &new);
            mpo.set_tensor(&v, t)?;
        }
        Ok(Self {
            mpo,
            input_mapping: other.input_mapping.clone(),
            output_mapping: other.output_mapping.clone(),
        })
    }

    /// Operator sum `self + other` (direct sum of the networks, no truncation).
    pub fn add(&self, other: &Self) -> Result<Self> {
        let other = other.with_internal_indices_of(self)?;
        Ok(Self {
            mpo: self.mpo.add(&other.mpo).context("operator add")?,
            input_mapping: self.input_mapping.clone(),
            output_mapping: self.output_mapping.clone(),
        })
    }

    /// Copy representing `scalar` times this operator.
    pub fn scale(&self, scalar: AnyScalar) -> Result<Self> {
        Ok(Self {
            mpo: self.mpo.scale(scalar)?,
            ..self.clone()
        })
    }

    /// Copy with the tensor at `v` multiplied by `scalar`.
    pub fn scale_vertex(&self, v: &V, scalar: AnyScalar) -> Result<Self> {
        Ok(Self {
            mpo: self.mpo.scale_vertex(v, scalar)?,
            ..self.clone()
        })
    }

    /// Compress the operator network.
    pub fn truncate(&self, options: &TruncationOptions) -> Result<Self> {
        Ok(Self {
            mpo: self.mpo.truncate(options)?,
            ..self.clone()
        })
    }

    /// Largest link dimension of the operator network.
    pub fn max_bond_dim(&self) -> usize {
        self.mpo.max_bond_dim()
    }
}
