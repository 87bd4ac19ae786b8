//! Sums of operator strings and their compilation into tree operator networks.
//!
//! An [`OpString`] is a coefficient times a product of local matrices, one per
//! site index it touches (identity elsewhere). An [`OpSum`] is a list of such
//! strings. [`OpSum::compile`] turns each string into a bond-dimension-1
//! operator network over one shared set of internal indices, sums the
//! networks by direct sum (left to right) and compresses the result.

use anyhow::{ensure, Context, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::{AnyScalar, DynIndex, TensorDynLen};

use super::identity::build_identity_operator_tensor;
use super::index_mapping::IndexMapping;
use super::linear_operator::LinearOperator;
use crate::network::TensorNetwork;
use crate::options::TruncationOptions;
use crate::site_index_network::SiteIndexNetwork;

/// Square local matrix `M[out, in]` acting on one site index.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalOp {
    dim: usize,
    data: Vec<AnyScalar>,
}

impl LocalOp {
    /// Matrix from row-major data (`data[out * dim + in]`).
    pub fn new(dim: usize, data: Vec<AnyScalar>) -> Result<Self> {
        ensure!(
            data.len() == dim * dim,
            "LocalOp: {} entries for dimension {}",
            data.len(),
            dim
        );
        Ok(Self { dim, data })
    }

    /// Matrix with entries `f(out, in)`.
    pub fn from_fn(dim: usize, f: impl Fn(usize, usize) -> AnyScalar) -> Self {
        let data = (0..dim * dim).map(|k| f(k / dim, k % dim)).collect();
        Self { dim, data }
    }

    /// Identity matrix.
    pub fn identity(dim: usize) -> Self {
        Self::from_fn(dim, |o, i| AnyScalar::new_real(if o == i { 1.0 } else { 0.0 }))
    }

    /// Matrix dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Entry `M[out, in]`.
    pub fn get(&self, out: usize, inp: usize) -> AnyScalar {
        self.data[out * self.dim + inp]
    }

    /// Tensor with indices `[out, in]`.
    pub fn to_tensor(&self, out: &DynIndex, inp: &DynIndex) -> TensorDynLen {
        TensorDynLen::from_scalars(vec![out.clone(), inp.clone()], self.data.clone())
    }
}

/// Coefficient times a product of local matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct OpString {
    /// Overall coefficient
    pub coefficient: AnyScalar,
    /// Local factors; site indices not listed get the identity
    pub factors: Vec<(DynIndex, LocalOp)>,
}

impl OpString {
    /// Identity string with the given coefficient.
    pub fn new(coefficient: AnyScalar) -> Self {
        Self {
            coefficient,
            factors: Vec::new(),
        }
    }

    /// Add the factor `op` on `site` (builder pattern).
    pub fn with(mut self, site: DynIndex, op: LocalOp) -> Self {
        self.factors.push((site, op));
        self
    }

    /// Local factor on `site`, if any.
    pub fn factor(&self, site: &DynIndex) -> Option<&LocalOp> {
        self.factors
            .iter()
            .find(|(s, _)| s == site)
            .map(|(_, op)| op)

    }
}

/// Sum of operator strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpSum {
    /// Terms, summed in order
    pub terms: Vec<OpString>,
}

impl OpSum {
    /// Empty sum.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a term.
    pub fn push(&mut self, term: OpString) {
        self.terms.push(term);
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check whether there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Every coefficient multiplied by `scalar`.
    pub fn scaled(&self, scalar: AnyScalar) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|t| OpString {
                    coefficient: t.coefficient * scalar,
                    factors: t.factors.clone(),
                })
                .collect(),
        }
    }

    /// Compile into a tree operator network on `sites` and compress it.
    ///
    /// Terms with zero coefficient are skipped; an empty sum compiles to the
    /// zero operator.
    ///
    /// # Errors
    /// Returns an error if `sites` is not a tree, a factor acts on an
    /// unknown site index, or a factor's dimension does not match.
    pub fn compile<V>(
        &self,
        sites: &SiteIndexNetwork<V>,
        options: &TruncationOptions,
    ) -> Result<LinearOperator<V>>
    where
        V: Clone + Hash + Eq + Ord + Debug,
    {
        let _span = tracing::debug_span!("opsum_compile", terms = self.terms.len()).entered();
        ensure!(
            sites.is_tree(),
            "OpSum::compile: site network is not a tree"
        );
        let all_sites = sites.all_site_indices();
        for term in &self.terms {
            for (s, op) in &term.factors {
                ensure!(
                    all_sites.contains(s),
                    "OpSum::compile: {:?} is not a site index of the network",
                    s
                );
                ensure!(
                    op.dim() == s.dim(),
                    "OpSum::compile: factor of dimension {} on {:?}",
                    op.dim(),
                    s
                );
            }
        }

        let input_mapping: HashMap<DynIndex, IndexMapping> = all_sites
            .iter()
            .map(|s| (s.clone(), IndexMapping::fresh(s)))
            .collect();
        let output_mapping: HashMap<DynIndex, IndexMapping> = all_sites
            .iter()
            .map(|s| (s.clone(), IndexMapping::fresh(s)))
            .collect();

        let nonzero: Vec<&OpString> = self
            .terms
            .iter()
            .filter(|t| !t.coefficient.is_zero())
            .collect();
        let zero = OpString::new(AnyScalar::new_real(0.0));
        let terms = if nonzero.is_empty() {
            vec![&zero]
        } else {
            nonzero
        };

        let mut total: Option<TensorNetwork<V>> = None;
        for term in terms {
            let net = string_network(term, sites, &input_mapping, &output_mapping)?;
            total = Some(match total {
                None => net,
                Some(acc) => acc.add(&net).context("OpSum::compile: sum of strings")?,
            });
        }
        let mpo = total
            .context("OpSum::compile: no terms")?
            .truncate(options)?;
        tracing::debug!(max_bond_dim = mpo.max_bond_dim(), "compiled operator");
        LinearOperator::new(mpo, input_mapping, output_mapping)
    }
}

/// Bond-dimension-1 network of one operator string.
fn string_network<V>(
    term: &OpString,
    sites: &SiteIndexNetwork<V>,
    input_mapping: &HashMap<DynIndex, IndexMapping>,
    output_mapping: &HashMap<DynIndex, IndexMapping>,
) -> Result<TensorNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let links: HashMap<(V, V), DynIndex> = sites
        .edges()
        .into_iter()
        .map(|e| (e, DynIndex::new_link(1)))
        .collect();

    let mut net = TensorNetwork::new();
    for (k, v) in sites.node_names().into_iter().enumerate() {
        let mut t = TensorDynLen::delta(vec![]);
        for s in sites.site_space(&v).into_iter().flatten() {
            let inp = &input_mapping[s].internal_index;
            let out = &output_mapping[s].internal_index;
            let local = match term.factor(s) {
                Some(op) => op.to_tensor(out, inp),
                None => build_identity_operator_tensor(&[out.clone()], &[inp.clone()])?,
            };
            t = t.contract(&local);
        }
        let own_links: Vec<DynIndex> = links
            .iter()
            .filter(|((a, b), _)| *a == v || *b == v)
            .map(|(_, l)| l.clone())
            .collect();
        t = t.contract(&TensorDynLen::ones(own_links));
        if k == 0 {
            t = t.scale(term.coefficient);
        }
        net.add_tensor(v, t)?;
    }
    for ((a, b), l) in links {
        net.connect(&a, &b, l)?;
    }
    Ok(net)
}
