//! Analytic tensor networks of elementary functions.
//!
//! Every builder takes an [`IndsNetworkMap`] and [`FunctionParams`] and
//! returns a [`FunctionNetwork`] of `c · f(k·x + a)` where `x` is the
//! coordinate of `params.dimension`. The vertex of the most significant
//! digit absorbs `c` exactly once.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;
use tensor4all_core::{AnyScalar, DynIndex, TensorDynLen};
use tensor4all_treetn::{random_network_c64, random_network_f64, LinkSpace, TensorNetwork};
use tracing::debug;

use crate::error::{FunctionNetworkError, Result};
use crate::function_network::FunctionNetwork;
use crate::inds_network_map::IndsNetworkMap;
use crate::params::FunctionParams;

/// Elementary function families sharing one builder signature.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementaryFunction {
    /// `c` with links of the given dimension
    Constant {
        /// Link dimension
        linkdim: usize,
    },
    /// `c · exp(kx + a)`
    Exponential,
    /// `c · cosh(kx + a)`
    Cosh,
    /// `c · sinh(kx + a)`
    Sinh,
    /// `c · cos(kx + a)`
    Cos,
    /// `c · sin(kx + a)`
    Sin,
    /// `c · tanh(kx + a)`, series of `nterms` exponentials
    Tanh,
    /// `c · Σ_i coeffs[i] (kx + a)^i`
    Polynomial(Vec<AnyScalar>),
}

impl ElementaryFunction {
    /// Build the function network on `map`.
    pub fn build<V>(
        &self,
        map: &IndsNetworkMap<V>,
        params: &FunctionParams,
    ) -> Result<FunctionNetwork<V>>
    where
        V: Clone + Hash + Eq + Ord + Debug,
    {
        match self {
            Self::Constant { linkdim } => constant(map, params.c, *linkdim),
            Self::Exponential => exponential(map, params),
            Self::Cosh => cosh(map, params),
            Self::Sinh => sinh(map, params),
            Self::Cos => cos(map, params),
            Self::Sin => sin(map, params),
            Self::Tanh => tanh(map, params),
            Self::Polynomial(coeffs) => polynomial(map, coeffs, params),
        }
    }
}

fn edge_links<V>(map: &IndsNetworkMap<V>, dim: usize) -> Vec<((V, V), DynIndex)>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    map.sites()
        .edges()
        .into_iter()
        .map(|e| (e, DynIndex::new_link(dim)))
        .collect()
}

fn links_at<V: PartialEq>(links: &[((V, V), DynIndex)], v: &V) -> Vec<DynIndex> {
    links
        .iter()
        .filter(|((a, b), _)| a == v || b == v)
        .map(|(_, l)| l.clone())
        .collect()
}

fn assemble<V>(
    map: &IndsNetworkMap<V>,
    tensors: Vec<(V, TensorDynLen)>,
    links: Vec<((V, V), DynIndex)>,
) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let mut net = TensorNetwork::new();
    for (v, t) in tensors {
        net.add_tensor(v, t)?;
    }
    for ((a, b), l) in links {
        net.connect(&a, &b, l)?;
    }
    let f = FunctionNetwork::new(net, map.clone())?;
    debug!(max_bond_dim = f.max_bond_dim(), "built function network");
    Ok(f)
}

/// Constant function `c`.
///
/// Every tensor is ones over its site indices times a delta over its links
/// of dimension `linkdim`, scaled by the principal `nv`-th root of
/// `c / linkdim^m` (`m` = number of connected components with an edge).
/// A negative real ratio gives a complex network.
pub fn constant<V>(
    map: &IndsNetworkMap<V>,
    c: AnyScalar,
    linkdim: usize,
) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!("constant", linkdim).entered();
    if linkdim == 0 {
        return Err(FunctionNetworkError::InvalidArgument(
            "linkdim must be positive".into(),
        ));
    }
    let vertices = map.vertices();
    if vertices.is_empty() {
        return Err(FunctionNetworkError::InvalidArgument("empty graph".into()));
    }
    let m = map
        .topology()
        .connected_components()
        .iter()
        .filter(|comp| comp.len() > 1)
        .count();
    let ratio = c * (linkdim as f64).powi(-(m as i32));
    let factor = if ratio.is_zero() || vertices.len() == 1 {
        ratio
    } else {
        ratio.powf(1.0 / vertices.len() as f64)
    };

    let links = edge_links(map, linkdim);
    let tensors = vertices
        .into_iter()
        .map(|v| {
            let t = TensorDynLen::ones(map.site_indices(&v))
                .contract(&TensorDynLen::delta(links_at(&links, &v)))
                .scale(factor);
            (v, t)
        })
        .collect();
    assemble(map, tensors, links)
}

/// `c · exp(kx + a)` with unit links.
///
/// Each vertex carrying digits of the dimension holds
/// `exp(a / L) Π_s exp(k · valueToScalar(s, ·))` (`L` such vertices); all
/// other tensors are ones.
pub fn exponential<V>(
    map: &IndsNetworkMap<V>,
    params: &FunctionParams,
) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let d = params.dimension;
    let _span = tracing::debug_span!("exponential", dimension = d).entered();
    let carriers = map.dimension_vertices(d);
    if carriers.is_empty() {
        return Err(FunctionNetworkError::UnknownDimension(d));
    }
    let leading = map.leading_vertex(d)?;
    let share = (params.a * (1.0 / carriers.len() as f64)).exp();
    let index_map = map.index_map();

    let links = edge_links(map, 1);
    let mut tensors = Vec::new();
    for v in map.vertices() {
        let mut t = TensorDynLen::scalar(AnyScalar::new_real(1.0));
        for s in map.site_indices(&v) {
            let values: Vec<AnyScalar> = if index_map.dimension(&s) == Some(d) {
                index_map
                    .index_values_to_scalars(&s)?
                    .into_iter()
                    .map(|x| (params.k * x).exp())
                    .collect()
            } else {
                vec![AnyScalar::new_real(1.0); s.dim()]
            };
            t = t.contract(&TensorDynLen::from_scalars(vec![s], values));
        }
        if carriers.contains(&v) {
            t = t.scale(share);
        }
        if v == leading {
            t = t.scale(params.c);
        }
        t = t.contract(&TensorDynLen::ones(links_at(&links, &v)));
        tensors.push((v, t));
    }
    assemble(map, tensors, links)
}

/// Sum `c₊ e^{kx+a} + c₋ e^{-(kx+a)}` with `k`, `a` scaled by `phase`.
fn exponential_pair<V>(
    map: &IndsNetworkMap<V>,
    params: &FunctionParams,
    phase: AnyScalar,
    c_plus: AnyScalar,
    c_minus: AnyScalar,
) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let k = params.k * phase;
    let a = params.a * phase;
    let up = exponential(map, &params.with_k(k).with_a(a).with_c(c_plus))?;
    let down = exponential(map, &params.with_k(-k).with_a(-a).with_c(c_minus))?;
    up.add(&down)
}

/// `c · cosh(kx + a)`, bond dimension 2.
pub fn cosh<V>(map: &IndsNetworkMap<V>, params: &FunctionParams) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!("cosh").entered();
    let half = params.c * 0.5;
    exponential_pair(map, params, AnyScalar::new_real(1.0), half, half)
}

/// `c · sinh(kx + a)`, bond dimension 2.
pub fn sinh<V>(map: &IndsNetworkMap<V>, params: &FunctionParams) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!("sinh").entered();
    let half = params.c * 0.5;
    exponential_pair(map, params, AnyScalar::new_real(1.0), half, -half)
}

/// `c · cos(kx + a)`, complex network of bond dimension 2.
pub fn cos<V>(map: &IndsNetworkMap<V>, params: &FunctionParams) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!("cos").entered();
    let half = params.c * 0.5;
    exponential_pair(map, params, AnyScalar::imaginary_unit(), half, half)
}

/// `c · sin(kx + a)`, complex network of bond dimension 2.
pub fn sin<V>(map: &IndsNetworkMap<V>, params: &FunctionParams) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!("sin").entered();
    let half_i = params.c * AnyScalar::new_complex(0.0, 0.5);
    exponential_pair(map, params, AnyScalar::imaginary_unit(), -half_i, half_i)
}

/// `c · tanh(kx + a)` as `c·[1 + 2 Σ_{n=1}^{N} (-1)^n e^{-2n(kx+a)}]`.
///
/// Valid for `Re(kx + a) > 0`; the error is `O(e^{-2(N+1)(kx+a)})` with
/// `N = params.nterms`. Bond dimension `N + 1`.
pub fn tanh<V>(map: &IndsNetworkMap<V>, params: &FunctionParams) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!("tanh", nterms = params.nterms).entered();
    if map.dimension_vertices(params.dimension).is_empty() {
        return Err(FunctionNetworkError::UnknownDimension(params.dimension));
    }
    let mut acc = constant(map, params.c, 1)?;
    for n in 1..=params.nterms {
        let m = -2.0 * n as f64;
        let sign = if n % 2 == 0 { 2.0 } else { -2.0 };
        let term = exponential(
            map,
            &params
                .with_k(params.k * m)
                .with_a(params.a * m)
                .with_c(params.c * sign),
        )?;
        acc = acc.add(&term)?;
    }
    Ok(acc)
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, j| acc * (n - j) as f64 / (j + 1) as f64)
}

/// `β! / ((β - Σα)! Π α_j!)`, zero when `Σα > β`.
fn multinomial(beta: usize, alphas: &[usize]) -> f64 {
    let mut rest = beta;
    let mut out = 1.0;
    for &a in alphas {
        if a > rest {
            return 0.0;
        }
        out *= binomial(rest, a);
        rest -= a;
    }
    out
}

/// Coefficients of `c · Σ_i coeffs[i] (kx + a)^i` as a polynomial in `x`.
fn fold_affine(coeffs: &[AnyScalar], params: &FunctionParams) -> Vec<AnyScalar> {
    let n = coeffs.len();
    (0..n)
        .map(|j| {
            let inner = (j..n).fold(AnyScalar::new_real(0.0), |acc, i| {
                acc + coeffs[i] * params.a.powi((i - j) as i32) * binomial(i, j)
            });
            params.c * params.k.powi(j as i32) * inner
        })
        .collect()
}

/// `c · Σ_i coeffs[i] (kx + a)^i`.
///
/// The network lives on the breadth-first spanning tree rooted at the vertex
/// of the most significant digit. Links have dimension `coeffs.len()` and
/// carry powers of the partial coordinate sums of the subtrees; every vertex
/// holds the multinomial tensor
/// `Q[s, α.., β] = β!/((β-Σα)! Πα!) · x_v(s)^(β-Σα)` with child links `α` and
/// parent link `β`, and the root contracts `β` with the coefficients.
/// A single coefficient gives [`constant`] on the original graph.
///
/// # Errors
/// Returns an error if `coeffs` is empty, the dimension is unknown or the
/// graph is not connected.
pub fn polynomial<V>(
    map: &IndsNetworkMap<V>,
    coeffs: &[AnyScalar],
    params: &FunctionParams,
) -> Result<FunctionNetwork<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let d = params.dimension;
    let _span = tracing::debug_span!("polynomial", degree = coeffs.len(), dimension = d).entered();
    if coeffs.is_empty() {
        return Err(FunctionNetworkError::InvalidArgument(
            "polynomial needs at least one coefficient".into(),
        ));
    }
    let root = map.leading_vertex(d)?;
    let b = fold_affine(coeffs, params);
    let n = b.len();
    if n == 1 {
        return constant(map, b[0], 1);
    }
    if !map.topology().is_connected() {
        return Err(FunctionNetworkError::InvalidArgument(
            "polynomial needs a connected graph".into(),
        ));
    }

    let tree = map.bfs_spanning_tree(&root)?;
    let order = tree.topology().bfs_order(&root);
    let mut children: HashMap<V, Vec<V>> = HashMap::new();
    let mut parent_link: HashMap<V, DynIndex> = HashMap::new();
    let mut links = Vec::new();
    for (v, parent) in &order {
        if let Some(p) = parent {
            children.entry(p.clone()).or_default().push(v.clone());
            let l = DynIndex::new_link(n);
            parent_link.insert(v.clone(), l.clone());
            links.push(((p.clone(), v.clone()), l));
        }
    }

    let complex = map.is_complex() || b.iter().any(AnyScalar::is_complex);
    let index_map = tree.index_map();
    let mut tensors = Vec::new();
    for (v, parent) in &order {
        let sites = tree.site_indices(v);
        let site_dims: Vec<usize> = sites.iter().map(DynIndex::dim).collect();
        let n_site: usize = site_dims.iter().product();

        // Digit contribution x_v for every site configuration (row-major)
        let mut xs = Vec::with_capacity(n_site);
        for flat in 0..n_site {
            let mut rem = flat;
            let mut x = AnyScalar::new_real(0.0);
            for (s, &dim) in sites.iter().zip(&site_dims).rev() {
                let value = rem % dim;
                rem /= dim;
                if index_map.dimension(s) == Some(d) {
                    x = x + index_map.value_to_scalar(s, value)?;
                }
            }
            xs.push(x);
        }

        let kids = children.get(v).cloned().unwrap_or_default();
        let n_alpha = u32::try_from(kids.len())
            .ok()
            .and_then(|m| n.checked_pow(m))
            .ok_or_else(|| {
                FunctionNetworkError::InvalidArgument(format!(
                    "degree {} with {} children at {:?} overflows the carrier space",
                    n - 1,
                    kids.len(),
                    v
                ))
            })?;
        let mut indices = sites.clone();
        indices.extend(kids.iter().filter_map(|c| parent_link.get(c).cloned()));
        let up = parent.as_ref().and_then(|_| parent_link.get(v).cloned());
        let n_beta = if up.is_some() { n } else { 1 };
        if let Some(l) = &up {
            indices.push(l.clone());
        }

        let len = n_site
            .checked_mul(n_alpha)
            .and_then(|m| m.checked_mul(n_beta))
            .ok_or_else(|| {
                FunctionNetworkError::InvalidArgument(format!(
                    "polynomial tensor at {:?} is too large",
                    v
                ))
            })?;
        let mut data = Vec::with_capacity(len);
        let mut alphas = vec![0usize; kids.len()];
        for x in &xs {
            for flat_alpha in 0..n_alpha {
                let mut rem = flat_alpha;
                for a in alphas.iter_mut().rev() {
                    *a = rem % n;
                    rem /= n;
                }
                let used: usize = alphas.iter().sum();
                let q = |beta: usize| {
                    if used > beta {
                        AnyScalar::new_real(0.0)
                    } else {
                        x.powi((beta - used) as i32) * multinomial(beta, &alphas)
                    }
                };
                if up.is_some() {
                    data.extend((0..n).map(q));
                } else {
                    let total = (0..n).fold(AnyScalar::new_real(0.0), |acc, beta| {
                        acc + q(beta) * b[beta]
                    });
                    data.push(total);
                }
            }
        }
        if complex {
            data = data
                .into_iter()
                .map(|z| AnyScalar::from(z.to_c64()))
                .collect();
        }
        tensors.push((v.clone(), TensorDynLen::from_scalars(indices, data)));
    }
    assemble(&tree, tensors, links)
}

/// Random network on `map` with Gaussian entries and links of dimension
/// `linkdim`; complex when the map is complex.
pub fn random_function_network<R, V>(
    rng: &mut R,
    map: &IndsNetworkMap<V>,
    linkdim: usize,
) -> Result<FunctionNetwork<V>>
where
    R: Rng,
    V: Clone + Hash + Eq + Ord + Debug,
{
    let links = LinkSpace::uniform(linkdim);
    let net = if map.is_complex() {
        random_network_c64(rng, map.sites(), &links)?
    } else {
        random_network_f64(rng, map.sites(), &links)?
    };
    FunctionNetwork::new(net, map.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inds_network_map::continuous_siteinds;
    use approx::assert_relative_eq;
    use tensor4all_treetn::graphs::{comb_tree, path_graph};
    use tensor4all_treetn::Topology;

    fn path_map(n: usize) -> IndsNetworkMap<usize> {
        continuous_siteinds(&path_graph(n), &[(0..n).collect()], 2).unwrap()
    }

    #[test]
    fn test_binomial_and_multinomial() {
        assert_eq!(binomial(5, 2), 10.0);
        assert_eq!(binomial(4, 0), 1.0);
        assert_eq!(multinomial(4, &[1, 2]), 12.0);
        assert_eq!(multinomial(2, &[2, 1]), 0.0);
    }

    #[test]
    fn test_fold_affine() {
        // 2 (3x + 1)^2 = 18x^2 + 12x + 2
        let coeffs = [0.0, 0.0, 1.0].map(AnyScalar::new_real);
        let params = FunctionParams::new().with_k(3.0).with_a(1.0).with_c(2.0);
        let b: Vec<f64> = fold_affine(&coeffs, &params)
            .iter()
            .map(|x| x.real())
            .collect();
        assert_eq!(b, vec![2.0, 12.0, 18.0]);
    }

    #[test]
    fn test_polynomial_on_wide_star_is_rejected() {
        let mut star = Topology::new();
        for v in 0..21usize {
            star.add_node(v, ()).unwrap();
        }
        for v in 1..21usize {
            star.add_edge(&0, &v, ()).unwrap();
        }
        let map = continuous_siteinds(&star, &[(0..21).collect()], 2).unwrap();
        let coeffs = vec![AnyScalar::new_real(1.0); 11];
        assert!(matches!(
            polynomial(&map, &coeffs, &FunctionParams::new()),
            Err(FunctionNetworkError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_constant_with_link_dimension() {
        let map = path_map(4);
        let f = constant(&map, AnyScalar::new_real(3.0), 3).unwrap();
        assert_eq!(f.max_bond_dim(), 3);
        for x in map.index_map().grid_points(1, 16).unwrap() {
            assert_relative_eq!(f.evaluate(&[x], &[1]).unwrap().real(), 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_negative_constant_is_complex() {
        let map = path_map(3);
        let f = constant(&map, AnyScalar::new_real(-2.0), 2).unwrap();
        assert!(f.is_complex());
        let v = f.evaluate(&[0.5], &[1]).unwrap();
        assert_relative_eq!(v.real(), -2.0, epsilon = 1e-12);
        assert!(v.imag().abs() < 1e-12);
    }

    #[test]
    fn test_exponential_on_comb() {
        let g = comb_tree(2, 2);
        let order = vec![(0, 0), (1, 0), (0, 1), (1, 1)];
        let map = continuous_siteinds(&g, &[order], 2).unwrap();
        let params = FunctionParams::new().with_k(1.5).with_a(0.25).with_c(2.0);
        let f = exponential(&map, &params).unwrap();
        assert_eq!(f.max_bond_dim(), 1);
        for x in map.index_map().grid_points(1, 16).unwrap() {
            let expected = 2.0 * (1.5 * x + 0.25_f64).exp();
            assert_relative_eq!(
                f.evaluate(&[x], &[1]).unwrap().real(),
                expected,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_exponential_unknown_dimension() {
        let map = path_map(2);
        let err = exponential(&map, &FunctionParams::new().with_dimension(2)).unwrap_err();
        assert!(matches!(err, FunctionNetworkError::UnknownDimension(2)));
    }

    #[test]
    fn test_polynomial_cubic_on_path() {
        let map = path_map(5);
        let coeffs = [1.0, -2.0, 0.5, 3.0].map(AnyScalar::new_real);
        let f = polynomial(&map, &coeffs, &FunctionParams::new()).unwrap();
        assert!(f.max_bond_dim() <= 4);
        for x in map.index_map().grid_points(1, 32).unwrap() {
            let expected = 1.0 - 2.0 * x + 0.5 * x * x + 3.0 * x * x * x;
            assert_relative_eq!(
                f.evaluate(&[x], &[1]).unwrap().real(),
                expected,
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_polynomial_degree_zero_is_constant() {
        let map = path_map(3);
        let params = FunctionParams::new().with_c(4.0);
        let f = polynomial(&map, &[AnyScalar::new_real(0.5)], &params).unwrap();
        assert_relative_eq!(
            f.evaluate(&[0.375], &[1]).unwrap().real(),
            2.0,
            epsilon = 1e-12
        );

    }

    #[test]
    fn test_elementary_function_dispatch() {
        let map = path_map(3);
        let params = FunctionParams::new().with_k(0.5);
        let f = ElementaryFunction::Cosh.build(&map, &params).unwrap();
        assert_eq!(f.max_bond_dim(), 2);
        let v = f.evaluate(&[0.25], &[1]).unwrap().real();
        assert_relative_eq!(v, (0.125_f64).cosh(), epsilon = 1e-12);
    }
}
