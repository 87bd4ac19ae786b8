//! Finite-difference operators on encoded coordinates.
//!
//! A shift `x → x ± δ` (`δ` the smallest increment of a dimension) is a
//! carry chain over the digits of that dimension. [`CarryAutomaton`]
//! enumerates its accepting paths as weighted operator strings; these are
//! compiled into a tree [`LinearOperator`] by [`OpSum::compile`]. Stencils,
//! the Laplacian and the centred derivative are sums of shifts.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;

use tensor4all_core::{AnyScalar, DynIndex};
use tensor4all_treetn::{LinearOperator, LocalOp, OpString, OpSum};
use tracing::debug;

use crate::error::{FunctionNetworkError, Result};
use crate::index_map::Part;
use crate::inds_network_map::IndsNetworkMap;
use crate::params::{BoundaryCondition, OperatorParams};

/// Direction of a unit shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    /// `(S₊f)(x) = f(x + δ)`
    Plus,
    /// `(S₋f)(x) = f(x - δ)`
    Minus,
}

/// Local action of a shift on one digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitAction {
    /// Digit moves by one, no carry
    Step,
    /// Digit wraps around and carries
    Wrap,
    /// Digit stays at its boundary value
    Hold,
}

/// Carry chain of a unit shift over mixed-radix digits.
///
/// Digits are listed least significant first. Path `t` wraps the `t`
/// lowest digits and steps digit `t`; more significant digits are left
/// alone. The boundary path, where every digit carries, depends on the
/// [`BoundaryCondition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarryAutomaton {
    direction: ShiftDirection,
    dims: Vec<usize>,
    boundary: BoundaryCondition,
}

impl CarryAutomaton {
    /// Automaton over digits of sizes `dims`, least significant first.
    pub fn new(direction: ShiftDirection, dims: Vec<usize>, boundary: BoundaryCondition) -> Self {
        Self {
            direction,
            dims,
            boundary,
        }
    }

    /// Accepting paths; entry `j` of a path acts on digit `j`.
    pub fn paths(&self) -> Vec<Vec<DigitAction>> {
        let n = self.dims.len();
        let mut paths: Vec<Vec<DigitAction>> = (0..n)
            .map(|t| {
                let mut path = vec![DigitAction::Wrap; t];
                path.push(DigitAction::Step);
                path
            })
            .collect();
        match self.boundary {
            BoundaryCondition::Dirichlet => {}
            BoundaryCondition::Periodic => paths.push(vec![DigitAction::Wrap; n]),
            BoundaryCondition::Neumann => paths.push(vec![DigitAction::Hold; n]),
        }
        paths
    }

    /// Matrix `M[out, in]` of an action on a digit of size `dim`.
    pub fn local_op(&self, action: DigitAction, dim: usize) -> LocalOp {
        let top = dim.saturating_sub(1);
        let plus = self.direction == ShiftDirection::Plus;
        LocalOp::from_fn(dim, |out, inp| {
            let hit = match (action, plus) {
                (DigitAction::Step, true) => inp == out + 1,
                (DigitAction::Step, false) => out == inp + 1,
                (DigitAction::Wrap, true) => out == top && inp == 0,
                (DigitAction::Wrap, false) => out == 0 && inp == top,
                (DigitAction::Hold, true) => out == top && inp == top,
                (DigitAction::Hold, false) => out == 0 && inp == 0,
            };
            AnyScalar::new_real(if hit { 1.0 } else { 0.0 })
        })
    }

    /// Input digits read by output digits `out`, or `None` past a Dirichlet
    /// boundary.
    pub fn source(&self, out: &[usize]) -> Option<Vec<usize>> {
        self.paths().into_iter().find_map(|path| {
            let mut inp = out.to_vec();
            for (j, &action) in path.iter().enumerate() {
                let op = self.local_op(action, self.dims[j]);
                inp[j] = (0..self.dims[j]).find(|&i| !op.get(out[j], i).is_zero())?;
            }
            Some(inp)
        })
    }

    /// Operator strings on `sites` (least significant first), each with
    /// coefficient `weight`.
    pub fn to_opsum(&self, sites: &[DynIndex], weight: AnyScalar) -> Result<OpSum> {
        if sites.len() != self.dims.len() {
            return Err(FunctionNetworkError::InvalidArgument(format!(
                "{} sites for {} digits",
                sites.len(),
                self.dims.len()
            )));
        }
        let mut sum = OpSum::new();
        for path in self.paths() {
            let term = path
                .iter()
                .zip(sites)
                .fold(OpString::new(weight), |acc, (&action, s)| {
                    acc.with(s.clone(), self.local_op(action, s.dim()))
                });
            sum.push(term);
        }
        Ok(sum)
    }
}

/// Real-part digits of `dimension`, least significant first.
fn shift_sites<V>(map: &IndsNetworkMap<V>, dimension: usize) -> Result<Vec<DynIndex>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    if !map.is_tree() {
        return Err(FunctionNetworkError::NotATree);
    }
    let mut sites = map
        .index_map()
        .dimension_indices_part(dimension, Part::Real);
    if sites.is_empty() {
        return Err(FunctionNetworkError::UnknownDimension(dimension));
    }
    sites.reverse();
    Ok(sites)
}

fn shift_opsum(
    direction: ShiftDirection,
    sites: &[DynIndex],
    boundary: BoundaryCondition,
    weight: AnyScalar,
) -> Result<OpSum> {
    let dims = sites.iter().map(DynIndex::dim).collect();
    CarryAutomaton::new(direction, dims, boundary).to_opsum(sites, weight)
}

fn shift<V>(
    map: &IndsNetworkMap<V>,
    direction: ShiftDirection,
    params: &OperatorParams,
) -> Result<LinearOperator<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span = tracing::debug_span!("shift", ?direction, dimension = params.dimension).entered();
    let sites = shift_sites(map, params.dimension)?;
    let sum = shift_opsum(direction, &sites, params.boundary, AnyScalar::new_real(1.0))?;
    let op = sum.compile(map.sites(), &params.truncation)?;
    debug!(max_bond_dim = op.max_bond_dim(), "compiled shift");
    Ok(op)
}

/// `(S₊f)(x) = f(x + δ)`.
pub fn plus_shift<V>(
    map: &IndsNetworkMap<V>,
    params: &OperatorParams,
) -> Result<LinearOperator<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    shift(map, ShiftDirection::Plus, params)
}

/// `(S₋f)(x) = f(x - δ)`.
pub fn minus_shift<V>(
    map: &IndsNetworkMap<V>,
    params: &OperatorParams,
) -> Result<LinearOperator<V>>

where
    V: Clone + Hash + Eq + Ord + Debug,
{
    shift(map, ShiftDirection::Minus, params)
}

/// Identity operator on every site index of `map`.
pub fn identity_operator<V>(map: &IndsNetworkMap<V>) -> Result<LinearOperator<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    if !map.is_tree() {
        return Err(FunctionNetworkError::NotATree);
    }
    Ok(LinearOperator::identity(map.sites())?)
}

/// `(s₊·S₊ + s₀·I + s₋·S₋) / δ^delta_power` along `params.dimension`.
///
/// Zero weights are skipped. The sum is truncated, every tensor holding
/// digits of the dimension is scaled by `Π dim(s)^delta_power` over its
/// digits, and the result truncated again. The product of these factors over
/// all vertices is `1/δ^delta_power`, also when a vertex holds several digits.
///
/// # Errors
/// [`FunctionNetworkError::InvalidShifts`] unless `shifts` has 3 entries,
/// [`FunctionNetworkError::NotATree`] and
/// [`FunctionNetworkError::UnknownDimension`] as for the shifts.
pub fn stencil<V>(
    map: &IndsNetworkMap<V>,
    shifts: &[AnyScalar],
    delta_power: i32,
    params: &OperatorParams,
) -> Result<LinearOperator<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let _span =
        tracing::debug_span!("stencil", delta_power, dimension = params.dimension).entered();
    let [s_plus, s_zero, s_minus] = match shifts {
        [p, z, m] => [*p, *z, *m],
        _ => return Err(FunctionNetworkError::InvalidShifts(shifts.len())),
    };
    let sites = shift_sites(map, params.dimension)?;

    let mut sum = OpSum::new();
    if !s_plus.is_zero() {
        for t in shift_opsum(ShiftDirection::Plus, &sites, params.boundary, s_plus)?.terms {
            sum.push(t);
        }
    }
    if !s_zero.is_zero() {
        sum.push(OpString::new(s_zero));
    }
    if !s_minus.is_zero() {
        for t in shift_opsum(ShiftDirection::Minus, &sites, params.boundary, s_minus)?.terms {
            sum.push(t);
        }
    }
    let mut op = sum.compile(map.sites(), &params.truncation)?;

    let mut factors: BTreeMap<V, f64> = BTreeMap::new();
    for s in &sites {
        let v = map.vertex_of(s).ok_or_else(|| {
            FunctionNetworkError::InvalidIndexMap(format!("index {:?} has no vertex", s))
        })?;
        *factors.entry(v).or_insert(1.0) *= (s.dim() as f64).powi(delta_power);
    }
    for (v, f) in factors {
        op = op.scale_vertex(&v, AnyScalar::new_real(f))?;
    }
    let op = op.truncate(&params.truncation)?;
    debug!(max_bond_dim = op.max_bond_dim(), "compiled stencil");
    Ok(op)
}

/// Second difference `(f(x+δ) - 2f(x) + f(x-δ)) / δ²`.
pub fn laplacian_operator<V>(
    map: &IndsNetworkMap<V>,
    params: &OperatorParams,
) -> Result<LinearOperator<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let w = [1.0, -2.0, 1.0].map(AnyScalar::new_real);
    stencil(map, &w, 2, params)
}

/// Centred difference `(f(x+δ) - f(x-δ)) / 2δ`.
pub fn derivative_operator<V>(
    map: &IndsNetworkMap<V>,
    params: &OperatorParams,
) -> Result<LinearOperator<V>>
where
    V: Clone + Hash + Eq + Ord + Debug,
{
    let w = [1.0, 0.0, -1.0].map(AnyScalar::new_real);
    Ok(stencil(map, &w, 1, params)?.scale(AnyScalar::new_real(0.5))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inds_network_map::continuous_siteinds;
    use tensor4all_treetn::graphs::{grid_graph, path_graph};

    /// Digits (least significant first) of `x` in radix `dims`.
    fn digits(mut x: usize, dims: &[usize]) -> Vec<usize> {
        dims.iter()
            .map(|&d| {
                let r = x % d;
                x /= d;
                r
            })
            .collect()
    }

    fn value(ds: &[usize], dims: &[usize]) -> usize {
        ds.iter()
            .zip(dims)
            .rev()
            .fold(0, |acc, (&d, &b)| acc * b + d)
    }

    #[test]
    fn test_plus_automaton_all_boundaries() {
        let dims = vec![3, 3];
        for (boundary, last) in [
            (BoundaryCondition::Dirichlet, None),
            (BoundaryCondition::Periodic, Some(0)),
            (BoundaryCondition::Neumann, Some(8)),
        ] {
            let a = CarryAutomaton::new(ShiftDirection::Plus, dims.clone(), boundary);
            for x in 0..8 {
                let src = a.source(&digits(x, &dims)).unwrap();
                assert_eq!(value(&src, &dims), x + 1);
            }
            let src = a.source(&digits(8, &dims)).map(|s| value(&s, &dims));
            assert_eq!(src, last);
        }
    }

    #[test]
    fn test_minus_automaton_mixed_radix() {
        let dims = vec![2, 3, 2];
        let a = CarryAutomaton::new(
            ShiftDirection::Minus,
            dims.clone(),
            BoundaryCondition::Periodic,
        );
        assert_eq!(a.paths().len(), 4);
        for x in 1..12 {
            let src = a.source(&digits(x, &dims)).unwrap();
            assert_eq!(value(&src, &dims), x - 1);
        }
        let wrap = a.source(&digits(0, &dims)).unwrap();
        assert_eq!(value(&wrap, &dims), 11);
    }

    #[test]
    fn test_to_opsum_checks_sites() {
        let a = CarryAutomaton::new(
            ShiftDirection::Plus,
            vec![2, 2],
            BoundaryCondition::Dirichlet,
        );

        let s = DynIndex::new_dyn(2);
        assert!(a.to_opsum(&[s.clone()], AnyScalar::new_real(1.0)).is_err());
        let t = DynIndex::new_dyn(2);
        let sum = a.to_opsum(&[s, t], AnyScalar::new_real(1.0)).unwrap();
        assert_eq!(sum.len(), 2);
    }

    #[test]
    fn test_stencil_rejects_bad_input() {
        let map = continuous_siteinds(&path_graph(3), &[vec![0, 1, 2]], 2).unwrap();
        let two = [1.0, -1.0].map(AnyScalar::new_real);
        assert!(matches!(
            stencil(&map, &two, 1, &OperatorParams::new()),
            Err(FunctionNetworkError::InvalidShifts(2))
        ));
        let w = [1.0, -2.0, 1.0].map(AnyScalar::new_real);
        assert!(matches!(
            stencil(&map, &w, 2, &OperatorParams::new().with_dimension(2)),
            Err(FunctionNetworkError::UnknownDimension(2))
        ));

        let grid = continuous_siteinds(&grid_graph(2, 2), &[vec![(0, 0), (0, 1)]], 2).unwrap();
        assert!(matches!(
            plus_shift(&grid, &OperatorParams::new()),
            Err(FunctionNetworkError::NotATree)
        ));
    }

    #[test]
    fn test_shift_bond_dimension() {
        let map = continuous_siteinds(&path_graph(4), &[vec![0, 1, 2, 3]], 2).unwrap();
        let op = plus_shift(&map, &OperatorParams::new()).unwrap();
        assert!(op.max_bond_dim() <= 2);
    }
}
