//! Tests for TensorNetwork operations: add, truncate, evaluate, operator application.

use std::collections::HashMap;

use approx::assert_relative_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tensor4all_core::{AnyScalar, DynIndex, HasTruncationParams, TensorDynLen};
use tensor4all_treetn::graphs::{comb_tree, path_graph};
use tensor4all_treetn::{
    apply_linear_operator, random_network_f64, random_tree, LinkSpace, LinearOperator, LocalOp,
    OpString, OpSum, SiteIndexNetwork, TensorNetwork, TruncationOptions,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// All 0/1 assignments of the given binary site indices.
fn binary_assignments(sites: &[DynIndex]) -> Vec<HashMap<DynIndex, usize>> {
    (0..1usize << sites.len())
        .map(|x| {
            sites
                .iter()
                .enumerate()
                .map(|(k, s)| (s.clone(), (x >> k) & 1))
                .collect()
        })
        .collect()
}

/// Create a 2-node network f(s0, s1) = s0 + 2 s1 with a rank-2 link.
fn create_linear_two_node() -> (TensorNetwork<usize>, DynIndex, DynIndex) {
    let s0 = DynIndex::new_dyn(2);
    let s1 = DynIndex::new_dyn(2);
    let l = DynIndex::new_link(2);
    // t0[s0, l] = [s0, 1], t1[l, s1] = [1, 2 s1]
    let t0 = TensorDynLen::from_dense_f64(vec![s0.clone(), l.clone()], vec![0.0, 1.0, 1.0, 1.0]);
    let t1 = TensorDynLen::from_dense_f64(vec![l, s1.clone()], vec![1.0, 1.0, 0.0, 2.0]);
    let net = TensorNetwork::from_tensors(vec![t0, t1], vec![0, 1]).unwrap();
    (net, s0, s1)
}

// ============================================================================
// Evaluate / add
// ============================================================================

#[test]
fn test_evaluate_two_node() {
    let (net, s0, s1) = create_linear_two_node();
    for (a, b) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        let assignment = HashMap::from([(s0.clone(), a), (s1.clone(), b)]);
        assert_relative_eq!(
            net.evaluate(&assignment).unwrap().real(),
            a as f64 + 2.0 * b as f64
        );
    }
}

#[test]
fn test_add_is_pointwise_sum_on_random_tree() {
    let mut rng = ChaCha8Rng::seed_from_u64(100);
    let topo = random_tree(&mut rng, 6);
    let sites = SiteIndexNetwork::from_topology(&topo, |_| vec![DynIndex::new_dyn(2)]).unwrap();
    let f = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(2)).unwrap();
    let g = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(3)).unwrap();
    let h = f.add(&g).unwrap();
    assert_eq!(h.max_bond_dim(), 5);
    for a in binary_assignments(&sites.all_site_indices()) {
        let expected = f.evaluate(&a).unwrap() + g.evaluate(&a).unwrap();
        assert!((h.evaluate(&a).unwrap() - expected).abs() < 1e-10);
    }
}

// ============================================================================
// Truncation
// ============================================================================

#[test]
fn test_truncate_sum_of_copies() {
    let mut rng = ChaCha8Rng::seed_from_u64(101);
    let sites = SiteIndexNetwork::from_topology(&comb_tree(2, 3), |_| {
        vec![DynIndex::new_dyn(2)]
    })
    .unwrap();
    let f = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(2)).unwrap();
    let mut acc = f.clone();
    for _ in 0..3 {
        acc = acc.add(&f).unwrap();
    }
    assert_eq!(acc.max_bond_dim(), 8);
    let options = TruncationOptions::new().with_rtol(1e-10);
    let t = acc.truncate(&options).unwrap();
    assert!(t.max_bond_dim() <= 2);
    let assignments = binary_assignments(&sites.all_site_indices());
    for a in assignments.iter().step_by(7) {

        let expected = f.evaluate(a).unwrap() * 4.0;
        assert!((t.evaluate(a).unwrap() - expected).abs() < 1e-8);
    }
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_apply_sum_of_local_operators() {
    // A = Z on site 0 + Z on site 2, Z = diag(1, -1)
    let mut rng = ChaCha8Rng::seed_from_u64(102);
    let sites =
        SiteIndexNetwork::from_topology(&path_graph(3), |_| vec![DynIndex::new_dyn(2)]).unwrap();
    let s = sites.all_site_indices();
    let z = LocalOp::from_fn(2, |o, i| {
        AnyScalar::new_real(match (o, i) {
            (0, 0) => 1.0,
            (1, 1) => -1.0,
            _ => 0.0,
        })
    });
    let mut sum = OpSum::new();
    sum.push(OpString::new(AnyScalar::new_real(1.0)).with(s[0].clone(), z.clone()));
    sum.push(OpString::new(AnyScalar::new_real(1.0)).with(s[2].clone(), z));
    let op = sum.compile(&sites, &TruncationOptions::new()).unwrap();
    assert_eq!(op.max_bond_dim(), 2);

    let f = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(2)).unwrap();
    let g = apply_linear_operator(&op, &f, &TruncationOptions::new()).unwrap();
    for a in binary_assignments(&s) {
        let sign = |k: usize| if a[&s[k]] == 0 { 1.0 } else { -1.0 };
        let expected = f.evaluate(&a).unwrap() * (sign(0) + sign(2));
        assert!((g.evaluate(&a).unwrap() - expected).abs() < 1e-10);
    }
}

#[test]
fn test_identity_operator_on_random_tree() {
    let mut rng = ChaCha8Rng::seed_from_u64(103);
    let topo = random_tree(&mut rng, 5);
    let sites = SiteIndexNetwork::from_topology(&topo, |_| vec![DynIndex::new_dyn(3)]).unwrap();
    let f = random_network_f64(&mut rng, &sites, &LinkSpace::uniform(2)).unwrap();
    let id = LinearOperator::identity(&sites).unwrap();
    let g = apply_linear_operator(&id, &f, &TruncationOptions::new()).unwrap();
    let a = f.contract_all().unwrap();
    let b = g.contract_all().unwrap();
    assert!(a.distance(&b).unwrap() < 1e-10 * a.norm());
}
