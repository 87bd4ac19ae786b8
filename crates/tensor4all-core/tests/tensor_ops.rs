use approx::assert_relative_eq;
use num_complex::Complex64;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use std::thread;
use tensor4all_core::{
    factorize_svd, AnyScalar, DynIndex, TensorDynLen, TruncationParams,
};

#[test]
fn test_index_ids_unique_across_threads() {
    const NUM_THREADS: usize = 4;
    const IDS_PER_THREAD: usize = 100;

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            thread::spawn(|| {
                (0..IDS_PER_THREAD)
                    .map(|_| DynIndex::new_dyn(2).id())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all_ids = HashSet::new();
    for handle in handles {
        all_ids.extend(handle.join().unwrap());
    }
    assert_eq!(all_ids.len(), NUM_THREADS * IDS_PER_THREAD);
}

#[test]
fn test_contraction_is_associative() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let i = DynIndex::new_dyn(2);
    let j = DynIndex::new_dyn(3);
    let k = DynIndex::new_dyn(4);
    let l = DynIndex::new_dyn(2);
    let a = TensorDynLen::random_f64(&mut rng, vec![i.clone(), j.clone()]);
    let b = TensorDynLen::random_c64(&mut rng, vec![j.clone(), k.clone()]);
    let c = TensorDynLen::random_f64(&mut rng, vec![k.clone(), l.clone()]);

    let left = (&(&a * &b)) * &c;
    let right = &a * &(&b * &c);
    assert_eq!(left.indices, vec![i, l]);
    assert!(left.distance(&right).unwrap() < 1e-12);
}

#[test]
fn test_scale_by_complex_promotes() {
    let i = DynIndex::new_dyn(2);
    let t = TensorDynLen::from_dense_f64(vec![i], vec![1.0, -2.0]);
    let s = t.scale(AnyScalar::new_complex(0.0, 1.0));
    assert!(s.is_complex());
    assert_eq!(s.get(&[1]), AnyScalar::C64(Complex64::new(0.0, -2.0)));
    assert_relative_eq!(s.norm(), 5f64.sqrt());
}

#[test]
fn test_truncated_svd_error_bounded_by_discarded_weight() {
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let i = DynIndex::new_dyn(6);
    let j = DynIndex::new_dyn(6);
    let t = TensorDynLen::random_f64(&mut rng, vec![i.clone(), j]);
    let f = factorize_svd(&t, &[i], &TruncationParams::new().with_max_rank(3)).unwrap();
    let approx_t = f.left.contract(&f.right);
    let err = approx_t.distance(&t).unwrap();
    assert_relative_eq!(err * err, f.discarded_weight, max_relative = 1e-8);
}

#[test]
fn test_fix_all_indices_yields_element() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let i = DynIndex::new_dyn(2);
    let j = DynIndex::new_dyn(3);
    let k = DynIndex::new_dyn(2);
    let t = TensorDynLen::random_f64(&mut rng, vec![i.clone(), j.clone(), k.clone()]);
    let v = t
        .fix_index(&j, 1)
        .unwrap()
        .fix_index(&k, 0)
        .unwrap()
        .fix_index(&i, 1)
        .unwrap()
        .only();
    assert_eq!(v, t.get(&[1, 1, 0]));
}
