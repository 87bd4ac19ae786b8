//! Greedy digit decomposition swept over bases and digit counts.

use proptest::prelude::*;
use tensor4all_core::DynIndex;
use tensor4all_functionnetwork::IndexMap;

fn uniform_map(base: usize, ndigits: usize) -> IndexMap {
    let entries = (0..ndigits)
        .map(|k| (DynIndex::new_dyn(base), 1, k + 1))
        .collect();
    IndexMap::real(base, entries).unwrap()
}

proptest! {
    #[test]
    fn round_trip_within_smallest_digit(
        base in 2usize..=5,
        ndigits in 1usize..=7,
        x in 0.0f64..1.0,
    ) {
        let map = uniform_map(base, ndigits);
        let values = map.calculate_ind_values(&[x], &[1]).unwrap();
        let p = map.calculate_p(&values, &[1]).unwrap()[0];
        let resolution = (base as f64).powi(-(ndigits as i32));
        prop_assert!(p <= x + resolution * 1e-9);
        prop_assert!(x - p < resolution * (1.0 + 1e-9));
    }

    #[test]
    fn representable_points_decode_exactly(
        base in 2usize..=5,
        ndigits in 1usize..=6,
        seed in 0usize..100_000,
    ) {
        let map = uniform_map(base, ndigits);
        let total = base.pow(ndigits as u32);
        let j = seed % total;
        let x = j as f64 / total as f64;
        let values = map.calculate_ind_values(&[x], &[1]).unwrap();
        let mut digits: Vec<(usize, usize)> = values
            .iter()
            .map(|(i, &v)| (map.digit(i).unwrap(), v))
            .collect();
        digits.sort();
        let decoded = digits.iter().fold(0, |acc, &(_, v)| acc * base + v);
        prop_assert_eq!(decoded, j);
    }

    #[test]
    fn grid_points_round_trip(base in 2usize..=5, ndigits in 1usize..=5, count in 1usize..=20) {
        let map = uniform_map(base, ndigits);
        prop_assume!(count <= base.pow(ndigits as u32));
        for x in map.grid_points(1, count).unwrap() {
            let values = map.calculate_ind_values(&[x], &[1]).unwrap();
            let p = map.calculate_p(&values, &[1]).unwrap()[0];
            prop_assert!((p - x).abs() < 1e-12);
        }
    }
}
