//! Identity tensor construction for operator networks.

use anyhow::{ensure, Result};

use tensor4all_core::{DynIndex, TensorDynLen};

/// Build an identity operator tensor.
///
/// For input indices `{s1, s2, ...}` and output indices `{s1', s2', ...}`
/// the tensor is `T[s1, s1', s2, s2', ...] = δ_{s1,s1'} × δ_{s2,s2'} × ...`.
/// Without indices this is the scalar one.
///
/// # Example
///
/// For a single index of dimension 2:
/// ```text
/// T[s, s'] = δ_{s,s'} = [[1, 0], [0, 1]]
/// ```
pub fn build_identity_operator_tensor(
    site_indices: &[DynIndex],
    output_site_indices: &[DynIndex],
) -> Result<TensorDynLen> {
    ensure!(
        site_indices.len() == output_site_indices.len(),
        "Number of input indices ({}) must match output indices ({})",
        site_indices.len(),
        output_site_indices.len()
    );
    let mut result = TensorDynLen::delta(vec![]);
    for (inp, out) in site_indices.iter().zip(output_site_indices) {
        ensure!(
            inp.dim() == out.dim(),
            "Dimension mismatch: input index has dim {}, output has dim {}",
            inp.dim(),
            out.dim()
        );
        result = result.contract(&TensorDynLen::delta(vec![inp.clone(), out.clone()]));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_two_sites() {
        let s = [DynIndex::new_dyn(2), DynIndex::new_dyn(3)];
        let o = [s[0].sim(), s[1].sim()];
        let t = build_identity_operator_tensor(&s, &o).unwrap();
        assert_eq!(
            t.indices,
            vec![s[0].clone(), o[0].clone(), s[1].clone(), o[1].clone()]
        );

        assert_eq!(t.get(&[1, 1, 2, 2]).real(), 1.0);
        assert_eq!(t.get(&[1, 0, 2, 2]).real(), 0.0);
    }

    #[test]
    fn test_identity_dimension_mismatch() {
        let s = [DynIndex::new_dyn(2)];
        let o = [DynIndex::new_dyn(3)];
        assert!(build_identity_operator_tensor(&s, &o).is_err());
        assert!(build_identity_operator_tensor(&s, &[]).is_err());
    }
}
