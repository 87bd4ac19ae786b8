//! Truncation parameters shared by SVD factorization and network compression.

/// Common truncation parameters.
///
/// # Semantics
///
/// This crate uses **relative tolerance** (`rtol`) semantics: the retained
/// rank `r` is the smallest one whose discarded weight satisfies
/// `Σ_{i>r} σ_i² <= rtol² Σ_i σ_i²`.
///
/// ITensorMPS.jl uses **cutoff** semantics (`σ_i² < cutoff` for normalized
/// tensors). To match it use `rtol = sqrt(cutoff)`, which is what
/// [`with_cutoff`](TruncationParams::with_cutoff) does.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TruncationParams {
    /// Relative tolerance for truncation.
    ///
    /// If `None`, uses the global default tolerance
    /// ([`default_svd_rtol`](crate::default_svd_rtol)).
    pub rtol: Option<f64>,

    /// Maximum rank (bond dimension).
    ///
    /// If `None`, no rank limit is applied.
    pub max_rank: Option<usize>,

    /// Cutoff value (ITensorMPS.jl convention).
    ///
    /// Tracks the original cutoff for inspection; `rtol` is always the
    /// authoritative tolerance.
    pub cutoff: Option<f64>,
}

impl TruncationParams {
    /// Create new truncation parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relative tolerance. Clears any previously set cutoff origin.
    #[must_use]
    pub fn with_rtol(mut self, rtol: f64) -> Self {
        self.rtol = Some(rtol);
        self.cutoff = None;
        self
    }

    /// Set the maximum rank.
    #[must_use]
    pub fn with_max_rank(mut self, max_rank: usize) -> Self {
        self.max_rank = Some(max_rank);
        self
    }

    /// Set cutoff (ITensorMPS.jl convention), converted to `rtol = √cutoff`.
    #[must_use]
    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = Some(cutoff);
        self.rtol = Some(cutoff.sqrt());
        self
    }

    /// Get the effective rtol, using the provided default if not set.
    #[must_use]
    pub fn effective_rtol(&self, default: f64) -> f64 {
        self.rtol.unwrap_or(default)
    }

    /// Get the effective max_rank, using `usize::MAX` if not set.
    #[must_use]
    pub fn effective_max_rank(&self) -> usize {
        self.max_rank.unwrap_or(usize::MAX)
    }

    /// Parameters that never discard anything.
    #[must_use]
    pub fn exact() -> Self {
        Self::new().with_rtol(0.0)
    }
}

/// Trait for options structs that contain truncation parameters.
pub trait HasTruncationParams {
    /// Get a reference to the truncation parameters.
    fn truncation_params(&self) -> &TruncationParams;

    /// Get a mutable reference to the truncation parameters.
    fn truncation_params_mut(&mut self) -> &mut TruncationParams;

    /// Get the rtol value.
    fn rtol(&self) -> Option<f64> {
        self.truncation_params().rtol
    }

    /// Get the max_rank value.
    fn max_rank(&self) -> Option<usize> {
        self.truncation_params().max_rank
    }

    /// Set the rtol value (builder pattern).
    fn with_rtol(mut self, rtol: f64) -> Self
    where
        Self: Sized,
    {
        let p = self.truncation_params_mut();
        p.rtol = Some(rtol);
        p.cutoff = None;
        self
    }

    /// Set the max_rank value (builder pattern).
    fn with_max_rank(mut self, max_rank: usize) -> Self
    where
        Self: Sized,
    {
        self.truncation_params_mut().max_rank = Some(max_rank);
        self
    }

    /// Set cutoff (builder pattern), converted to `rtol = √cutoff`.
    fn with_cutoff(mut self, cutoff: f64) -> Self
    where
        Self: Sized,
    {
        let p = self.truncation_params_mut();
        p.cutoff = Some(cutoff);
        p.rtol = Some(cutoff.sqrt());
        self
    }
}

impl HasTruncationParams for TruncationParams {
    fn truncation_params(&self) -> &TruncationParams {
        self
    }

    fn truncation_params_mut(&mut self) -> &mut TruncationParams {
        self
    }
}

/// Number of singular values to keep under `params`.
///
/// `s_vec` must be sorted in descending order. At least one value is kept.
pub fn retained_rank(s_vec: &[f64], params: &TruncationParams, default_rtol: f64) -> usize {
    let rtol = params.effective_rtol(default_rtol);
    let r = compute_retained_rank(s_vec, rtol);
    r.min(params.effective_max_rank()).max(1)
}

fn compute_retained_rank(s_vec: &[f64], rtol: f64) -> usize {
    if s_vec.is_empty() {
        return 1;
    }
    let total_sq_norm: f64 = s_vec.iter().map(|&s| s * s).sum();
    if total_sq_norm == 0.0 {
        return 1;
    }

    // Accumulate discarded weight from the smallest value upwards
    let threshold = rtol * rtol * total_sq_norm;
    let mut discarded_sq_norm = 0.0;
    let mut r = s_vec.len();
    for i in (0..s_vec.len()).rev() {
        let s_sq = s_vec[i] * s_vec[i];
        if discarded_sq_norm + s_sq <= threshold {
            discarded_sq_norm += s_sq;
            r = i;
        } else {
            break;
        }
    }
    r.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_params_builder() {
        let params = TruncationParams::new().with_rtol(1e-10).with_max_rank(50);
        assert_eq!(params.rtol, Some(1e-10));
        assert_eq!(params.max_rank, Some(50));
        assert_eq!(params.cutoff, None);
    }

    #[test]
    fn test_cutoff_sets_rtol() {
        let params = TruncationParams::new().with_cutoff(1e-10);
        assert_eq!(params.cutoff, Some(1e-10));
        assert!((params.rtol.unwrap() - 1e-5).abs() < 1e-20);
        let params = params.with_rtol(1e-3);
        assert_eq!(params.cutoff, None);
    }

    #[test]
    fn test_effective_values() {
        let params = TruncationParams::new();
        assert_eq!(params.effective_rtol(1e-12), 1e-12);
        assert_eq!(params.effective_max_rank(), usize::MAX);
    }

    #[test]
    fn test_retained_rank_drops_small_tail() {
        let s = [1.0, 0.5, 1e-8, 1e-9];
        assert_eq!(
            retained_rank(&s, &TruncationParams::new().with_rtol(1e-6), 0.0),
            2
        );
        assert_eq!(retained_rank(&s, &TruncationParams::exact(), 1e-12), 4);
        assert_eq!(
            retained_rank(&s, &TruncationParams::new().with_max_rank(1), 0.0),
            1
        );
    }

    #[test]
    fn test_retained_rank_zero_matrix_keeps_one() {
        assert_eq!(
            retained_rank(&[0.0, 0.0], &TruncationParams::new(), 1e-12),
            1
        );

        assert_eq!(retained_rank(&[], &TruncationParams::new(), 1e-12), 1);
    }
}
