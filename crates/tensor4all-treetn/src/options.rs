//! Options for network truncation.

use tensor4all_core::truncation::{HasTruncationParams, TruncationParams};

/// Options for truncation operations.
///
/// # Builder Pattern
///
/// ```
/// use tensor4all_treetn::TruncationOptions;
/// use tensor4all_core::HasTruncationParams;
///
/// let options = TruncationOptions::default()
///     .with_max_rank(50)
///     .with_rtol(1e-10);
/// assert_eq!(options.max_rank(), Some(50));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TruncationOptions {
    /// Truncation parameters (rtol, max_rank).
    pub truncation: TruncationParams,
}

impl HasTruncationParams for TruncationOptions {
    fn truncation_params(&self) -> &TruncationParams {
        &self.truncation
    }

    fn truncation_params_mut(&mut self) -> &mut TruncationParams {
        &mut self.truncation
    }
}

impl TruncationOptions {
    /// Create options with default settings (global default rtol, no rank limit).
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that keep every nonzero singular value.
    pub fn exact() -> Self {
        Self {
            truncation: TruncationParams::exact(),
        }
    }

    /// Wrap existing truncation parameters.
    pub fn from_params(truncation: TruncationParams) -> Self {
        Self { truncation }
    }
}
