//! Parameters shared by the elementary function builders.

use tensor4all_core::AnyScalar;
use tensor4all_treetn::TruncationOptions;

/// Parameters of a builder for `c · f(k·x + a)` along one coordinate.
///
/// # Builder Pattern
///
/// ```
/// use tensor4all_functionnetwork::FunctionParams;
///
/// let params = FunctionParams::default().with_k(2.0).with_c(0.5).with_dimension(2);
/// assert_eq!(params.nterms, 20);
/// assert_eq!(params.dimension, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionParams {
    /// Multiplier of the coordinate (default 1)
    pub k: AnyScalar,
    /// Offset added after scaling the coordinate (default 0)
    pub a: AnyScalar,
    /// Output scale (default 1)
    pub c: AnyScalar,
    /// Number of series terms for `tanh` (default 20)
    pub nterms: usize,
    /// Target coordinate axis, 1-based (default 1)
    pub dimension: usize,
}

impl Default for FunctionParams {
    fn default() -> Self {
        Self {
            k: AnyScalar::new_real(1.0),
            a: AnyScalar::new_real(0.0),
            c: AnyScalar::new_real(1.0),
            nterms: 20,
            dimension: 1,
        }
    }
}

impl FunctionParams {
    /// Default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `k`.
    pub fn with_k(mut self, k: impl Into<AnyScalar>) -> Self {
        self.k = k.into();
        self
    }

    /// Set `a`.
    pub fn with_a(mut self, a: impl Into<AnyScalar>) -> Self {
        self.a = a.into();
        self
    }

    /// Set `c`.
    pub fn with_c(mut self, c: impl Into<AnyScalar>) -> Self {
        self.c = c.into();
        self
    }

    /// Set the number of `tanh` series terms.
    pub fn with_nterms(mut self, nterms: usize) -> Self {
        self.nterms = nterms;
        self
    }

    /// Set the target dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}

/// Treatment of values shifted beyond the end of the domain `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    /// Values beyond the domain are zero
    #[default]
    Dirichlet,
    /// The domain wraps around
    Periodic,
    /// The boundary value is repeated
    Neumann,
}

/// Parameters of the operator builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatorParams {
    /// Target coordinate axis, 1-based (default 1)
    pub dimension: usize,
    /// Boundary condition of the shifts (default Dirichlet)
    pub boundary: BoundaryCondition,
    /// Truncation applied after compiling and scaling
    pub truncation: TruncationOptions,
}

impl Default for OperatorParams {
    fn default() -> Self {
        Self {
            dimension: 1,
            boundary: BoundaryCondition::default(),
            truncation: TruncationOptions::default(),
        }
    }
}

impl OperatorParams {
    /// Dimension 1, Dirichlet boundary, default truncation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the boundary condition.
    pub fn with_boundary(mut self, boundary: BoundaryCondition) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the truncation options.
    pub fn with_truncation(mut self, truncation: TruncationOptions) -> Self {
        self.truncation = truncation;
        self
    }
}
