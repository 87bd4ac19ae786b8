use num_complex::Complex64;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Dynamic scalar value (for dynamic element type tensors).
///
/// Supports both real (`f64`) and complex (`Complex64`) scalar values.
/// Mixed arithmetic promotes to complex.
#[derive(Debug, Clone, Copy)]
pub enum AnyScalar {
    /// Real value.
    F64(f64),
    /// Complex value.
    C64(Complex64),
}

impl AnyScalar {
    /// Create a real scalar value.
    ///
    /// # Examples
    /// ```
    /// use tensor4all_core::AnyScalar;
    /// let s = AnyScalar::new_real(3.5);
    /// assert!(!s.is_complex());
    /// ```
    pub fn new_real(x: f64) -> Self {
        x.into()
    }

    /// Create a complex scalar value from real and imaginary parts.
    ///
    /// # Examples
    /// ```
    /// use tensor4all_core::AnyScalar;
    /// let s = AnyScalar::new_complex(1.0, 2.0);  // 1 + 2i
    /// assert!(s.is_complex());
    /// ```
    pub fn new_complex(re: f64, im: f64) -> Self {
        Complex64::new(re, im).into()
    }

    /// The imaginary unit `i`.
    pub fn imaginary_unit() -> Self {
        AnyScalar::C64(Complex64::i())
    }

    /// Check if this scalar is complex.
    pub fn is_complex(&self) -> bool {
        matches!(self, AnyScalar::C64(_))
    }

    /// Get the real part of the scalar.
    pub fn real(&self) -> f64 {
        match self {
            AnyScalar::F64(x) => *x,
            AnyScalar::C64(z) => z.re,
        }
    }

    /// Get the imaginary part of the scalar (zero for real values).
    pub fn imag(&self) -> f64 {
        match self {
            AnyScalar::F64(_) => 0.0,
            AnyScalar::C64(z) => z.im,
        }
    }

    /// Get the absolute value (magnitude).
    pub fn abs(&self) -> f64 {
        match self {
            AnyScalar::F64(x) => x.abs(),
            AnyScalar::C64(z) => z.norm(),
        }
    }

    /// Convert to `Complex64` regardless of variant.
    pub fn to_c64(&self) -> Complex64 {
        (*self).into()
    }

    /// Complex conjugate.
    pub fn conj(&self) -> Self {
        match self {
            AnyScalar::F64(x) => AnyScalar::F64(*x),
            AnyScalar::C64(z) => AnyScalar::C64(z.conj()),
        }
    }

    /// Exponential function.
    pub fn exp(&self) -> Self {
        match self {
            AnyScalar::F64(x) => AnyScalar::F64(x.exp()),
            AnyScalar::C64(z) => AnyScalar::C64(z.exp()),
        }
    }

    /// Compute square root.
    ///
    /// For negative real numbers, returns a complex number with the principal value.
    pub fn sqrt(&self) -> Self {
        match self {
            AnyScalar::F64(x) => {
                if *x >= 0.0 {
                    AnyScalar::F64(x.sqrt())
                } else {
                    AnyScalar::C64(Complex64::new(*x, 0.0).sqrt())
                }
            }
            AnyScalar::C64(z) => AnyScalar::C64(z.sqrt()),
        }
    }

    /// Raise to a floating-point power.
    ///
    /// For negative real numbers, returns a complex number with the principal value.
    pub fn powf(&self, exp: f64) -> Self {
        match self {
            AnyScalar::F64(x) => {
                if *x >= 0.0 {
                    AnyScalar::F64(x.powf(exp))
                } else {
                    AnyScalar::C64(Complex64::new(*x, 0.0).powf(exp))
                }
            }
            AnyScalar::C64(z) => AnyScalar::C64(z.powf(exp)),
        }
    }

    /// Raise to an integer power.
    ///
    /// `powi(0)` is one, including for a zero base.
    pub fn powi(&self, exp: i32) -> Self {
        match self {
            AnyScalar::F64(x) => AnyScalar::F64(x.powi(exp)),
            AnyScalar::C64(z) => AnyScalar::C64(z.powi(exp)),
        }
    }

    /// Check if this scalar is zero.
    ///
    /// This method is provided directly on `AnyScalar` so that downstream crates
    /// don't need to import the `num_traits::Zero` trait.
    pub fn is_zero(&self) -> bool {
        match self {
            AnyScalar::F64(x) => *x == 0.0,
            AnyScalar::C64(z) => z.re == 0.0 && z.im == 0.0,
        }
    }

    /// Demote to a real value when the imaginary part is exactly zero.
    pub fn simplify(self) -> Self {
        match self {
            AnyScalar::C64(z) if z.im == 0.0 => AnyScalar::F64(z.re),
            other => other,
        }
    }
}

impl PartialEq for AnyScalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AnyScalar::F64(a), AnyScalar::F64(b)) => a == b,
            _ => self.to_c64() == other.to_c64(),
        }
    }
}

macro_rules! impl_binop {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for AnyScalar {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                match (self, rhs) {
                    (AnyScalar::F64(a), AnyScalar::F64(b)) => AnyScalar::F64(a $op b),
                    (AnyScalar::F64(a), AnyScalar::C64(b)) => {
                        AnyScalar::C64(Complex64::new(a, 0.0) $op b)
                    }
                    (AnyScalar::C64(a), AnyScalar::F64(b)) => {
                        AnyScalar::C64(a $op Complex64::new(b, 0.0))
                    }
                    (AnyScalar::C64(a), AnyScalar::C64(b)) => AnyScalar::C64(a $op b),
                }
            }
        }
    };
}

impl_binop!(Add, add, +);
impl_binop!(Sub, sub, -);
impl_binop!(Mul, mul, *);
impl_binop!(Div, div, /);

impl Mul<f64> for AnyScalar {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self * AnyScalar::F64(rhs)
    }
}

impl Neg for AnyScalar {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            AnyScalar::F64(x) => AnyScalar::F64(-x),
            AnyScalar::C64(z) => AnyScalar::C64(-z),
        }
    }
}

impl From<f64> for AnyScalar {
    fn from(x: f64) -> Self {
        AnyScalar::F64(x)
    }
}

impl From<Complex64> for AnyScalar {
    fn from(z: Complex64) -> Self {
        AnyScalar::C64(z)
    }
}

impl std::convert::TryFrom<AnyScalar> for f64 {
    type Error = &'static str;

    fn try_from(value: AnyScalar) -> Result<Self, Self::Error> {
        match value {
            AnyScalar::F64(x) => Ok(x),
            AnyScalar::C64(_) => Err("Cannot convert complex number to f64"),
        }
    }
}

impl From<AnyScalar> for Complex64 {
    fn from(value: AnyScalar) -> Self {
        match value {
            AnyScalar::F64(x) => Complex64::new(x, 0.0),
            AnyScalar::C64(z) => z,
        }
    }
}

impl Default for AnyScalar {
    fn default() -> Self {
        AnyScalar::F64(0.0)
    }
}

impl Zero for AnyScalar {
    fn zero() -> Self {
        AnyScalar::F64(0.0)
    }

    fn is_zero(&self) -> bool {
        AnyScalar::is_zero(self)
    }
}

impl One for AnyScalar {
    fn one() -> Self {
        AnyScalar::F64(1.0)
    }
}

impl fmt::Display for AnyScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyScalar::F64(x) => write!(f, "{}", x),
            AnyScalar::C64(z) => write!(f, "{}", z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mixed_arithmetic_promotes() {
        let a = AnyScalar::new_real(2.0);
        let b = AnyScalar::new_complex(0.0, 1.0);
        let c = a * b;
        assert!(c.is_complex());
        assert_eq!(c, AnyScalar::new_complex(0.0, 2.0));
        assert_eq!(a + a, AnyScalar::new_real(4.0));
    }

    #[test]
    fn test_powf_negative_real_principal_branch() {
        let r = AnyScalar::new_real(-8.0).powf(1.0 / 3.0);
        assert!(r.is_complex());
        // Principal cube root of -8 is 2 e^{iπ/3}
        assert_relative_eq!(r.real(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.imag(), 3f64.sqrt(), epsilon = 1e-12);
        let back = r.powi(3);
        assert_relative_eq!(back.real(), -8.0, epsilon = 1e-10);
        assert!(back.imag().abs() < 1e-10);
    }

    #[test]
    fn test_sqrt_and_exp() {
        assert_eq!(AnyScalar::new_real(4.0).sqrt(), AnyScalar::new_real(2.0));
        let s = AnyScalar::new_real(-4.0).sqrt();
        assert_relative_eq!(s.imag(), 2.0, epsilon = 1e-14);
        let e = (AnyScalar::imaginary_unit() * std::f64::consts::PI).exp();
        assert_relative_eq!(e.real(), -1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_simplify_and_zero() {
        assert!(!AnyScalar::new_complex(1.5, 0.0).simplify().is_complex());
        assert!(AnyScalar::new_complex(1.5, 1.0).simplify().is_complex());
        assert!(AnyScalar::zero().is_zero());
        assert!(f64::try_from(AnyScalar::new_complex(1.0, 1.0)).is_err());
    }
}
