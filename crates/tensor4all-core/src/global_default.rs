//! Global default values with atomic access.

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Error for invalid tolerance values.
#[derive(Debug, Error, Clone, Copy)]
#[error("Invalid rtol value: {0}. rtol must be finite and non-negative.")]
pub struct InvalidRtolError(pub f64);

/// A global default f64 value with atomic access.
///
/// # Example
///
/// ```
/// use tensor4all_core::GlobalDefault;
///
/// static MY_DEFAULT: GlobalDefault = GlobalDefault::new(1e-12);
///
/// MY_DEFAULT.set(1e-10).unwrap();
/// assert_eq!(MY_DEFAULT.get(), 1e-10);
/// ```
pub struct GlobalDefault {
    value: AtomicU64,
}

impl GlobalDefault {
    /// Create a new global default with the given initial value.
    #[must_use]
    pub const fn new(initial: f64) -> Self {
        Self {
            value: AtomicU64::new(initial.to_bits()),
        }
    }

    /// Get the current default value.
    #[must_use]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    /// Set a new default value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRtolError` if the value is not finite or is negative.
    pub fn set(&self, value: f64) -> Result<(), InvalidRtolError> {
        if !value.is_finite() || value < 0.0 {
            return Err(InvalidRtolError(value));
        }
        self.value.store(value.to_bits(), Ordering::Relaxed);
        Ok(())
    }
}

// Default value: 1e-12 (near machine precision)
static DEFAULT_SVD_RTOL: GlobalDefault = GlobalDefault::new(1e-12);

/// Get the global default rtol for SVD truncation.
pub fn default_svd_rtol() -> f64 {
    DEFAULT_SVD_RTOL.get()
}

/// Set the global default rtol for SVD truncation.
///
/// # Errors
///
/// Returns `InvalidRtolError` if `rtol` is not finite or is negative.
pub fn set_default_svd_rtol(rtol: f64) -> Result<(), InvalidRtolError> {
    DEFAULT_SVD_RTOL.set(rtol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_default_roundtrip() {
        static TEST_DEFAULT: GlobalDefault = GlobalDefault::new(1e-12);
        assert_eq!(TEST_DEFAULT.get(), 1e-12);
        TEST_DEFAULT.set(1e-8).unwrap();
        assert_eq!(TEST_DEFAULT.get(), 1e-8);
    }

    #[test]
    fn test_invalid_values() {
        static TEST_DEFAULT: GlobalDefault = GlobalDefault::new(1e-12);
        assert!(TEST_DEFAULT.set(f64::NAN).is_err());
        assert!(TEST_DEFAULT.set(f64::INFINITY).is_err());
        assert!(TEST_DEFAULT.set(-1.0).is_err());
        assert_eq!(TEST_DEFAULT.get(), 1e-12);
    }

    #[test]
    fn test_error_display() {
        let msg = InvalidRtolError(-1.0).to_string();
        assert!(msg.contains("-1"));
        assert!(msg.contains("rtol"));
    }
}
