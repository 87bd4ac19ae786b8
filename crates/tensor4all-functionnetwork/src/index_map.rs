//! Positional digit encoding of continuous coordinates.
//!
//! An [`IndexMap`] assigns every digit index to a coordinate axis
//! (`dimension`, 1-based), a digit level (`digit`, 1 = most significant) and,
//! for complex coordinates, a part. Setting index `s` to value `v`
//! contributes `v / dim(s)^digit` to its coordinate (times `i` for
//! imaginary-part indices). Index sizes may differ from index to index, so
//! mixed radices are supported.

use std::collections::{BTreeMap, HashMap, HashSet};

use num_complex::Complex64;
use tensor4all_core::{AnyScalar, DynIndex};

use crate::error::{FunctionNetworkError, Result};

/// Numeric domain of the encoded coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarDomain {
    /// Real coordinates in `[0, 1)`
    #[default]
    Real,
    /// Complex coordinates, real and imaginary parts in `[0, 1)`
    Complex,
}

/// Part of a complex coordinate that a digit contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Part {
    /// Real part
    Real,
    /// Imaginary part
    Imaginary,
}

/// Role of one digit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigitSpec {
    /// Coordinate axis, 1-based
    pub dimension: usize,
    /// Digit level, 1 = most significant
    pub digit: usize,
    /// Part of the coordinate
    pub part: Part,
}

impl DigitSpec {
    /// Real-part digit.
    pub fn real(dimension: usize, digit: usize) -> Self {
        Self {
            dimension,
            digit,
            part: Part::Real,
        }
    }

    /// Imaginary-part digit.
    pub fn imaginary(dimension: usize, digit: usize) -> Self {
        Self {
            dimension,
            digit,
            part: Part::Imaginary,
        }
    }
}

/// Mapping between digit indices and coordinate contributions.
///
/// Immutable after construction. For every `(dimension, part)` the digit
/// levels form the contiguous range `1..=L`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMap {
    base: usize,
    domain: ScalarDomain,
    info: HashMap<DynIndex, DigitSpec>,
}

impl IndexMap {
    /// Build a map from `(index, role)` entries.
    ///
    /// # Errors
    /// Returns [`FunctionNetworkError::InvalidIndexMap`] if `base < 2`, an
    /// index is listed twice, a dimension or digit is 0, digits of a
    /// `(dimension, part)` pair are not `1..=L`, or a real map carries
    /// imaginary-part digits.
    pub fn new(
        base: usize,
        domain: ScalarDomain,
        entries: impl IntoIterator<Item = (DynIndex, DigitSpec)>,
    ) -> Result<Self> {
        if base < 2 {
            return Err(FunctionNetworkError::InvalidIndexMap(format!(
                "base must be at least 2, got {}",
                base
            )));
        }
        let mut info = HashMap::new();
        for (index, spec) in entries {
            if spec.dimension == 0 || spec.digit == 0 {
                return Err(FunctionNetworkError::InvalidIndexMap(format!(
                    "dimension and digit are 1-based, got {:?} for {:?}",
                    spec, index
                )));
            }
            if domain == ScalarDomain::Real && spec.part == Part::Imaginary {
                return Err(FunctionNetworkError::InvalidIndexMap(format!(
                    "imaginary digit {:?} in a real map",
                    index
                )));
            }
            if info.insert(index.clone(), spec).is_some() {
                return Err(FunctionNetworkError::InvalidIndexMap(format!(
                    "index {:?} listed twice",
                    index
                )));
            }
        }

        let mut levels: BTreeMap<(usize, Part), Vec<usize>> = BTreeMap::new();
        for spec in info.values() {
            levels
                .entry((spec.dimension, spec.part))
                .or_default()
                .push(spec.digit);
        }
        for ((dimension, part), mut digits) in levels {
            digits.sort_unstable();
            if digits.iter().enumerate().any(|(k, &d)| d != k + 1) {
                return Err(FunctionNetworkError::InvalidIndexMap(format!(
                    "digits of dimension {} ({:?}) are {:?}, expected 1..={}",
                    dimension,
                    part,
                    digits,
                    digits.len()
                )));
            }
        }

        Ok(Self { base, domain, info })
    }

    /// Real map from `(index, dimension, digit)` triples.
    pub fn real(base: usize, entries: Vec<(DynIndex, usize, usize)>) -> Result<Self> {
        Self::new(
            base,
            ScalarDomain::Real,
            entries
                .into_iter()
                .map(|(index, dimension, digit)| (index, DigitSpec::real(dimension, digit))),
        )
    }

    /// Declared radix.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Numeric domain.
    pub fn domain(&self) -> ScalarDomain {
        self.domain
    }

    /// Whether coordinates are complex.
    pub fn is_complex(&self) -> bool {
        self.domain == ScalarDomain::Complex
    }

    /// Role of an index.
    pub fn spec(&self, index: &DynIndex) -> Option<&DigitSpec> {
        self.info.get(index)
    }

    /// Whether the map knows `index`.
    pub fn contains(&self, index: &DynIndex) -> bool {
        self.info.contains_key(index)
    }

    /// Coordinate axis of an index.
    pub fn dimension(&self, index: &DynIndex) -> Option<usize> {
        self.info.get(index).map(|s| s.dimension)
    }

    /// Digit level of an index.
    pub fn digit(&self, index: &DynIndex) -> Option<usize> {
        self.info.get(index).map(|s| s.digit)
    }

    /// Part of an index.
    pub fn part(&self, index: &DynIndex) -> Option<Part> {
        self.info.get(index).map(|s| s.part)
    }

    /// Number of indices.
    pub fn len(&self) -> usize {
        self.info.len()
    }

    /// Whether the map has no indices.
    pub fn is_empty(&self) -> bool {
        self.info.is_empty()
    }

    /// All indices, sorted by `(dimension, part, digit)`.
    pub fn indices(&self) -> Vec<DynIndex> {
        let mut all: Vec<(&DynIndex, &DigitSpec)> = self.info.iter().collect();
        all.sort_by_key(|(_, s)| (s.dimension, s.part, s.digit));
        all.into_iter().map(|(i, _)| i.clone()).collect()
    }

    /// Coordinate axes present in the map, sorted.
    pub fn dimensions(&self) -> Vec<usize> {
        let set: HashSet<usize> = self.info.values().map(|s| s.dimension).collect();
        let mut dims: Vec<usize> = set.into_iter().collect();
        dims.sort_unstable();
        dims
    }

    /// Indices of one part of a dimension, most significant first.
    pub fn dimension_indices_part(&self, dimension: usize, part: Part) -> Vec<DynIndex> {
        let mut inds: Vec<(&DynIndex, usize)> = self
            .info
            .iter()
            .filter(|(_, s)| s.dimension == dimension && s.part == part)
            .map(|(i, s)| (i, s.digit))
            .collect();
        inds.sort_by_key(|&(_, d)| d);
        inds.into_iter().map(|(i, _)| i.clone()).collect()
    }

    /// Indices of a dimension: real-part digits then imaginary-part digits,
    /// each most significant first.
    pub fn dimension_indices(&self, dimension: usize) -> Vec<DynIndex> {
        let mut inds = self.dimension_indices_part(dimension, Part::Real);
        inds.extend(self.dimension_indices_part(dimension, Part::Imaginary));
        inds
    }

    /// Positional weight `dim(index)^(-digit)`.
    pub fn weight(&self, index: &DynIndex) -> Option<f64> {
        self.info
            .get(index)
            .map(|s| (index.dim() as f64).powi(-(s.digit as i32)))
    }

    /// Contribution of `index` set to `value` to its coordinate.
    ///
    /// Real in a real map; complex (`i·v/dim^digit` for imaginary parts) in
    /// a complex map.
    pub fn value_to_scalar(&self, index: &DynIndex, value: usize) -> Result<AnyScalar> {
        let spec = self.info.get(index).ok_or_else(|| {
            FunctionNetworkError::InvalidArgument(format!("index {:?} is not in the map", index))
        })?;
        let w = value as f64 * (index.dim() as f64).powi(-(spec.digit as i32));
        Ok(match (self.domain, spec.part) {
            (ScalarDomain::Real, _) => AnyScalar::new_real(w),
            (ScalarDomain::Complex, Part::Real) => AnyScalar::new_complex(w, 0.0),
            (ScalarDomain::Complex, Part::Imaginary) => AnyScalar::new_complex(0.0, w),
        })
    }

    /// Contributions of every local value of `index`.
    pub fn index_values_to_scalars(&self, index: &DynIndex) -> Result<Vec<AnyScalar>> {
        (0..index.dim())
            .map(|v| self.value_to_scalar(index, v))
            .collect()
    }

    fn check_dims(&self, len: usize, dims: &[usize]) -> Result<()> {
        if len != dims.len() {
            return Err(FunctionNetworkError::InvalidArgument(format!(
                "{} coordinates for {} dimensions",
                len,
                dims.len()
            )));
        }
        let mut seen = HashSet::new();
        for &d in dims {
            if !self.info.values().any(|s| s.dimension == d) {
                return Err(FunctionNetworkError::UnknownDimension(d));
            }
            if !seen.insert(d) {
                return Err(FunctionNetworkError::InvalidArgument(format!(
                    "dimension {} listed more than once",
                    d
                )));
            }
        }
        Ok(())
    }

    /// Greedy digit decomposition of `x` over `inds` (most significant first).
    ///
    /// Each digit takes the largest local value whose contribution fits the
    /// residual, with a slack of `1e-10` of the smallest digit weight.
    fn decompose(&self, x: f64, inds: &[DynIndex], out: &mut HashMap<DynIndex, usize>) {
        let weights: Vec<f64> = inds
            .iter()
            .map(|i| self.weight(i).unwrap_or(0.0))
            .collect();
        let slack = 1e-10 * weights.iter().cloned().fold(f64::INFINITY, f64::min);
        let mut residual = x;
        for (index, w) in inds.iter().zip(&weights) {
            let value = (1..index.dim())
                .rev()
                .find(|&v| v as f64 * w <= residual + slack)
                .unwrap_or(0);
            residual -= value as f64 * w;
            out.insert(index.clone(), value);
        }
    }

    /// Digit values encoding the real coordinates `xs` along `dims`.
    ///
    /// Not exact for values that are not representable: the error is
    /// bounded by the smallest digit weight. Coordinates outside `[0, 1)`
    /// saturate or clamp to zero digits. Imaginary-part digits of the listed
    /// dimensions are set to zero.
    ///
    /// # Errors
    /// Returns an error if the lengths differ or a dimension is unknown or
    /// repeated.
    pub fn calculate_ind_values(
        &self,
        xs: &[f64],
        dims: &[usize],
    ) -> Result<HashMap<DynIndex, usize>> {
        self.check_dims(xs.len(), dims)?;
        let mut out = HashMap::new();
        for (&x, &d) in xs.iter().zip(dims) {
            self.decompose(x, &self.dimension_indices_part(d, Part::Real), &mut out);
            for index in self.dimension_indices_part(d, Part::Imaginary) {
                out.insert(index, 0);
            }
        }
        Ok(out)
    }

    /// Digit values encoding complex coordinates `zs` along `dims`.
    pub fn calculate_ind_values_complex(
        &self,
        zs: &[Complex64],
        dims: &[usize],
    ) -> Result<HashMap<DynIndex, usize>> {
        self.check_dims(zs.len(), dims)?;
        let mut out = HashMap::new();
        for (z, &d) in zs.iter().zip(dims) {
            self.decompose(z.re, &self.dimension_indices_part(d, Part::Real), &mut out);
            self.decompose(
                z.im,
                &self.dimension_indices_part(d, Part::Imaginary),
                &mut out,
            );
        }
        Ok(out)
    }

    fn sum_part(
        &self,
        assignment: &HashMap<DynIndex, usize>,
        dimension: usize,
        part: Part,
    ) -> f64 {
        self.dimension_indices_part(dimension, part)
            .iter()
            .filter_map(|i| {
                let v = assignment.get(i)?;
                Some(*v as f64 * self.weight(i)?)
            })
            .sum()
    }

    /// Real coordinates encoded by `assignment` along `dims`.
    ///
    /// Indices missing from the assignment contribute 0.
    pub fn calculate_p(
        &self,
        assignment: &HashMap<DynIndex, usize>,
        dims: &[usize],
    ) -> Result<Vec<f64>> {
        self.check_dims(dims.len(), dims)?;
        Ok(dims
            .iter()
            .map(|&d| self.sum_part(assignment, d, Part::Real))
            .collect())
    }

    /// Complex coordinates encoded by `assignment` along `dims`.
    pub fn calculate_p_complex(
        &self,
        assignment: &HashMap<DynIndex, usize>,
        dims: &[usize],
    ) -> Result<Vec<Complex64>> {
        self.check_dims(dims.len(), dims)?;
        Ok(dims
            .iter()
            .map(|&d| {
                Complex64::new(
                    self.sum_part(assignment, d, Part::Real),
                    self.sum_part(assignment, d, Part::Imaginary),
                )
            })
            .collect())
    }

    /// `count` evenly spaced representable coordinates of `dimension` in `[0, 1)`.
    ///
    /// # Errors
    /// Returns an error if the dimension is unknown, its indices differ in
    /// size, or `count` is 0 or exceeds the number of representable values.
    pub fn grid_points(&self, dimension: usize, count: usize) -> Result<Vec<f64>> {
        let inds = self.dimension_indices_part(dimension, Part::Real);
        let first = inds
            .first()
            .ok_or(FunctionNetworkError::UnknownDimension(dimension))?;
        let b = first.dim();
        if inds.iter().any(|i| i.dim() != b) {
            return Err(FunctionNetworkError::InvalidArgument(format!(
                "indices of dimension {} differ in size",
                dimension
            )));
        }
        let total = (b as f64).powi(inds.len() as i32);
        if count == 0 || count as f64 > total {
            return Err(FunctionNetworkError::InvalidArgument(format!(
                "{} grid points requested, {} representable",
                count, total
            )));
        }
        let step = (total / count as f64).floor();
        Ok((0..count).map(|j| j as f64 * step / total).collect())
    }

    /// Copy of the map holding only `indices`.
    ///
    /// # Errors
    /// Returns an error if an index is unknown or the restricted digits are
    /// no longer contiguous.
    pub fn restrict(&self, indices: &[DynIndex]) -> Result<Self> {
        let mut entries = Vec::with_capacity(indices.len());
        for index in indices {
            let spec = self.info.get(index).ok_or_else(|| {
                FunctionNetworkError::InvalidArgument(format!(
                    "index {:?} is not in the map",
                    index
                ))
            })?;
            entries.push((index.clone(), *spec));
        }
        Self::new(self.base, self.domain, entries)
    }
}
