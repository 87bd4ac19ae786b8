//! Index types for tensor network operations.
//!
//! - [`DynId`]: Runtime identity (random 128-bit identifier)
//! - [`TagSet`]: Tag set for metadata (Arc-wrapped for cheap cloning)
//! - [`DynIndex`]: Index with identity, dimension and tags
//!
//! Two indices are equal iff their ids are equal. Dimension and tags are
//! metadata carried along with the identity.

use rand::Rng;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

/// Runtime ID for ITensors-like dynamic identity.
///
/// Uses a 128-bit random value, so collisions are negligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DynId(pub u128);

/// Tag set wrapper using `Arc` for efficient cloning.
///
/// Tags are kept sorted and deduplicated.
///
/// # Example
/// ```
/// use tensor4all_core::index::TagSet;
///
/// let tags = TagSet::from_str("Site,Link");
/// assert!(tags.has_tag("Site"));
/// assert!(tags.has_tag("Link"));
/// assert_eq!(tags.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagSet(Arc<Vec<String>>);

impl TagSet {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tag set from a comma-separated string.
    ///
    /// Whitespace around tags is ignored, empty tags are skipped.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self::from_tags(&s.split(',').collect::<Vec<_>>())
    }

    /// Create a tag set from a slice of tag strings.
    pub fn from_tags(tags: &[&str]) -> Self {
        let mut inner: Vec<String> = tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        inner.sort();
        inner.dedup();
        Self(Arc::new(inner))
    }

    /// Check if a tag is present.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.0.binary_search_by(|t| t.as_str().cmp(tag)).is_ok()
    }

    /// Get the number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the tag set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// Index with a dynamic identity, a dimension and a tag set.
///
/// # Example
/// ```
/// use tensor4all_core::DynIndex;
///
/// let i = DynIndex::new_dyn(2);
/// let j = i.sim();
/// assert_eq!(i.dim(), j.dim());
/// assert_ne!(i, j);
/// ```
#[derive(Clone)]
pub struct DynIndex {
    id: DynId,
    dim: usize,
    tags: TagSet,
}

impl DynIndex {
    /// Create a new index with a fresh id.
    pub fn new_dyn(dim: usize) -> Self {
        Self {
            id: DynId(generate_id()),
            dim,
            tags: TagSet::new(),
        }
    }

    /// Create a new index with a fresh id and comma-separated tags.
    pub fn new_dyn_with_tag(dim: usize, tags: &str) -> Self {
        Self {
            id: DynId(generate_id()),
            dim,
            tags: TagSet::from_str(tags),
        }
    }

    /// Create a new link (bond) index, tagged `"Link"`.
    pub fn new_link(dim: usize) -> Self {
        Self::new_dyn_with_tag(dim, "Link")
    }

    /// Create an index with an explicit id. Mostly useful in tests.
    pub fn new_with_id(id: DynId, dim: usize, tags: TagSet) -> Self {
        Self { id, dim, tags }
    }

    /// Identity of the index.
    pub fn id(&self) -> DynId {
        self.id
    }

    /// Dimension (number of values) of the index.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Tags attached to the index.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Check whether the index carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.has_tag(tag)
    }

    /// Create a similar index: same dimension and tags, fresh id.
    #[must_use]
    pub fn sim(&self) -> Self {
        Self {
            id: DynId(generate_id()),
            dim: self.dim,
            tags: self.tags.clone(),
        }
    }
}

// Equality and Hash implementations: only compare by `id`
impl PartialEq for DynIndex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DynIndex {}

impl std::hash::Hash for DynIndex {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for DynIndex {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DynIndex {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for DynIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(dim={}|id={:x}|\"{}\")",
            self.dim,
            self.id.0 % 1_000_000,
            self.tags
        )
    }
}

thread_local! {
    /// Thread-local random number generator for ID generation.
    static ID_RNG: RefCell<rand::rngs::ThreadRng> = RefCell::new(rand::thread_rng());
}

/// Generate a unique random ID for dynamic indices (thread-safe).
pub(crate) fn generate_id() -> u128 {
    ID_RNG.with(|rng| rng.borrow_mut().gen())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_by_id_only() {
        let i = DynIndex::new_dyn(2);
        let same = DynIndex::new_with_id(i.id(), 5, TagSet::from_str("Other"));
        assert_eq!(i, same);
        assert_ne!(i, DynIndex::new_dyn(2));
    }

    #[test]
    fn test_sim_keeps_dim_and_tags() {
        let i = DynIndex::new_dyn_with_tag(3, "Site,x");
        let j = i.sim();
        assert_ne!(i, j);
        assert_eq!(j.dim(), 3);
        assert!(j.has_tag("Site"));
        assert!(j.has_tag("x"));
    }

    #[test]
    fn test_hash_set_membership() {
        let i = DynIndex::new_dyn(2);
        let j = DynIndex::new_dyn(2);
        let set: HashSet<_> = [i.clone(), j.clone(), i.clone()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_tagset_sorted_dedup() {
        let tags = TagSet::from_str(" b,a , b,");
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(tags.to_string(), "a,b");
        assert!(TagSet::new().is_empty());
    }
}
