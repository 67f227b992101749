//! Hierarchical state-path identifiers.
//!
//! A [`Path`] is an ordered sequence of textual segments addressing a node in
//! the component tree or an entry in the [`Store`](https://docs.rs/flowgrid-store).
//! Paths are cheap to clone (segments are reference-counted) and are ordered
//! lexicographically by segment so that a [`Store`](https://docs.rs/flowgrid-store)
//! built on an ordered map can be diffed in a single lock-step pass.
//!
//! [`Id`] is a 32-bit value derived by hashing `(parent_id, label)`, where
//! `label` combines a component's display name with its path segment. The
//! hash is a hand-rolled FNV-1a rather than `std`'s default hasher: the
//! default hasher is randomly seeded per process, but the spec requires that
//! equal label sequences produce equal ids across runs (stable project
//! files, reproducible tests).

use std::fmt;
use std::sync::Arc;

/// A single path segment.
type Segment = Arc<str>;

/// An ordered sequence of textual segments identifying a node in the
/// component tree or an entry in the store.
///
/// `Path` is totally ordered: comparison is lexicographic over segments,
/// which is what lets [`Store`](https://docs.rs/flowgrid-store) keep its
/// backing map in segment order and diff two snapshots in lock-step.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The distinguished root path (no segments).
    pub fn root() -> Self {
        Self { segments: Vec::new() }
    }

    /// True if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn append(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Arc::from(segment.into()));
        Self { segments }
    }

    /// Returns a new path with an integer segment appended (used for
    /// container element paths like `{path}/0`).
    #[must_use]
    pub fn append_index(&self, index: usize) -> Self {
        self.append(index.to_string())
    }

    /// The parent of this path, or `None` if this is the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// The final segment, or `None` for the root path.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(AsRef::as_ref)
    }

    /// True if `self` is `base` or a descendant of `base`.
    pub fn starts_with(&self, base: &Path) -> bool {
        base.segments.len() <= self.segments.len()
            && self.segments[..base.segments.len()] == base.segments[..]
    }

    /// This path expressed relative to `base`. Returns `None` if `self` is
    /// not `base` or a descendant of it.
    #[must_use]
    pub fn relative_to(&self, base: &Path) -> Option<Self> {
        if !self.starts_with(base) {
            return None;
        }
        Some(Self {
            segments: self.segments[base.len()..].to_vec(),
        })
    }

    /// Iterate over this path's segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(AsRef::as_ref)
    }

    /// Returns `self` with `relative`'s segments appended. The inverse of
    /// [`Path::relative_to`]: `base.join(&p.relative_to(&base).unwrap()) == p`.
    #[must_use]
    pub fn join(&self, relative: &Path) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(relative.segments.iter().cloned());
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl From<&str> for Path {
    /// Parses a `/`-joined path string, e.g. `"/audio/graph/0"`.
    fn from(s: &str) -> Self {
        let segments = s
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(Arc::from)
            .collect();
        Self { segments }
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path::from(s.as_str())
    }
}

impl serde::Serialize for Path {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Path::from(s))
    }
}

/// A 32-bit identifier derived by hashing `(parent_id, label)`.
///
/// Two components with the same parent id and the same `(name, path_segment)`
/// pair always produce the same `Id`, across runs and across platforms,
/// because the underlying hash (FNV-1a) has no random seed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Id(pub u32);

impl Id {
    /// The id of the root component: the hash of the empty label with no
    /// parent.
    pub fn root() -> Self {
        Id::compute(Id(0), "", "")
    }

    /// Computes the id for a component given its parent id, display name,
    /// and path segment, per the spec's `label = "{name}##{path_segment}"`
    /// convention.
    #[must_use]
    pub fn compute(parent: Id, name: &str, path_segment: &str) -> Id {
        let label = format!("{name}##{path_segment}");
        Id(fnv1a32_seeded(parent.0, label.as_bytes()))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({self})")
    }
}

/// FNV-1a, seeded with the parent id folded into the basis so that ids form
/// a hash chain down the tree rather than colliding across siblings with
/// identical labels but different ancestry.
fn fnv1a32_seeded(seed: u32, bytes: &[u8]) -> u32 {
    const FNV_PRIME: u32 = 0x0100_0193;
    let mut hash = 0x811c_9dc5_u32 ^ seed;
    for &byte in bytes {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_no_segments() {
        assert!(Path::root().is_root());
        assert_eq!(Path::root().to_string(), "/");
    }

    #[test]
    fn append_and_display() {
        let p = Path::root().append("audio").append("graph").append_index(0);
        assert_eq!(p.to_string(), "/audio/graph/0");
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn parent_and_leaf() {
        let p = Path::from("/a/b/c");
        assert_eq!(p.leaf(), Some("c"));
        assert_eq!(p.parent().unwrap().to_string(), "/a/b");
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn relative_to() {
        let base = Path::from("/a/b");
        let p = Path::from("/a/b/c/0");
        let rel = p.relative_to(&base).unwrap();
        assert_eq!(rel.to_string(), "/c/0");
        assert!(Path::from("/x").relative_to(&base).is_none());
    }

    #[test]
    fn ordering_is_lexicographic_over_segments() {
        let mut paths = vec![Path::from("/b"), Path::from("/a"), Path::from("/a/z"), Path::from("/a/a")];
        paths.sort();
        let rendered: Vec<_> = paths.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["/a", "/a/a", "/a/z", "/b"]);
    }

    #[test]
    fn id_is_deterministic_across_runs() {
        let root = Id::root();
        let a = Id::compute(root, "Gain", "gain");
        let b = Id::compute(root, "Gain", "gain");
        assert_eq!(a, b);
    }

    #[test]
    fn id_distinguishes_parent_chains() {
        let root = Id::root();
        let a = Id::compute(root, "Gain", "gain");
        let other_parent = Id::compute(root, "Other", "other");
        let b = Id::compute(other_parent, "Gain", "gain");
        assert_ne!(a, b);
    }

    #[test]
    fn join_is_inverse_of_relative_to() {
        let base = Path::from("/a/b");
        let p = Path::from("/a/b/c/0");
        let rel = p.relative_to(&base).unwrap();
        assert_eq!(base.join(&rel), p);
        assert_eq!(Path::root().join(&p), p);
    }

    #[test]
    fn path_json_roundtrip() {
        let p = Path::from("/audio/graph/0/gain");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"/audio/graph/0/gain\"");
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z_][a-zA-Z0-9_]{0,7}"
    }

    fn path() -> impl Strategy<Value = Path> {
        proptest::collection::vec(segment(), 0..6).prop_map(|segments| {
            segments.into_iter().fold(Path::root(), |p, s| p.append(s))
        })
    }

    proptest! {
        /// `join` is the two-sided inverse of `relative_to`: joining a base
        /// back onto a descendant's relative remainder recovers the original
        /// path, for any base/descendant pair built by extending the base.
        #[test]
        fn join_undoes_relative_to_for_any_extension(base in path(), extra in proptest::collection::vec(segment(), 0..4)) {
            let full = extra.into_iter().fold(base.clone(), |p, s| p.append(s));
            let rel = full.relative_to(&base).expect("full starts with base by construction");
            prop_assert_eq!(base.join(&rel), full);
        }

        /// Id is a pure function of (parent, name, path_segment): recomputing
        /// with the same inputs always agrees, regardless of what the
        /// strings happen to contain.
        #[test]
        fn id_is_deterministic_over_arbitrary_labels(name in ".*", segment in ".*") {
            let root = Id::root();
            let a = Id::compute(root, &name, &segment);
            let b = Id::compute(root, &name, &segment);
            prop_assert_eq!(a, b);
        }

        /// Sorting a batch of paths agrees with comparing their rendered
        /// `/`-joined strings segment-by-segment — the ordering a Store's
        /// lock-step diff relies on.
        #[test]
        fn ordering_matches_rendered_string_order(mut paths in proptest::collection::vec(path(), 1..8)) {
            let mut by_struct = paths.clone();
            by_struct.sort();
            paths.sort_by_key(|p| p.segments().map(String::from).collect::<Vec<_>>());
            let rendered_struct: Vec<_> = by_struct.iter().map(ToString::to_string).collect();
            let rendered_strings: Vec<_> = paths.iter().map(ToString::to_string).collect();
            prop_assert_eq!(rendered_struct, rendered_strings);
        }
    }
}
