//! out-of-band annotations attached to tree nodes
//!
//! [Markers] hold information derived from a tree without being part of its content. They survive
//! rebuilds of a node (the `with_*` operations copy them along) but never take part in printing or
//! content equality.
//!
//! At most one marker per [MarkerKind] is stored. Adding a marker of a kind that is already present
//! replaces the existing one.
use indexmap::IndexMap;

/// Comments found around an annotatable entry
///
/// - `same_line`: the comment trailing the entry on its last line (`key: value # here`)
/// - `above_line`: the comment lines directly above the entry
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Comment {
    same_line: String,
    above_line: String,
}

impl Comment {
    pub fn same_line(&self) -> &str {
        &self.same_line
    }

    pub fn above_line(&self) -> &str {
        &self.above_line
    }
}

/// All marker types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    Comment(Comment),
}

impl Marker {
    pub fn kind(&self) -> MarkerKind {
        match self {
            Marker::Comment(_) => MarkerKind::Comment,
        }
    }
}

impl From<Comment> for Marker {
    fn from(value: Comment) -> Self {
        Marker::Comment(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Comment,
}

/// Ordered set of [Marker]s, keyed by [MarkerKind]
#[derive(Debug, Clone, Default)]
pub struct Markers {
    markers: IndexMap<MarkerKind, Marker>,
}

impl Markers {
    /// Returns a copy with `marker` added, replacing a marker of the same kind in place
    pub fn with(&self, marker: impl Into<Marker>) -> Self {
        let marker = marker.into();
        let mut markers = self.markers.clone();
        markers.insert(marker.kind(), marker);
        Self { markers }
    }

    /// Returns a copy without a marker of the given kind
    pub fn without(&self, kind: MarkerKind) -> Self {
        let mut markers = self.markers.clone();
        markers.shift_remove(&kind);
        Self { markers }
    }

    pub fn get(&self, kind: MarkerKind) -> Option<&Marker> {
        self.markers.get(&kind)
    }

    pub fn comment(&self) -> Option<&Comment> {
        match self.get(MarkerKind::Comment)? {
            Marker::Comment(comment) => Some(comment),
        }
    }

    pub fn contains(&self, kind: MarkerKind) -> bool {
        self.markers.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

// Markers are not content: any two marker sets compare equal so that derived `PartialEq` on tree
// nodes means content equality.
impl PartialEq for Markers {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Markers {}
