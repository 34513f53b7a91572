//! yaml tree model
//!
//! The tree is lossless: every node stores the raw text preceding it (its `prefix`, whitespace and
//! comments) so that printing a parsed tree reproduces the source byte for byte (see [crate::print]).
//!
//! Nodes are immutable values shared through [Arc]. A change to a node is expressed by building a
//! new node with one of the `with_*` operations. Fields that are not replaced keep pointing at the
//! same allocation, so rebuilding a node high up in the tree is cheap and untouched subtrees stay
//! identical by reference.
//!
//! Derived [PartialEq] is content equality: [Markers] always compare equal, so two nodes that only
//! differ in their markers are equal. Use [Node::is_scope] / [Entry::is_scope] to ask whether two
//! values are the *same* node.
use crate::markers::Markers;
use std::sync::Arc;

/// How a scalar was written in the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// `|` block scalar, value includes the header line
    Literal,
    /// `>` block scalar, value includes the header line
    Folded,
}

/// Leaf value
///
/// `value` is the raw source text without surrounding quotes. Escape sequences are not resolved.
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    prefix: String,
    style: ScalarStyle,
    value: String,
    #[new(default)]
    markers: Markers,
}

impl Scalar {
    /// Scalar without any text, used for missing values (`key:`) and empty documents
    pub fn empty() -> Self {
        Self::new(String::new(), ScalarStyle::Plain, String::new())
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn style(&self) -> ScalarStyle {
        self.style
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }
}

#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    prefix: String,
    entries: Vec<Arc<MappingEntry>>,
    #[new(default)]
    markers: Markers,
}

impl Mapping {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn entries(&self) -> &[Arc<MappingEntry>] {
        &self.entries
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Entry with the given (unquoted) key
    pub fn get(&self, key: &str) -> Option<&Arc<MappingEntry>> {
        self.entries.iter().find(|entry| entry.key().value() == key)
    }

    pub fn with_entries(&self, entries: Vec<Arc<MappingEntry>>) -> Self {
        Self {
            prefix: self.prefix.clone(),
            entries,
            markers: self.markers.clone(),
        }
    }
}

/// `key: value` pair, annotatable
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    prefix: String,
    key: Arc<Scalar>,
    /// whitespace between key and `:`
    before_colon: String,
    value: Node,
    #[new(default)]
    markers: Markers,
}

impl MappingEntry {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn key(&self) -> &Arc<Scalar> {
        &self.key
    }

    pub fn before_colon(&self) -> &str {
        &self.before_colon
    }

    pub fn value(&self) -> &Node {
        &self.value
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn with_value(&self, value: Node) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    pub fn with_markers(&self, markers: Markers) -> Self {
        Self {
            markers,
            ..self.clone()
        }
    }
}

#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    prefix: String,
    entries: Vec<Arc<SequenceEntry>>,
    #[new(default)]
    markers: Markers,
}

impl Sequence {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn entries(&self) -> &[Arc<SequenceEntry>] {
        &self.entries
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn with_entries(&self, entries: Vec<Arc<SequenceEntry>>) -> Self {
        Self {
            prefix: self.prefix.clone(),
            entries,
            markers: self.markers.clone(),
        }
    }
}

/// `- block` item, annotatable
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct SequenceEntry {
    prefix: String,
    block: Node,
    #[new(default)]
    markers: Markers,
}

impl SequenceEntry {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn block(&self) -> &Node {
        &self.block
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    pub fn with_block(&self, block: Node) -> Self {
        Self {
            block,
            ..self.clone()
        }
    }

    pub fn with_markers(&self, markers: Markers) -> Self {
        Self {
            markers,
            ..self.clone()
        }
    }
}

/// Any block node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(Arc<Scalar>),
    Mapping(Arc<Mapping>),
    Sequence(Arc<Sequence>),
}

impl Node {
    pub fn prefix(&self) -> &str {
        match self {
            Node::Scalar(scalar) => scalar.prefix(),
            Node::Mapping(mapping) => mapping.prefix(),
            Node::Sequence(sequence) => sequence.prefix(),
        }
    }

    pub fn markers(&self) -> &Markers {
        match self {
            Node::Scalar(scalar) => scalar.markers(),
            Node::Mapping(mapping) => mapping.markers(),
            Node::Sequence(sequence) => sequence.markers(),
        }
    }

    /// Is `other` the very same node (not just an equal one)?
    pub fn is_scope(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Scalar(a), Node::Scalar(b)) => Arc::ptr_eq(a, b),
            (Node::Mapping(a), Node::Mapping(b)) => Arc::ptr_eq(a, b),
            (Node::Sequence(a), Node::Sequence(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn as_mapping(&self) -> Option<&Arc<Mapping>> {
        match self {
            Node::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Arc<Scalar>> {
        match self {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }
}

impl From<Scalar> for Node {
    fn from(value: Scalar) -> Self {
        Node::Scalar(Arc::new(value))
    }
}

impl From<Mapping> for Node {
    fn from(value: Mapping) -> Self {
        Node::Mapping(Arc::new(value))
    }
}

impl From<Sequence> for Node {
    fn from(value: Sequence) -> Self {
        Node::Sequence(Arc::new(value))
    }
}

/// The annotatable nodes: mapping entries and sequence entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Mapping(Arc<MappingEntry>),
    Sequence(Arc<SequenceEntry>),
}

impl Entry {
    pub fn prefix(&self) -> &str {
        match self {
            Entry::Mapping(entry) => entry.prefix(),
            Entry::Sequence(entry) => entry.prefix(),
        }
    }

    pub fn markers(&self) -> &Markers {
        match self {
            Entry::Mapping(entry) => entry.markers(),
            Entry::Sequence(entry) => entry.markers(),
        }
    }

    /// Same entry with `markers` replacing its current markers
    pub fn with_markers(&self, markers: Markers) -> Self {
        match self {
            Entry::Mapping(entry) => Entry::Mapping(Arc::new(entry.with_markers(markers))),
            Entry::Sequence(entry) => Entry::Sequence(Arc::new(entry.with_markers(markers))),
        }
    }

    /// Is `other` the very same entry (not just an equal one)?
    pub fn is_scope(&self, other: &Entry) -> bool {
        self.id() == other.id()
    }

    /// Identity of this entry
    ///
    /// Only meaningful while the entry is alive, two entries that exist at the same time never
    /// share an id.
    pub fn id(&self) -> EntryId {
        match self {
            Entry::Mapping(entry) => EntryId(Arc::as_ptr(entry) as *const () as usize),
            Entry::Sequence(entry) => EntryId(Arc::as_ptr(entry) as *const () as usize),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

/// Trailing part of a document
#[derive(derive_new::new, Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentEnd {
    /// text after the last node of the document
    prefix: String,
    /// document is closed with `...`
    explicit: bool,
}

impl DocumentEnd {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn explicit(&self) -> bool {
        self.explicit
    }
}

#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// text before the `---` marker
    prefix: String,
    /// document starts with `---`
    explicit: bool,
    block: Node,
    end: DocumentEnd,
    #[new(default)]
    markers: Markers,
}

impl Document {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn explicit(&self) -> bool {
        self.explicit
    }

    pub fn block(&self) -> &Node {
        &self.block
    }

    pub fn end(&self) -> &DocumentEnd {
        &self.end
    }

    pub fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Does the printed document end with a line break?
    pub fn ends_line(&self) -> bool {
        !self.end.explicit && self.end.prefix.ends_with('\n')
    }

    pub fn with_block(&self, block: Node) -> Self {
        Self {
            block,
            ..self.clone()
        }
    }

    pub fn with_explicit(&self, explicit: bool) -> Self {
        Self {
            explicit,
            ..self.clone()
        }
    }

    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..self.clone()
        }
    }
}

/// A stream of documents, i.e. one yaml file
#[derive(derive_new::new, Debug, Clone, Default, PartialEq, Eq)]
pub struct Documents {
    documents: Vec<Arc<Document>>,
    /// text after a final `...` that is not followed by another document
    #[new(default)]
    suffix: String,
}

impl Documents {
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn with_documents(&self, documents: Vec<Arc<Document>>) -> Self {
        Self {
            documents,
            suffix: self.suffix.clone(),
        }
    }

    pub fn with_suffix(&self, suffix: impl Into<String>) -> Self {
        Self {
            documents: self.documents.clone(),
            suffix: suffix.into(),
        }
    }
}
