//! # ydoc - comment-aware yaml document rewriting
//!
//! ## Introduction for developers
//!
//! Read this to understand how `ydoc` works internally.
//!
//! ### Yaml terms
//!
//! - a file is a `stream` of `documents` separated by `---`
//! - each document has one root node, which is either
//!   - a `scalar` (`value`, `"quoted"`, `|` block text...)
//!   - a `mapping`: a list of `key: value` entries
//!   - or a `sequence`: a list of `- item` entries
//!
//! ```yaml
//! # a comment above `kind`
//! kind: Example # a comment on the same line as `kind`
//! spec:
//!   items:
//!   - first
//!   - name: second
//! ---
//! kind: AnotherDocument
//! ```
//!
//! ### Parsing
//!
//! see [parser::parse]
//!
//! Text is parsed into a lossless tree ([tree::Documents]). Nothing is normalized: whitespace and
//! comments are stored as the `prefix` of the node that follows them, so that printing a tree
//! ([print]) gives back the original text.
//!
//! Trees are immutable. Nodes are shared through [std::sync::Arc] and every change creates new
//! nodes only along the path from the document root to the changed node.
//!
//! ### Reading comments
//!
//! see [comments]
//!
//! Mapping entries and sequence entries are the annotatable nodes ([tree::Entry]). For each of them
//! we want to know the comment above it and the comment behind it on the same line.
//!
//! 1. list all entries of a document in source order ([visit::flatten])
//! 2. split the prefix of each entry at the first line break ([comments::split]). The first part
//!    trails the previous entry, the second part sits above the current entry.
//! 3. attach the result as a [markers::Comment] marker in one rebuild of the document
//!    ([visit::RewriteEntries])
//!
//! Markers are invisible to printing and to equality: an annotated document prints the same and
//! compares equal to the document it was built from.
//!
//! ### Composing streams
//!
//! see [compose]
//!
//! - [compose::append] adds a new document (always starting with `---`) to a stream
//! - [compose::partition] moves documents of certain kinds ([config::PartitionConfig]) into a
//!   separate stream, keeping the order of both groups
//!
pub mod comments;
pub mod compose;
pub mod config;
pub mod markers;
pub mod parser;
pub mod print;
pub mod tree;
pub mod visit;
