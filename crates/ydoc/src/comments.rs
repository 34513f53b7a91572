//! attaching comments to the entries they belong to
//!
//! Comments are part of the `prefix` of the node that follows them. The text between two entries
//! looks like this:
//!
//! ```yaml
//! first: 1 # trails first
//! # above second
//! second: 2
//! ```
//!
//! The prefix of `second` is `" # trails first\n# above second\n"`. Everything up to the first line
//! break belongs to the *previous* entry (same line comment), the rest belongs to `second` (above
//! line comment). See [split].
//!
//! [annotate_document] computes a [Comment] for every entry of a document and attaches it as a
//! marker. The last entry takes its same line comment from the document end.
use crate::markers::{Comment, MarkerKind};
use crate::tree::{Document, Documents, Entry, EntryId, MappingEntry, SequenceEntry};
use crate::visit::{flatten, RewriteEntries, RewriteEntry, VisitEntries};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// Entries passed to [apply_comments] that are not part of the document
    #[error("{missing} annotation target(s) not found in document")]
    TargetNotFound { missing: usize },
}

/// Splits a prefix into `(same_line, above_line)`
///
/// - `same_line`: text before the first line break, trimmed
/// - `above_line`: text after the first line break, trimmed
///
/// Both are empty if there is no line break, even when the prefix holds a comment. Such a prefix
/// is never split into a trailing and an above part.
///
/// ```
/// # use ydoc::comments::split;
/// assert_eq!(split(" # trailing\n# above\n  "), ("# trailing", "# above"));
/// assert_eq!(split(" "), ("", ""));
/// assert_eq!(split(" # no line break"), ("", ""));
/// ```
pub fn split(prefix: &str) -> (&str, &str) {
    match prefix.split_once('\n') {
        Some((same_line, above_line)) => (same_line.trim(), above_line.trim()),
        None => ("", ""),
    }
}

/// One [Comment] per entry of the document, in source order
pub fn read_comments(document: &Document) -> Vec<(Entry, Comment)> {
    let entries = flatten(document);

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let next_prefix = entries
                .get(index + 1)
                .map_or(document.end().prefix(), Entry::prefix);

            let (same_line, _) = split(next_prefix);
            let (_, above_line) = split(entry.prefix());

            (
                entry.clone(),
                Comment::new(same_line.to_string(), above_line.to_string()),
            )
        })
        .collect()
}

/// Attach comments to their entries in a single rebuild
///
/// Entries are matched by identity. Fails without returning a partial result when an entry is
/// not part of `document`.
pub fn apply_comments(
    document: &Arc<Document>,
    comments: Vec<(Entry, Comment)>,
) -> Result<Arc<Document>, AnnotationError> {
    if comments.is_empty() {
        return Ok(document.clone());
    }

    let mut add_comments = AddComments {
        targets: comments
            .into_iter()
            .map(|(entry, comment)| (entry.id(), (entry, comment)))
            .collect(),
    };

    let annotated = document.rewrite_entries(&mut add_comments);

    if !add_comments.targets.is_empty() {
        return Err(AnnotationError::TargetNotFound {
            missing: add_comments.targets.len(),
        });
    }

    Ok(annotated)
}

/// Attach a [Comment] marker to every entry of `document`
#[tracing::instrument(level = "debug", skip_all)]
pub fn annotate_document(document: &Arc<Document>) -> Result<Arc<Document>, AnnotationError> {
    let comments = read_comments(document);
    tracing::debug!(entries = comments.len(), "comments read");

    apply_comments(document, comments)
}

/// [annotate_document] for every document in the stream
pub fn annotate(documents: &Documents) -> Result<Documents, AnnotationError> {
    let annotated = documents
        .documents()
        .iter()
        .map(annotate_document)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(documents.with_documents(annotated))
}

/// Remove all [Comment] markers
pub fn strip_comments(document: &Arc<Document>) -> Arc<Document> {
    document.rewrite_entries(&mut StripComments)
}

struct AddComments {
    /// entries are kept alive so their ids stay unique during the rebuild
    targets: HashMap<EntryId, (Entry, Comment)>,
}

impl AddComments {
    fn take(&mut self, entry: Entry) -> Option<Comment> {
        let (_, comment) = self.targets.remove(&entry.id())?;
        tracing::trace!(?comment, "adding comment");
        Some(comment)
    }
}

impl RewriteEntry for AddComments {
    fn mapping_entry(&mut self, entry: &Arc<MappingEntry>) -> Option<MappingEntry> {
        let comment = self.take(Entry::Mapping(entry.clone()))?;
        Some(entry.with_markers(entry.markers().with(comment)))
    }

    fn sequence_entry(&mut self, entry: &Arc<SequenceEntry>) -> Option<SequenceEntry> {
        let comment = self.take(Entry::Sequence(entry.clone()))?;
        Some(entry.with_markers(entry.markers().with(comment)))
    }
}

struct StripComments;

impl RewriteEntry for StripComments {
    fn mapping_entry(&mut self, entry: &Arc<MappingEntry>) -> Option<MappingEntry> {
        entry
            .markers()
            .contains(MarkerKind::Comment)
            .then(|| entry.with_markers(entry.markers().without(MarkerKind::Comment)))
    }

    fn sequence_entry(&mut self, entry: &Arc<SequenceEntry>) -> Option<SequenceEntry> {
        entry
            .markers()
            .contains(MarkerKind::Comment)
            .then(|| entry.with_markers(entry.markers().without(MarkerKind::Comment)))
    }
}

/// Comments of one entry, located by its path
///
/// The path consists of the keys of all mapping entries from the root down to the entry (`/a/b`).
/// Sequence entries do not add a segment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CommentRecord {
    pub path: String,
    pub same_line: String,
    pub above_line: String,
}

impl std::fmt::Display for CommentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.path)?;
        writeln!(f, "above line: {}", self.above_line)?;
        writeln!(f, "same line: {}", self.same_line)?;
        writeln!(f, "------")
    }
}

/// Lists the comment markers of an annotated document
pub fn report(document: &Document) -> Vec<CommentRecord> {
    let mut records = vec![];

    document.visit_entries(&mut |entry: &Entry, ancestors: &[Entry]| {
        let Some(comment) = entry.markers().comment() else {
            return;
        };

        let path: String = ancestors
            .iter()
            .chain(std::iter::once(entry))
            .filter_map(|entry| match entry {
                Entry::Mapping(entry) => Some(format!("/{}", entry.key().value())),
                Entry::Sequence(_) => None,
            })
            .collect();

        records.push(CommentRecord {
            path: if path.is_empty() { "/".to_string() } else { path },
            same_line: comment.same_line().to_string(),
            above_line: comment.above_line().to_string(),
        });
    });

    records
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn document(text: &str) -> Arc<Document> {
        parse(text).expect("must parse").documents()[0].clone()
    }

    fn comments_of(document: &Document) -> Vec<(String, String)> {
        flatten(document)
            .iter()
            .map(|entry| {
                let comment = entry.markers().comment().expect("entry is annotated");
                (
                    comment.same_line().to_string(),
                    comment.above_line().to_string(),
                )
            })
            .collect()
    }

    fn pair(same_line: &str, above_line: &str) -> (String, String) {
        (same_line.to_string(), above_line.to_string())
    }

    #[test]
    fn split_prefix() {
        assert_eq!(split(""), ("", ""));
        assert_eq!(split("  # no line break"), ("", ""));
        assert_eq!(split("\n"), ("", ""));
        assert_eq!(split(" # same\n"), ("# same", ""));
        assert_eq!(split("\n  # one\n  # two\n  "), ("", "# one\n  # two"));
        assert_eq!(split(" # same\r\n# above\r\n"), ("# same", "# above"));
    }

    #[test]
    fn split_rejoins_to_prefix() {
        let prefix = "# same\n# above";
        let (same_line, above_line) = split(prefix);
        assert_eq!(format!("{same_line}\n{above_line}"), prefix);
    }

    #[test]
    fn same_line_goes_to_previous_entry() {
        let original = document("a: 1 # same-line for a\n# above b\nb: 2\n");
        let annotated = annotate_document(&original).expect("annotates");

        assert_eq!(
            comments_of(&annotated),
            [pair("# same-line for a", ""), pair("", "# above b")]
        );
    }

    #[test]
    fn last_entry_reads_document_end() {
        let annotated =
            annotate_document(&document("a: 1\nb: 2 # trailing\n# after\n")).expect("annotates");
        assert_eq!(
            comments_of(&annotated),
            [pair("", ""), pair("# trailing", "")]
        );

        // no line break after the comment: nothing to split
        let annotated =
            annotate_document(&document("a: 1\nb: 2 # trailing")).expect("annotates");
        assert_eq!(comments_of(&annotated)[1], pair("", ""));
    }

    #[test]
    fn nested_entries() {
        let annotated = annotate_document(&document(
            "items: # list\n  # first\n  - one # about one\n  - name: two\n    # above value\n    value: 2\n",
        ))
        .expect("annotates");

        assert_eq!(
            comments_of(&annotated),
            [
                pair("# list", ""),
                pair("# about one", "# first"),
                pair("", ""),
                pair("", ""),
                pair("", "# above value"),
            ]
        );
    }

    #[test]
    fn every_entry_gets_exactly_one_comment() {
        let original = document("a:\n  - b: 1\n    c: [x]\n  - d\ne: f\n");
        let annotated = annotate_document(&original).expect("annotates");

        let entries = flatten(&annotated);
        assert_eq!(entries.len(), 6);
        assert!(entries.iter().all(|entry| entry.markers().len() == 1));

        let root = annotated.block().as_mapping().expect("mapping");
        assert!(root.markers().is_empty());
        assert!(root.entries()[1].value().markers().is_empty());
    }

    #[test]
    fn content_is_preserved() {
        let text = "# head\nkind: Test # k\nspec:\n  # about items\n  items:\n  - a\n  - b: 1\n";
        let original = document(text);
        let annotated = annotate_document(&original).expect("annotates");

        assert_eq!(original, annotated);
        assert_eq!(annotated.to_string(), text);
        assert_eq!(strip_comments(&annotated), strip_comments(&original));
        assert!(flatten(&strip_comments(&annotated))
            .iter()
            .all(|entry| entry.markers().is_empty()));
    }

    #[test]
    fn reannotating_replaces_comments() {
        let annotated = annotate_document(&document("a: 1 # x\nb: 2\n")).expect("annotates");
        let twice = annotate_document(&annotated).expect("annotates");

        assert_eq!(comments_of(&twice), comments_of(&annotated));
        assert!(flatten(&twice).iter().all(|entry| entry.markers().len() == 1));
    }

    #[test]
    fn no_entries_is_a_no_op() {
        let original = document("# just a comment\nscalar\n");
        let annotated = annotate_document(&original).expect("annotates");
        assert!(Arc::ptr_eq(&original, &annotated));
    }

    #[test]
    fn foreign_targets_are_reported() {
        let original = document("a: 1\n");
        let other = document("a: 1\n");

        let err = apply_comments(&original, read_comments(&other)).expect_err("must fail");
        assert_eq!(err, AnnotationError::TargetNotFound { missing: 1 });
    }

    #[test]
    fn annotate_stream() {
        let documents = parse("a: 1 # one\n---\n# two\nb: 2\n").expect("must parse");
        let annotated = annotate(&documents).expect("annotates");

        assert_eq!(annotated, documents);
        assert_eq!(
            comments_of(&annotated.documents()[0]),
            [pair("# one", "")]
        );
        assert_eq!(
            comments_of(&annotated.documents()[1]),
            [pair("", "# two")]
        );
    }

    #[test]
    fn report_paths() {
        let annotated = annotate_document(&document(
            "metadata:\n  # the name\n  name: test\nlist:\n- item # one\n",
        ))
        .expect("annotates");

        let records = report(&annotated);
        let paths: Vec<_> = records.iter().map(|record| record.path.as_str()).collect();
        assert_eq!(paths, ["/metadata", "/metadata/name", "/list", "/list"]);

        assert_eq!(
            records[1].to_string(),
            "/metadata/name\nabove line: # the name\nsame line: \n------\n"
        );
        assert_eq!(records[3].same_line, "# one");
    }
}
