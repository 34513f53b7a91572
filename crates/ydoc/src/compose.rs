//! stream level operations
//!
//! - [append]: add a document to the end of a stream
//! - [partition]: split a stream into two groups by the kind of each document
use crate::parser::{parse, ParseError};
use crate::tree::{Document, Documents, Node, ScalarStyle};
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum CompositionError {
    #[error("Unable to parse document")]
    ParseFailed(#[from] ParseError),
    #[error("Expected exactly one document, found {0}")]
    DocumentCount(usize),
}

/// Appends the single document in `text` to `documents`
///
/// The new document always starts with `---`, even when `documents` is empty. Existing documents
/// are kept as they are (same allocations).
pub fn append(documents: &Documents, text: &str) -> Result<Documents, CompositionError> {
    let parsed = parse(text)?;
    let [document] = parsed.documents() else {
        return Err(CompositionError::DocumentCount(parsed.len()));
    };

    // text that trailed the old stream stays in front of the new document
    let prefix = format!("{}{}", documents.suffix(), document.prefix());
    let document = Arc::new(document.with_explicit(true).with_prefix(prefix));

    let mut all = documents.documents().to_vec();
    all.push(document);

    tracing::debug!(documents = all.len(), "document appended");
    Ok(Documents::new(all).with_suffix(parsed.suffix()))
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KindError {
    #[error("Document root is not a mapping")]
    NotAMapping,
    #[error("Document has no kind")]
    MissingKind,
    #[error("Document kind is not a scalar")]
    NotAScalar,
}

/// Determines the kind of a document
pub trait Classify {
    fn kind_of(&self, document: &Document) -> Result<String, KindError>;
}

// blanket impl for Fn
impl<F> Classify for F
where
    F: Fn(&Document) -> Result<String, KindError>,
{
    fn kind_of(&self, document: &Document) -> Result<String, KindError> {
        self(document)
    }
}

/// Reads the `kind` key of the root mapping, as in kubernetes resources
#[derive(Debug, Default, Clone, Copy)]
pub struct ResourceKind;

impl Classify for ResourceKind {
    fn kind_of(&self, document: &Document) -> Result<String, KindError> {
        let Node::Mapping(root) = document.block() else {
            return Err(KindError::NotAMapping);
        };

        let entry = root.get("kind").ok_or(KindError::MissingKind)?;
        let scalar = entry.value().as_scalar().ok_or(KindError::NotAScalar)?;

        match scalar.style() {
            _ if scalar.value().is_empty() => Err(KindError::MissingKind),
            ScalarStyle::Plain | ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted => {
                Ok(scalar.value().to_string())
            }
            ScalarStyle::Literal | ScalarStyle::Folded => Err(KindError::NotAScalar),
        }
    }
}

/// Result of [partition]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// documents whose kind did not match, keeps the stream suffix
    pub primary: Documents,
    /// documents whose kind matched
    pub secondary: Documents,
}

/// Moves every document whose kind `matches` into [Partition::secondary]
///
/// Both groups keep the relative order of the input. Documents that cannot be classified stay in
/// [Partition::primary]. Each group prints as a stream of exactly its documents: a document that
/// would run into the one in front of it gets a `---` start marker.
pub fn partition(
    documents: &Documents,
    classifier: &dyn Classify,
    matches: impl Fn(&str) -> bool,
) -> Partition {
    let mut primary = vec![];
    let mut secondary = vec![];

    for (index, document) in documents.documents().iter().enumerate() {
        let matched = match classifier.kind_of(document) {
            Ok(kind) => {
                let matched = matches(&kind);
                tracing::debug!(index, kind = kind.as_str(), matched, "document classified");
                matched
            }
            Err(error) => {
                tracing::debug!(index, %error, "unable to classify document");
                false
            }
        };

        if matched {
            secondary.push(document.clone());
        } else {
            primary.push(document.clone());
        }
    }

    Partition {
        primary: documents.with_documents(separated(primary)),
        secondary: Documents::new(separated(secondary)),
    }
}

/// Makes every document start with `---` unless the document in front of it ends with `...`
///
/// Documents that followed a `...` in the input may have no start marker. Next to a new neighbour
/// they would merge into one document when printed.
fn separated(documents: Vec<Arc<Document>>) -> Vec<Arc<Document>> {
    let mut result: Vec<Arc<Document>> = Vec::with_capacity(documents.len());
    for document in documents {
        let needs_marker = !document.explicit()
            && result
                .last()
                .is_some_and(|previous| !previous.end().explicit());

        if needs_marker {
            result.push(Arc::new(document.with_explicit(true)));
        } else {
            result.push(document);
        }
    }
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const STREAM: &str = "kind: A\nname: one\n---\nkind: B\nname: two\n---\n- not a resource\n---\nkind: \"A\"\nname: three\n";

    fn names(documents: &Documents) -> Vec<String> {
        documents
            .documents()
            .iter()
            .map(|document| {
                document
                    .block()
                    .as_mapping()
                    .and_then(|root| root.get("name"))
                    .and_then(|entry| entry.value().as_scalar())
                    .map_or("-".to_string(), |scalar| scalar.value().to_string())
            })
            .collect()
    }

    #[test]
    fn append_keeps_existing_documents() {
        let documents = parse("a: 1\n---\nb: 2\n").expect("must parse");
        let appended = append(&documents, "c: 3\n").expect("appends");

        assert_eq!(appended.len(), 3);
        for (before, after) in documents.documents().iter().zip(appended.documents()) {
            assert!(Arc::ptr_eq(before, after));
        }
        assert!(appended.documents()[2].explicit());
        assert_eq!(appended.to_string(), "a: 1\n---\nb: 2\n---\nc: 3\n");
    }

    #[test]
    fn append_after_unterminated_line() {
        let documents = parse("a: 1").expect("must parse");
        let appended = append(&documents, "b: 2").expect("appends");

        assert_eq!(appended.to_string(), "a: 1\n---\nb: 2");
        let reparsed = parse(&appended.to_string()).expect("reparses");
        assert_eq!(reparsed.len(), 2);
    }

    #[test]
    fn append_keeps_explicit_marker_and_suffix() {
        let documents = parse("a: 1\n...\n").expect("must parse");
        let appended = append(&documents, "# new\n---\nb: 2\n").expect("appends");

        assert_eq!(appended.to_string(), "a: 1\n...\n# new\n---\nb: 2\n");
    }

    #[test]
    fn append_to_empty_stream_is_explicit() {
        let appended = append(&Documents::default(), "a: 1\n").expect("appends");

        assert_eq!(appended.len(), 1);
        assert!(appended.documents()[0].explicit());
        assert_eq!(appended.to_string(), "---\na: 1\n");
    }

    #[test]
    fn append_requires_exactly_one_document() {
        let documents = parse("a: 1\n").expect("must parse");

        let err = append(&documents, "").expect_err("no document");
        assert!(matches!(err, CompositionError::DocumentCount(0)));

        let err = append(&documents, "b: 1\n---\nc: 2\n").expect_err("two documents");
        assert!(matches!(err, CompositionError::DocumentCount(2)));

        let err = append(&documents, "b: \"open\n").expect_err("invalid");
        assert!(matches!(err, CompositionError::ParseFailed(_)));
    }

    #[test]
    fn resource_kind() {
        let documents = parse(STREAM).expect("must parse");
        let kinds: Vec<_> = documents
            .documents()
            .iter()
            .map(|document| ResourceKind.kind_of(document))
            .collect();

        assert_eq!(
            kinds,
            [
                Ok("A".to_string()),
                Ok("B".to_string()),
                Err(KindError::NotAMapping),
                Ok("A".to_string()),
            ]
        );

        let documents = parse("name: x\n---\nkind:\n---\nkind:\n  nested: 1\n").expect("must parse");
        let kinds: Vec<_> = documents
            .documents()
            .iter()
            .map(|document| ResourceKind.kind_of(document))
            .collect();
        assert_eq!(
            kinds,
            [
                Err(KindError::MissingKind),
                Err(KindError::MissingKind),
                Err(KindError::NotAScalar),
            ]
        );
    }

    #[test]
    fn partition_keeps_order() {
        let documents = parse(STREAM).expect("must parse");
        let partition = partition(&documents, &ResourceKind, |kind| kind == "A");

        assert_eq!(names(&partition.primary), ["two", "-"]);
        assert_eq!(names(&partition.secondary), ["one", "three"]);
        assert_eq!(
            partition.primary.len() + partition.secondary.len(),
            documents.len()
        );
    }

    #[test]
    fn unclassified_documents_stay_primary() {
        let documents = parse(STREAM).expect("must parse");
        let failing = |_: &Document| -> Result<String, KindError> { Err(KindError::MissingKind) };
        let partition = partition(&documents, &failing, |_| true);

        assert_eq!(partition.primary, documents);
        assert!(partition.secondary.is_empty());
    }

    #[test]
    fn partition_separates_documents_after_end_marker() {
        let documents = parse("a: 1\n---\nkind: X\n...\nb: 2\n").expect("must parse");
        let partition = partition(&documents, &ResourceKind, |kind| kind == "X");

        assert_eq!(partition.primary.to_string(), "a: 1\n---\nb: 2\n");
        assert_eq!(partition.secondary.to_string(), "---\nkind: X\n...");
        assert!(Arc::ptr_eq(
            &partition.primary.documents()[0],
            &documents.documents()[0]
        ));
    }

    #[test]
    fn partition_separates_matched_documents() {
        let documents = parse("kind: A\n---\nkind: B\n...\nkind: A\n").expect("must parse");
        let partition = partition(&documents, &ResourceKind, |kind| kind == "A");

        assert_eq!(partition.secondary.to_string(), "kind: A\n---\nkind: A\n");
        assert_eq!(partition.primary.to_string(), "---\nkind: B\n...");
    }

    #[test]
    fn partition_groups_reparse_to_their_documents() {
        let streams = [
            STREAM,
            "a: 1\n---\nkind: X\n...\nb: 2\n",
            "kind: A\n---\nkind: B\n...\nkind: A\n",
            "kind: X\n...\nkind: A\n...\nkind: X\n...\nkind: A\n",
            "kind: A\n...\n# between\nkind: X\n---\nkind: A\n...\n# tail\n",
        ];

        for stream in streams {
            let documents = parse(stream).expect("must parse");
            for kind in ["A", "B", "X"] {
                let partition = partition(&documents, &ResourceKind, |k| k == kind);

                for group in [&partition.primary, &partition.secondary] {
                    let reparsed = parse(&group.to_string()).expect("group reparses");
                    assert_eq!(reparsed.len(), group.len(), "{stream:?} split on {kind}");
                    assert_eq!(names_or_kinds(&reparsed), names_or_kinds(group));
                }
            }
        }
    }

    fn names_or_kinds(documents: &Documents) -> Vec<Result<String, KindError>> {
        documents
            .documents()
            .iter()
            .map(|document| ResourceKind.kind_of(document))
            .collect()
    }

    #[test]
    fn partition_prints_valid_streams() {
        let documents = parse(STREAM).expect("must parse");
        let partition = partition(&documents, &ResourceKind, |kind| kind == "B");

        assert_eq!(
            partition.primary.to_string(),
            "kind: A\nname: one\n---\n- not a resource\n---\nkind: \"A\"\nname: three\n"
        );
        assert_eq!(partition.secondary.to_string(), "---\nkind: B\nname: two\n");
    }
}
