use super::Visit;
use crate::tree::{Document, Entry, Node};

/// Recursively visit all [Entry]s
///
/// Entries are visited in pre-order: an entry is seen before the entries nested in its value,
/// siblings in the order they appear in the source.
pub trait VisitEntries {
    fn visit_entries(&self, visitor: &mut dyn Visit<Entry>);
}

impl VisitEntries for Node {
    fn visit_entries(&self, visitor: &mut dyn Visit<Entry>) {
        walk(self, visitor, &mut vec![]);
    }
}

impl VisitEntries for Document {
    fn visit_entries(&self, visitor: &mut dyn Visit<Entry>) {
        self.block().visit_entries(visitor);
    }
}

fn walk(node: &Node, visitor: &mut dyn Visit<Entry>, ancestors: &mut Vec<Entry>) {
    match node {
        Node::Scalar(_) => {}
        Node::Mapping(mapping) => {
            for entry in mapping.entries() {
                let current = Entry::Mapping(entry.clone());
                visitor.visit(&current, ancestors);

                ancestors.push(current);
                walk(entry.value(), visitor, ancestors);
                ancestors.pop();
            }
        }
        Node::Sequence(sequence) => {
            for entry in sequence.entries() {
                let current = Entry::Sequence(entry.clone());
                visitor.visit(&current, ancestors);

                ancestors.push(current);
                walk(entry.block(), visitor, ancestors);
                ancestors.pop();
            }
        }
    }
}

/// All entries of a document in source order
pub fn flatten(document: &Document) -> Vec<Entry> {
    let mut entries = vec![];
    document.visit_entries(&mut |entry: &Entry, _ancestors: &[Entry]| entries.push(entry.clone()));
    entries
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;
    use crate::tree::Documents;
    use pretty_assertions::assert_eq;

    fn document(text: &str) -> std::sync::Arc<Document> {
        let documents: Documents = text.parse().expect("must parse");
        documents.documents()[0].clone()
    }

    /// mapping keys, `-` for sequence entries
    fn labels(entries: &[Entry]) -> Vec<String> {
        entries
            .iter()
            .map(|entry| match entry {
                Entry::Mapping(entry) => entry.key().value().to_string(),
                Entry::Sequence(_) => "-".to_string(),
            })
            .collect()
    }

    #[test]
    fn source_order() {
        let document = document("a:\n  b: 1\n  c:\n  - d: 2\n    e: 3\n  - 4\nf: 5\n");
        assert_eq!(
            labels(&flatten(&document)),
            ["a", "b", "c", "-", "d", "e", "-", "f"]
        );
    }

    #[test]
    fn deterministic() {
        let document = document("- a: [1, 2]\n- - b\n  - c\n");
        let first = flatten(&document);
        let second = flatten(&document);

        assert_eq!(first.len(), 5);
        assert!(first.iter().zip(&second).all(|(a, b)| a.is_scope(b)));
    }

    #[test]
    fn scalar_document_has_no_entries() {
        assert!(flatten(&document("just a scalar\n")).is_empty());
        assert!(flatten(&document("---\n# only a comment\n")).is_empty());
    }

    #[test]
    fn ancestors_are_outermost_first() {
        let documents = parse("a:\n  - b: 1\n").expect("must parse");

        let mut depths = vec![];
        documents.documents()[0].visit_entries(&mut |_entry: &Entry, ancestors: &[Entry]| {
            depths.push(labels(ancestors).join("/"))
        });

        assert_eq!(depths, ["", "a", "a/-"]);
    }
}
