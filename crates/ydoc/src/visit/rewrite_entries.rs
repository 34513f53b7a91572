use crate::tree::{Document, Documents, MappingEntry, Node, SequenceEntry};
use std::sync::Arc;

/// Replaces entries during [RewriteEntries::rewrite_entries]
///
/// Each method receives the entry as found in the tree being rewritten, which makes identity
/// checks ([crate::tree::Entry::is_scope]) against previously collected entries possible.
/// Returning `None` keeps the entry.
///
/// The replacement's children are rewritten afterwards.
pub trait RewriteEntry {
    fn mapping_entry(&mut self, _entry: &Arc<MappingEntry>) -> Option<MappingEntry> {
        None
    }

    fn sequence_entry(&mut self, _entry: &Arc<SequenceEntry>) -> Option<SequenceEntry> {
        None
    }
}

/// Copy-on-write rebuild
///
/// Only the nodes on the path from the root to a replaced entry are rebuilt. When nothing is
/// replaced the result is the input itself (same allocation).
pub trait RewriteEntries: Sized {
    fn rewrite_entries(&self, rewriter: &mut dyn RewriteEntry) -> Self;
}

impl RewriteEntries for Node {
    fn rewrite_entries(&self, rewriter: &mut dyn RewriteEntry) -> Self {
        match self {
            Node::Scalar(_) => self.clone(),
            Node::Mapping(mapping) => {
                let entries: Vec<_> = mapping
                    .entries()
                    .iter()
                    .map(|entry| rewrite_mapping_entry(entry, rewriter))
                    .collect();

                if all_same(mapping.entries(), &entries) {
                    self.clone()
                } else {
                    mapping.with_entries(entries).into()
                }
            }
            Node::Sequence(sequence) => {
                let entries: Vec<_> = sequence
                    .entries()
                    .iter()
                    .map(|entry| rewrite_sequence_entry(entry, rewriter))
                    .collect();

                if all_same(sequence.entries(), &entries) {
                    self.clone()
                } else {
                    sequence.with_entries(entries).into()
                }
            }
        }
    }
}

impl RewriteEntries for Arc<Document> {
    fn rewrite_entries(&self, rewriter: &mut dyn RewriteEntry) -> Self {
        let block = self.block().rewrite_entries(rewriter);
        if block.is_scope(self.block()) {
            self.clone()
        } else {
            Arc::new(self.with_block(block))
        }
    }
}

impl RewriteEntries for Documents {
    fn rewrite_entries(&self, rewriter: &mut dyn RewriteEntry) -> Self {
        let documents: Vec<_> = self
            .documents()
            .iter()
            .map(|document| document.rewrite_entries(rewriter))
            .collect();

        if all_same(self.documents(), &documents) {
            self.clone()
        } else {
            self.with_documents(documents)
        }
    }
}

fn rewrite_mapping_entry(
    entry: &Arc<MappingEntry>,
    rewriter: &mut dyn RewriteEntry,
) -> Arc<MappingEntry> {
    let current = rewriter
        .mapping_entry(entry)
        .map_or_else(|| entry.clone(), Arc::new);

    let value = current.value().rewrite_entries(rewriter);
    if value.is_scope(current.value()) {
        current
    } else {
        Arc::new(current.with_value(value))
    }
}

fn rewrite_sequence_entry(
    entry: &Arc<SequenceEntry>,
    rewriter: &mut dyn RewriteEntry,
) -> Arc<SequenceEntry> {
    let current = rewriter
        .sequence_entry(entry)
        .map_or_else(|| entry.clone(), Arc::new);

    let block = current.block().rewrite_entries(rewriter);
    if block.is_scope(current.block()) {
        current
    } else {
        Arc::new(current.with_block(block))
    }
}

fn all_same<T>(before: &[Arc<T>], after: &[Arc<T>]) -> bool {
    before.len() == after.len() && before.iter().zip(after).all(|(a, b)| Arc::ptr_eq(a, b))
}
