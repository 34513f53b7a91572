//! visitor pattern helpers
//!
//! - [VisitEntries]: walk all annotatable entries (depth-first, in source order)
//! - [RewriteEntries]: rebuild a tree, replacing entries, sharing everything that did not change
mod rewrite_entries;
mod visit_entries;
pub use rewrite_entries::{RewriteEntries, RewriteEntry};
pub use visit_entries::{flatten, VisitEntries};

/// Visitor that sees its subjects together with their ancestors (outermost first)
pub trait Visit<T> {
    fn visit(&mut self, value: &T, ancestors: &[T]);
}

// blanket impl for FnMut
impl<T, F> Visit<T> for F
where
    F: FnMut(&T, &[T]),
{
    fn visit(&mut self, value: &T, ancestors: &[T]) {
        self(value, ancestors)
    }
}
