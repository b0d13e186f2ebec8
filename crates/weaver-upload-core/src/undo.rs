//! Undo/redo management for document states.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `History` - snapshot-based undo/redo stacks used by `EditorState`

use crate::node::{Attrs, Node, NodeId};
use crate::types::Selection;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// A recorded document state.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub doc: Node,
    pub selection: Selection,
}

/// Snapshot-based undo/redo stacks.
///
/// History-visible transactions record the state they replaced. Attribute
/// changes made outside history are rebased onto every stored snapshot by
/// node identity, so stepping through history never brings back a state
/// those changes already superseded.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    max_steps: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

impl History {
    /// Create an empty history keeping at most `max_steps` undo entries.
    pub fn new(max_steps: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_steps,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Record the state a history-visible transaction replaced.
    pub(crate) fn record(&mut self, before: Snapshot) {
        // Clear redo stack on new edit
        self.redo_stack.clear();
        self.undo_stack.push(before);

        // Trim if over max
        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.remove(0);
        }
    }

    /// Carry an out-of-history attribute change into every stored state.
    pub(crate) fn rebase_attrs(&mut self, id: NodeId, attrs: &Attrs) {
        for snapshot in self.undo_stack.iter_mut().chain(self.redo_stack.iter_mut()) {
            snapshot.doc.set_attrs_by_id(id, attrs);
        }
    }

    /// Rewrite the attributes of matching nodes in every stored state.
    ///
    /// `rewrite` returns the new attributes for a node, or None to leave it.
    /// Returns how many nodes changed across all states.
    pub(crate) fn rewrite_attrs(&mut self, rewrite: &mut dyn FnMut(&Node) -> Option<Attrs>) -> usize {
        let mut changed = 0;
        for snapshot in self.undo_stack.iter_mut().chain(self.redo_stack.iter_mut()) {
            let mut updates: Vec<(NodeId, Attrs)> = Vec::new();
            snapshot.doc.descendants(|node, _| {
                if let Some(attrs) = rewrite(node) {
                    updates.push((node.id(), attrs));
                }
                true
            });
            for (id, attrs) in &updates {
                snapshot.doc.set_attrs_by_id(*id, attrs);
            }
            changed += updates.len();
        }
        changed
    }

    /// Swap the current state for the previous one.
    pub(crate) fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Swap the current state for the next one.
    pub(crate) fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ATTR_SRC, ATTR_UPLOAD_ID};

    fn snap(text: &str) -> Snapshot {
        Snapshot {
            doc: Node::doc(vec![Node::paragraph(vec![Node::text(text)])]),
            selection: Selection::default(),
        }
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::new(100);
        assert!(!history.can_undo());

        history.record(snap("a"));
        assert!(history.can_undo());

        let previous = history.undo(snap("ab")).unwrap();
        assert_eq!(previous.doc.outline(), r#"doc(paragraph("a"))"#);
        assert!(history.can_redo());

        let next = history.redo(previous).unwrap();
        assert_eq!(next.doc.outline(), r#"doc(paragraph("ab"))"#);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::new(100);
        history.record(snap("a"));
        let previous = history.undo(snap("ab")).unwrap();
        assert!(history.can_redo());

        history.record(previous);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_steps() {
        let mut history = History::new(3);
        for text in ["a", "b", "c", "d"] {
            history.record(snap(text));
        }
        assert_eq!(history.undo_depth(), 3);

        let mut current = snap("e");
        let mut seen = Vec::new();
        while let Some(previous) = history.undo(current.clone()) {
            seen.push(previous.doc.outline());
            current = previous;
        }
        // "a" was evicted
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], r#"doc(paragraph("b"))"#);
    }

    #[test]
    fn test_rebase_attrs_reaches_both_stacks() {
        let image = Node::image(Attrs::new().with(ATTR_SRC, "placeholder"));
        let id = image.id();
        let with_image = Snapshot {
            doc: Node::doc(vec![Node::paragraph(vec![image])]),
            selection: Selection::default(),
        };

        let mut history = History::new(10);
        history.record(with_image.clone());
        history.record(with_image.clone());
        let _ = history.undo(with_image);

        history.rebase_attrs(id, &Attrs::new().with(ATTR_SRC, "final.png"));

        let previous = history.undo(snap("x")).unwrap();
        assert_eq!(previous.doc.outline(), r#"doc(paragraph(image[src="final.png"]))"#);
        let _ = history.redo(previous.clone());
        let next = history.redo(previous).unwrap();
        assert_eq!(next.doc.outline(), r#"doc(paragraph(image[src="final.png"]))"#);
    }

    #[test]
    fn test_rewrite_attrs_matches_by_content() {
        let pending = || Node::image(Attrs::new().with(ATTR_UPLOAD_ID, "u1"));
        let two_copies = Snapshot {
            doc: Node::doc(vec![Node::paragraph(vec![pending(), Node::text("x"), pending()])]),
            selection: Selection::default(),
        };

        let mut history = History::new(10);
        history.record(snap("a"));
        let _ = history.undo(two_copies);

        let changed = history.rewrite_attrs(&mut |node: &Node| {
            (node.attr(ATTR_UPLOAD_ID).as_str() == Some("u1"))
                .then(|| Attrs::new().with(ATTR_SRC, "final.png"))
        });
        assert_eq!(changed, 2);

        let next = history.redo(snap("a")).unwrap();
        assert_eq!(
            next.doc.outline(),
            r#"doc(paragraph(image[src="final.png"] "x" image[src="final.png"]))"#
        );
    }
}
