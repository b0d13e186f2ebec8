//! Core document trait and the reference editor state.
//!
//! Defines the `DocumentTree` trait the upload engine talks to, allowing
//! hosts to plug in their own state container while sharing the placeholder
//! and reconciliation logic.

use crate::error::DocumentError;
use crate::node::{Attrs, Node};
use crate::transaction::Transaction;
use crate::types::Selection;
use crate::undo::{History, Snapshot, UndoManager};

/// Core trait for editor document states.
///
/// Everything the upload engine needs from the document: read the current
/// tree and selection, build a transaction against them and commit it
/// atomically.
pub trait DocumentTree {
    /// The current document root.
    fn doc(&self) -> &Node;

    /// The current selection.
    fn selection(&self) -> Selection;

    /// Start a transaction against the current state.
    fn transaction(&self) -> Transaction;

    /// Commit a transaction.
    ///
    /// Fails without touching the state if the transaction was built against
    /// an older state.
    fn apply(&mut self, tr: Transaction) -> Result<(), DocumentError>;

    /// Rewrite node attributes in stored history states, leaving the
    /// current document alone.
    ///
    /// `rewrite` returns the new attributes for a node, or None to leave it.
    /// Returns how many nodes changed. States without history change nothing.
    fn rewrite_history(&mut self, _rewrite: &mut dyn FnMut(&Node) -> Option<Attrs>) -> usize {
        0
    }
}

/// Simple field-based document state with undo support.
#[derive(Debug, Clone)]
pub struct EditorState {
    doc: Node,
    selection: Selection,
    version: u64,
    history: History,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Node::doc(vec![Node::paragraph(Vec::new())]))
    }
}

impl EditorState {
    /// Create a state around a document, cursor at the start.
    pub fn new(doc: Node) -> Self {
        Self::with_history(doc, History::default())
    }

    pub fn with_history(doc: Node, history: History) -> Self {
        Self {
            doc,
            selection: Selection::default(),
            version: 0,
            history,
        }
    }

    /// Monotonic counter bumped by every committed change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Move the selection, clamped to the document.
    pub fn set_selection(&mut self, selection: Selection) {
        let size = self.doc.content_size();
        self.selection = Selection::new(selection.anchor.min(size), selection.head.min(size));
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            doc: self.doc.clone(),
            selection: self.selection,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.doc = snapshot.doc;
        self.selection = snapshot.selection;
        self.version += 1;
    }
}

impl DocumentTree for EditorState {
    fn doc(&self) -> &Node {
        &self.doc
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn transaction(&self) -> Transaction {
        Transaction::new(&self.doc, self.selection, self.version)
    }

    fn apply(&mut self, tr: Transaction) -> Result<(), DocumentError> {
        let committed = tr.commit();
        if committed.base_version != self.version {
            return Err(DocumentError::StaleTransaction {
                built: committed.base_version,
                current: self.version,
            });
        }

        if committed.doc_changed {
            if committed.add_to_history {
                let before = self.snapshot();
                self.history.record(before);
            } else {
                for (id, attrs) in &committed.attr_changes {
                    self.history.rebase_attrs(*id, attrs);
                }
            }
        }

        self.doc = committed.doc;
        self.selection = committed.selection;
        self.version += 1;
        Ok(())
    }

    fn rewrite_history(&mut self, rewrite: &mut dyn FnMut(&Node) -> Option<Attrs>) -> usize {
        self.history.rewrite_attrs(rewrite)
    }
}

impl UndoManager for EditorState {
    fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn undo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ATTR_SRC;

    fn make_state(content: &str) -> EditorState {
        EditorState::new(Node::doc(vec![Node::paragraph(vec![Node::text(content)])]))
    }

    #[test]
    fn test_basic_insert() {
        let mut state = make_state("hello");
        let mut tr = state.transaction();
        tr.insert(6, Node::text(" world")).unwrap();
        state.apply(tr).unwrap();
        assert_eq!(state.doc().outline(), r#"doc(paragraph("hello" " world"))"#);
        assert_eq!(state.version(), 1);
    }

    #[test]
    fn test_stale_transaction_rejected() {
        let mut state = make_state("hello");
        let stale = state.transaction();

        let mut tr = state.transaction();
        tr.delete(1..2).unwrap();
        state.apply(tr).unwrap();

        let err = state.apply(stale).unwrap_err();
        assert_eq!(err, DocumentError::StaleTransaction { built: 0, current: 1 });
        assert_eq!(state.doc().outline(), r#"doc(paragraph("ello"))"#);
    }

    #[test]
    fn test_undo_redo() {
        let mut state = make_state("hello");
        let mut tr = state.transaction();
        tr.insert(6, Node::hard_break()).unwrap();
        state.apply(tr).unwrap();

        assert!(state.undo());
        assert_eq!(state.doc().outline(), r#"doc(paragraph("hello"))"#);

        assert!(state.redo());
        assert_eq!(state.doc().outline(), r#"doc(paragraph("hello" hard_break))"#);
    }

    #[test]
    fn test_selection_only_change_not_recorded() {
        let mut state = make_state("hello");
        let mut tr = state.transaction();
        tr.set_selection(Selection::new(1, 3));
        state.apply(tr).unwrap();
        assert!(!state.can_undo());
        assert_eq!(state.selection(), Selection::new(1, 3));
    }

    #[test]
    fn test_out_of_history_attrs_survive_undo() {
        let mut state = make_state("hi");
        let mut tr = state.transaction();
        tr.insert(3, Node::image(Attrs::new().with(ATTR_SRC, "placeholder")))
            .unwrap();
        state.apply(tr).unwrap();

        let mut tr = state.transaction();
        tr.insert(4, Node::text("!")).unwrap();
        state.apply(tr).unwrap();

        let mut tr = state.transaction();
        tr.without_history()
            .replace_attrs(3, Attrs::new().with(ATTR_SRC, "final.png"))
            .unwrap();
        state.apply(tr).unwrap();
        assert_eq!(state.history().undo_depth(), 2);

        assert!(state.undo());
        assert_eq!(
            state.doc().outline(),
            r#"doc(paragraph("hi" image[src="final.png"]))"#
        );
    }

    #[test]
    fn test_set_selection_clamps() {
        let mut state = make_state("hi");
        state.set_selection(Selection::new(1, 40));
        assert_eq!(state.selection(), Selection::new(1, 4));
    }
}
