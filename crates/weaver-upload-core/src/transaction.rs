//! Atomic, position-mapped document transactions.
//!
//! A `Transaction` is a working copy of the document built from the current
//! state. Steps are applied to the copy immediately, so a failing step leaves
//! the real state untouched; the host commits the whole transaction with
//! [`crate::DocumentTree::apply`] in one go.

use std::ops::Range;

use crate::error::DocumentError;
use crate::node::{Attrs, Fragment, Node, NodeId};
use crate::types::Selection;

/// How one step moved positions around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepMap {
    pos: usize,
    old_size: usize,
    new_size: usize,
}

impl StepMap {
    /// Positions inside a replaced range map to its end; insertions push
    /// positions at the insertion point forward.
    fn map(&self, pos: usize) -> usize {
        if pos < self.pos {
            pos
        } else if pos < self.pos + self.old_size {
            self.pos + self.new_size
        } else {
            pos - self.old_size + self.new_size
        }
    }
}

/// A set of steps against one document state.
#[derive(Debug, Clone)]
pub struct Transaction {
    doc: Node,
    selection: Selection,
    base_version: u64,
    maps: Vec<StepMap>,
    attr_changes: Vec<(NodeId, Attrs)>,
    add_to_history: bool,
    doc_changed: bool,
}

/// The pieces of a finished transaction, consumed by the state on commit.
pub(crate) struct Committed {
    pub doc: Node,
    pub selection: Selection,
    pub base_version: u64,
    pub attr_changes: Vec<(NodeId, Attrs)>,
    pub add_to_history: bool,
    pub doc_changed: bool,
}

impl Transaction {
    pub fn new(doc: &Node, selection: Selection, base_version: u64) -> Self {
        Self {
            doc: doc.clone(),
            selection,
            base_version,
            maps: Vec::new(),
            attr_changes: Vec::new(),
            add_to_history: true,
            doc_changed: false,
        }
    }

    /// The document as it looks after the steps so far.
    pub fn doc(&self) -> &Node {
        &self.doc
    }

    /// The selection mapped through the steps so far.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = selection;
        self
    }

    /// Map a position from the state this transaction started on through
    /// every step applied so far.
    pub fn map(&self, pos: usize) -> usize {
        self.maps.iter().fold(pos, |pos, step| step.map(pos))
    }

    /// Keep this transaction out of the undo history.
    pub fn without_history(&mut self) -> &mut Self {
        self.add_to_history = false;
        self
    }

    pub fn adds_to_history(&self) -> bool {
        self.add_to_history
    }

    pub fn doc_changed(&self) -> bool {
        self.doc_changed
    }

    /// Insert a node at `pos` (in current transaction coordinates).
    pub fn insert(&mut self, pos: usize, node: Node) -> Result<&mut Self, DocumentError> {
        self.replace_with(pos..pos, Fragment::from(node))
    }

    /// Delete a range (in current transaction coordinates).
    pub fn delete(&mut self, range: Range<usize>) -> Result<&mut Self, DocumentError> {
        self.replace_with(range, Fragment::empty())
    }

    /// Delete the selected range, if the selection isn't empty.
    pub fn delete_selection(&mut self) -> Result<&mut Self, DocumentError> {
        if self.selection.is_empty() {
            return Ok(self);
        }
        let range = self.selection.to_range();
        self.delete(range)
    }

    /// Replace a range with the nodes of a fragment.
    ///
    /// Inserted nodes get fresh identities so copies of existing nodes never
    /// alias them.
    pub fn replace_with(
        &mut self,
        range: Range<usize>,
        fragment: Fragment,
    ) -> Result<&mut Self, DocumentError> {
        let size = self.doc.content_size();
        if range.start > range.end || range.end > size {
            return Err(DocumentError::PositionOutOfRange {
                pos: range.end.max(range.start),
                size,
            });
        }

        let new_size = fragment.size();
        let mut nodes = fragment.into_nodes();
        for node in &mut nodes {
            node.refresh_ids();
        }

        self.doc.delete_range(range.start, range.end)?;
        if !nodes.is_empty() {
            self.doc.insert_at(range.start, nodes)?;
        }

        let step = StepMap {
            pos: range.start,
            old_size: range.end - range.start,
            new_size,
        };
        self.maps.push(step);
        self.selection = Selection::new(step.map(self.selection.anchor), step.map(self.selection.head));
        self.doc_changed = true;
        Ok(self)
    }

    /// Replace the attributes of the node starting at `pos`.
    ///
    /// Positions don't move, so no step map is recorded.
    pub fn replace_attrs(&mut self, pos: usize, attrs: Attrs) -> Result<&mut Self, DocumentError> {
        let id = self.doc.set_attrs_at(pos, attrs.clone())?;
        self.attr_changes.push((id, attrs));
        self.doc_changed = true;
        Ok(self)
    }

    pub(crate) fn commit(self) -> Committed {
        Committed {
            doc: self.doc,
            selection: self.selection,
            base_version: self.base_version,
            attr_changes: self.attr_changes,
            add_to_history: self.add_to_history,
            doc_changed: self.doc_changed,
        }
    }
}
