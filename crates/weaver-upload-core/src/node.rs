//! Document tree nodes, attributes and the position model.
//!
//! Positions follow the usual rich-text convention: a text node counts one
//! unit per character, a leaf node (image, hard break) counts one unit, and a
//! container counts its content plus one unit each for its opening and
//! closing boundary. Document positions address the root's content, so the
//! valid range is `0..=doc.content_size()`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use smol_str::SmolStr;

use crate::error::DocumentError;

/// Attribute carrying the upload identifier of a pending image.
pub const ATTR_UPLOAD_ID: &str = "upload_id";
/// Attribute carrying the image source URI.
pub const ATTR_SRC: &str = "src";
/// Attribute flagging a failed upload.
pub const ATTR_ERROR: &str = "error";

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Arena-style identity of a node.
///
/// Stable across edits that don't replace the node, used to carry attribute
/// changes into history snapshots. Distinct from [`crate::UploadId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The kinds of node the document model knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Doc,
    Paragraph,
    Heading,
    Blockquote,
    Text,
    Image,
    HardBreak,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading => "heading",
            NodeKind::Blockquote => "blockquote",
            NodeKind::Text => "text",
            NodeKind::Image => "image",
            NodeKind::HardBreak => "hard_break",
        }
    }

    /// Leaves occupy a single position and have no content.
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeKind::Image | NodeKind::HardBreak)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text)
    }
}

/// A single attribute value.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Str(SmolStr),
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => f.write_str("null"),
            AttrValue::Bool(b) => write!(f, "{b}"),
            AttrValue::Int(i) => write!(f, "{i}"),
            AttrValue::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.into())
    }
}

impl From<SmolStr> for AttrValue {
    fn from(s: SmolStr) -> Self {
        AttrValue::Str(s)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AttrValue::Null)
    }
}

/// Ordered attribute map of a node.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Attrs(BTreeMap<SmolStr, AttrValue>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<SmolStr>, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<SmolStr>, value: impl Into<AttrValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Missing attributes read as null.
    pub fn get(&self, name: &str) -> &AttrValue {
        static NULL: AttrValue = AttrValue::Null;
        self.0.get(name).unwrap_or(&NULL)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SmolStr, &AttrValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<SmolStr>, V: Into<AttrValue>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A node of the document tree.
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    attrs: Attrs,
    text: SmolStr,
    children: Vec<Node>,
}

impl PartialEq for Node {
    /// Structural equality; node identities are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.attrs == other.attrs
            && self.text == other.text
            && self.children == other.children
    }
}

impl Node {
    /// Create an element node.
    pub fn new(kind: NodeKind, attrs: Attrs, children: Vec<Node>) -> Self {
        Self {
            id: NodeId::fresh(),
            kind,
            attrs,
            text: SmolStr::default(),
            children,
        }
    }

    pub fn doc(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Doc, Attrs::new(), children)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph, Attrs::new(), children)
    }

    pub fn blockquote(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Blockquote, Attrs::new(), children)
    }

    pub fn heading(level: i64, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Heading, Attrs::new().with("level", level), children)
    }

    pub fn text(text: impl Into<SmolStr>) -> Self {
        Self {
            id: NodeId::fresh(),
            kind: NodeKind::Text,
            attrs: Attrs::new(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub fn image(attrs: Attrs) -> Self {
        Self::new(NodeKind::Image, attrs, Vec::new())
    }

    pub fn hard_break() -> Self {
        Self::new(NodeKind::HardBreak, Attrs::new(), Vec::new())
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, name: &str) -> &AttrValue {
        self.attrs.get(name)
    }

    pub fn text_content(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_image(&self) -> bool {
        self.kind == NodeKind::Image
    }

    /// Number of positions this node occupies in its parent.
    pub fn node_size(&self) -> usize {
        match self.kind {
            NodeKind::Text => self.text.chars().count(),
            kind if kind.is_leaf() => 1,
            _ => self.content_size() + 2,
        }
    }

    /// Number of positions inside this node.
    pub fn content_size(&self) -> usize {
        self.children.iter().map(Node::node_size).sum()
    }

    /// Copy of this node with a different child list, keeping identity and attributes.
    pub fn with_children(&self, children: Vec<Node>) -> Node {
        Node {
            id: self.id,
            kind: self.kind,
            attrs: self.attrs.clone(),
            text: self.text.clone(),
            children,
        }
    }

    /// Give this node and every descendant a fresh identity.
    pub(crate) fn refresh_ids(&mut self) {
        self.id = NodeId::fresh();
        for child in &mut self.children {
            child.refresh_ids();
        }
    }

    /// Visit every descendant depth-first in document order.
    ///
    /// `pos` is the position directly before each node, relative to the start
    /// of this node's content. Returning `false` from the visitor skips the
    /// node's children.
    pub fn descendants<F>(&self, mut visit: F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        walk(&self.children, 0, &mut visit);
    }

    /// The node starting exactly at `pos`, if any.
    pub fn node_at(&self, pos: usize) -> Option<&Node> {
        find_ref(&self.children, 0, pos)
    }

    /// Insert nodes at a content position.
    pub(crate) fn insert_at(&mut self, pos: usize, nodes: Vec<Node>) -> Result<(), DocumentError> {
        let size = self.content_size();
        if pos > size {
            return Err(DocumentError::PositionOutOfRange { pos, size });
        }
        insert_into(&mut self.children, pos, nodes);
        Ok(())
    }

    /// Delete everything between two content positions.
    ///
    /// Nodes wholly inside the range are removed, text is trimmed and
    /// containers cut by the range keep their boundaries.
    pub(crate) fn delete_range(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
        let size = self.content_size();
        if from > to || to > size {
            return Err(DocumentError::PositionOutOfRange { pos: to.max(from), size });
        }
        if from < to {
            delete_from(&mut self.children, from, to);
        }
        Ok(())
    }

    /// Replace the attributes of the node starting at `pos`, returning its identity.
    pub(crate) fn set_attrs_at(&mut self, pos: usize, attrs: Attrs) -> Result<NodeId, DocumentError> {
        let node = find_mut(&mut self.children, 0, pos).ok_or(DocumentError::NoNodeAt { pos })?;
        if node.kind.is_text() {
            return Err(DocumentError::TextHasNoAttrs { pos });
        }
        node.attrs = attrs;
        Ok(node.id)
    }

    /// Replace the attributes of every node with the given identity.
    pub(crate) fn set_attrs_by_id(&mut self, id: NodeId, attrs: &Attrs) -> usize {
        let mut count = 0;
        if self.id == id {
            self.attrs = attrs.clone();
            count += 1;
        }
        for child in &mut self.children {
            count += child.set_attrs_by_id(id, attrs);
        }
        count
    }

    /// Compact single-line outline of the tree, handy for logs and snapshots.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        write_outline(self, &mut out);
        out
    }
}

fn walk<F>(children: &[Node], start: usize, visit: &mut F)
where
    F: FnMut(&Node, usize) -> bool,
{
    let mut pos = start;
    for child in children {
        if visit(child, pos) && !child.children.is_empty() {
            walk(&child.children, pos + 1, visit);
        }
        pos += child.node_size();
    }
}

fn find_ref(children: &[Node], start: usize, pos: usize) -> Option<&Node> {
    let mut offset = start;
    for child in children {
        let end = offset + child.node_size();
        if offset == pos {
            return Some(child);
        }
        if offset < pos && pos < end {
            if child.kind.is_text() || child.kind.is_leaf() {
                return None;
            }
            return find_ref(&child.children, offset + 1, pos);
        }
        offset = end;
    }
    None
}

fn find_mut(children: &mut [Node], start: usize, pos: usize) -> Option<&mut Node> {
    let mut offset = start;
    for child in children.iter_mut() {
        let end = offset + child.node_size();
        if offset == pos {
            return Some(child);
        }
        if offset < pos && pos < end {
            if child.kind.is_text() || child.kind.is_leaf() {
                return None;
            }
            return find_mut(&mut child.children, offset + 1, pos);
        }
        offset = end;
    }
    None
}

fn insert_into(children: &mut Vec<Node>, pos: usize, nodes: Vec<Node>) {
    let mut offset = 0;
    for index in 0..children.len() {
        if offset == pos {
            children.splice(index..index, nodes);
            return;
        }
        let size = children[index].node_size();
        if pos < offset + size {
            let child = &mut children[index];
            if child.kind.is_text() {
                let split = pos - offset;
                let head: String = child.text.chars().take(split).collect();
                let tail: String = child.text.chars().skip(split).collect();
                child.text = head.into();
                let rest = Node::text(tail);
                let mut insert = nodes;
                insert.push(rest);
                children.splice(index + 1..index + 1, insert);
            } else {
                // Strictly inside a container: descend past the opening boundary.
                insert_into(&mut child.children, pos - offset - 1, nodes);
            }
            return;
        }
        offset += size;
    }
    children.extend(nodes);
}

fn delete_from(children: &mut Vec<Node>, from: usize, to: usize) {
    let mut offset = 0;
    let mut index = 0;
    while index < children.len() {
        let size = children[index].node_size();
        let start = offset;
        let end = offset + size;
        offset = end;

        if end <= from || start >= to {
            index += 1;
            continue;
        }
        if from <= start && end <= to {
            children.remove(index);
            continue;
        }

        let child = &mut children[index];
        if child.kind.is_text() {
            let cut_from = from.saturating_sub(start);
            let cut_to = (to - start).min(size);
            let kept: String = child
                .text
                .chars()
                .enumerate()
                .filter(|(i, _)| *i < cut_from || *i >= cut_to)
                .map(|(_, c)| c)
                .collect();
            child.text = kept.into();
        } else if !child.kind.is_leaf() {
            let inner_from = from.saturating_sub(start + 1);
            let inner_to = (to - start - 1).min(child.content_size());
            if inner_from < inner_to {
                delete_from(&mut child.children, inner_from, inner_to);
            }
        }
        if child.kind.is_text() && child.text.is_empty() {
            children.remove(index);
        } else {
            index += 1;
        }
    }
}

fn write_outline(node: &Node, out: &mut String) {
    if node.kind.is_text() {
        out.push_str(&format!("{:?}", node.text.as_str()));
        return;
    }
    out.push_str(node.kind.name());
    if !node.attrs.is_empty() {
        out.push('[');
        for (i, (name, value)) in node.attrs.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&format!("{name}={value}"));
        }
        out.push(']');
    }
    if !node.kind.is_leaf() {
        out.push('(');
        for (i, child) in node.children.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            write_outline(child, out);
        }
        out.push(')');
    }
}

/// An ordered list of sibling nodes.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Fragment(Vec<Node>);

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.0
    }

    pub fn size(&self) -> usize {
        self.0.iter().map(Node::node_size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Node> for Fragment {
    fn from(node: Node) -> Self {
        Self(vec![node])
    }
}

/// A fragment cut out of a document, with the depth of the open boundaries
/// on each side.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Slice {
    pub content: Fragment,
    pub open_start: usize,
    pub open_end: usize,
}

impl Slice {
    pub fn new(content: Fragment, open_start: usize, open_end: usize) -> Self {
        Self {
            content,
            open_start,
            open_end,
        }
    }
}
