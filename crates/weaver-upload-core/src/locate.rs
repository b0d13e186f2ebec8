//! Finding placeholders again by upload identifier.

use crate::node::{ATTR_UPLOAD_ID, Node};
use crate::types::UploadId;

/// An image node together with the position directly before it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedNode {
    pub node: Node,
    pub pos: usize,
}

/// Whether `node` is an image tagged with `id`.
pub fn matches_id(node: &Node, id: &UploadId) -> bool {
    node.is_image() && node.attr(ATTR_UPLOAD_ID).as_str() == Some(id.as_str())
}

/// All image nodes tagged with `id`, in document order.
///
/// Usually zero or one, but copy-paste of a pending placeholder can produce
/// several; callers handle every match.
pub fn find_by_id(doc: &Node, id: &UploadId) -> Vec<LocatedNode> {
    let mut found = Vec::new();
    doc.descendants(|node, pos| {
        if matches_id(node, id) {
            found.push(LocatedNode {
                node: node.clone(),
                pos,
            });
        }
        true
    });
    found
}

/// Identifiers of every placeholder still pending, in document order, without duplicates.
pub fn pending_ids(doc: &Node) -> Vec<UploadId> {
    let mut ids: Vec<UploadId> = Vec::new();
    doc.descendants(|node, _| {
        if let Some(id) = node.attr(ATTR_UPLOAD_ID).as_str().filter(|_| node.is_image()) {
            if !ids.iter().any(|seen| seen.as_str() == id) {
                ids.push(UploadId::new(id));
            }
        }
        true
    });
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ATTR_SRC, Attrs};

    fn pending(id: &str) -> Node {
        Node::image(Attrs::new().with(ATTR_SRC, "loading.svg").with(ATTR_UPLOAD_ID, id))
    }

    #[test]
    fn test_find_by_id_all_matches() {
        let doc = Node::doc(vec![
            Node::paragraph(vec![Node::text("a"), pending("x")]),
            Node::blockquote(vec![Node::paragraph(vec![pending("y"), pending("x")])]),
        ]);

        let found = find_by_id(&doc, &UploadId::new("x"));
        let positions: Vec<_> = found.iter().map(|l| l.pos).collect();
        assert_eq!(positions, vec![2, 7]);
        assert!(found.iter().all(|l| l.node.is_image()));

        assert!(find_by_id(&doc, &UploadId::new("z")).is_empty());
        assert_eq!(pending_ids(&doc), vec![UploadId::new("x"), UploadId::new("y")]);
    }

    #[test]
    fn test_find_ignores_settled_images() {
        let doc = Node::doc(vec![Node::paragraph(vec![Node::image(
            Attrs::new().with(ATTR_SRC, "x.png"),
        )])]);
        assert!(pending_ids(&doc).is_empty());
    }
}
