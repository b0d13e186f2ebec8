//! Placeholder image nodes.
//!
//! A placeholder is an ordinary image node whose `src` points at the
//! configured decorative asset and whose `upload_id` attribute ties it to an
//! in-flight upload. The engine never keeps a reference to the node itself;
//! it finds it again by identifier when the upload settles.

use smol_str::SmolStr;

use crate::node::{ATTR_ERROR, ATTR_SRC, ATTR_UPLOAD_ID, AttrValue, Attrs, Node};
use crate::types::UploadId;

/// A placeholder built but not yet inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingInsertion {
    pub upload_id: UploadId,
    pub node: Node,
}

/// Build a placeholder image node.
///
/// `display_attrs` are kept (alt text, dimensions of a pasted image, ...)
/// except that `src` and `upload_id` are always overwritten.
pub fn create_placeholder(placeholder_src: &str, upload_id: &UploadId, display_attrs: &Attrs) -> Node {
    let mut attrs = display_attrs.clone();
    attrs.set(ATTR_SRC, placeholder_src);
    attrs.set(ATTR_UPLOAD_ID, SmolStr::new(upload_id.as_str()));
    Node::image(attrs)
}

/// Attributes of a settled placeholder.
///
/// Clears the upload identifier, sets `src` to the resolved URI and flags an
/// error when there is none. All other attributes are preserved.
pub fn resolved_attrs(current: &Attrs, uri: Option<&str>) -> Attrs {
    let uri = uri.filter(|uri| !uri.is_empty());
    let mut attrs = current.clone();
    attrs.set(ATTR_UPLOAD_ID, AttrValue::Null);
    attrs.set(ATTR_SRC, uri);
    attrs.set(ATTR_ERROR, uri.is_none().then_some(true));
    attrs
}

/// Whether a node is a placeholder still waiting for its upload.
pub fn is_pending(node: &Node) -> bool {
    node.is_image() && node.attr(ATTR_UPLOAD_ID).as_str().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_placeholder_overrides_src() {
        let id = UploadId::new("abc");
        let display = Attrs::new().with("alt", "cat").with(ATTR_SRC, "http://old/cat.png");
        let node = create_placeholder("loading.svg", &id, &display);

        assert!(is_pending(&node));
        assert_eq!(
            node.outline(),
            r#"image[alt="cat", src="loading.svg", upload_id="abc"]"#
        );
    }

    #[test]
    fn test_resolved_attrs_success() {
        let attrs = Attrs::new()
            .with("alt", "cat")
            .with(ATTR_SRC, "loading.svg")
            .with(ATTR_UPLOAD_ID, "abc");
        let resolved = resolved_attrs(&attrs, Some("https://cdn/cat.png"));

        assert_eq!(resolved.get(ATTR_SRC).as_str(), Some("https://cdn/cat.png"));
        assert!(resolved.get(ATTR_UPLOAD_ID).is_null());
        assert!(resolved.get(ATTR_ERROR).is_null());
        assert_eq!(resolved.get("alt").as_str(), Some("cat"));
    }

    #[test]
    fn test_resolved_attrs_failure() {
        let attrs = Attrs::new().with(ATTR_SRC, "loading.svg").with(ATTR_UPLOAD_ID, "abc");
        for uri in [None, Some("")] {
            let resolved = resolved_attrs(&attrs, uri);
            assert!(resolved.get(ATTR_SRC).is_null());
            assert!(resolved.get(ATTR_UPLOAD_ID).is_null());
            assert_eq!(resolved.get(ATTR_ERROR).as_bool(), Some(true));
        }
    }
}
