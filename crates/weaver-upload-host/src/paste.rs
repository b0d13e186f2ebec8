//! Rewriting image nodes inside pasted content.

use weaver_upload_core::{ATTR_SRC, Fragment, Node, Slice};

/// Replace every image node with a string `src`, at any depth.
///
/// `replace` gets the image and its `src` and returns the node to put in its
/// place. Containers keep their identity and attributes, and the slice keeps
/// its open depths.
pub fn replace_images<F>(slice: Slice, mut replace: F) -> Slice
where
    F: FnMut(&Node, &str) -> Node,
{
    let Slice {
        content,
        open_start,
        open_end,
    } = slice;
    let nodes = rewrite(content.nodes(), &mut replace);
    Slice::new(Fragment::new(nodes), open_start, open_end)
}

fn rewrite<F>(nodes: &[Node], replace: &mut F) -> Vec<Node>
where
    F: FnMut(&Node, &str) -> Node,
{
    nodes
        .iter()
        .map(|node| {
            if node.is_image() {
                match node.attr(ATTR_SRC).as_str() {
                    Some(src) => replace(node, src),
                    None => node.clone(),
                }
            } else if node.children().is_empty() {
                node.clone()
            } else {
                node.with_children(rewrite(node.children(), replace))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use weaver_upload_core::Attrs;

    use super::*;

    #[test]
    fn test_replace_nested_images() {
        let slice = Slice::new(
            Fragment::new(vec![
                Node::paragraph(vec![
                    Node::text("a"),
                    Node::image(Attrs::new().with(ATTR_SRC, "one.png")),
                ]),
                Node::blockquote(vec![Node::paragraph(vec![Node::image(
                    Attrs::new().with(ATTR_SRC, "two.png").with("alt", "two"),
                )])]),
                Node::image(Attrs::new()),
            ]),
            1,
            0,
        );

        let mut seen = Vec::new();
        let out = replace_images(slice, |node, src| {
            seen.push(src.to_owned());
            Node::image(node.attrs().clone().with(ATTR_SRC, "pending"))
        });

        assert_eq!(seen, vec!["one.png", "two.png"]);
        assert_eq!((out.open_start, out.open_end), (1, 0));
        let outline: Vec<_> = out.content.nodes().iter().map(Node::outline).collect();
        assert_eq!(
            outline,
            vec![
                r#"paragraph("a" image[src="pending"])"#,
                r#"blockquote(paragraph(image[alt="two", src="pending"]))"#,
                "image",
            ]
        );
    }
}
