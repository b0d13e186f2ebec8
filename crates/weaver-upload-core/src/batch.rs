//! Fanning multi-item input out into independent uploads.

use crate::document::DocumentTree;
use crate::types::{FileHandle, UploadItems, UploadSource};
use crate::upload::{UploadHandle, Uploader};
use crate::view::EditorView;

impl<V: EditorView> Uploader<V> {
    /// Start one upload per item at consecutive positions from `at`.
    ///
    /// `at` is mapped through a deleted selection once, by the first
    /// placeholder; the rest follow directly after the one before. Items
    /// whose placeholder can't be placed are logged and skipped; the rest
    /// still go out.
    pub fn dispatch_many(&self, view: &V, items: impl Into<UploadItems>, at: usize) -> Vec<UploadHandle> {
        let sources = items.into().into_vec();
        tracing::debug!(count = sources.len(), at, "dispatching uploads");

        let mut handles = Vec::with_capacity(sources.len());
        let mut next: Option<usize> = None;
        for (i, source) in sources.into_iter().enumerate() {
            let label = source.label().to_owned();
            let target = next.unwrap_or(at + i);
            match self.place(view, source, target) {
                Ok((handle, pos)) => {
                    next = Some(pos + 1);
                    handles.push(handle);
                }
                Err(e) => tracing::warn!(source = %label, error = %e, "could not insert placeholder"),
            }
        }
        handles
    }

    /// Upload the files whose MIME type is accepted, starting at `at`.
    pub fn upload_files(&self, view: &V, files: Vec<FileHandle>, at: usize) -> Vec<UploadHandle> {
        let accepted: Vec<UploadSource> = files
            .into_iter()
            .filter(|file| {
                let ok = self.config().accepts(&file.mime_type);
                if !ok {
                    tracing::debug!(name = %file.name, mime_type = %file.mime_type, "skipping unsupported file");
                }
                ok
            })
            .map(UploadSource::File)
            .collect();

        if accepted.is_empty() {
            return Vec::new();
        }
        self.dispatch_many(view, accepted, at)
    }

    /// Programmatic upload trigger.
    ///
    /// Yields once so whatever edit the caller is in the middle of commits
    /// first, then dispatches at the start of the selection as it is at that
    /// point.
    pub async fn request_upload(&self, view: &V, items: impl Into<UploadItems>) -> Vec<UploadHandle> {
        let items = items.into();
        tokio::task::yield_now().await;
        let at = view.read(|state| state.selection().from());
        self.dispatch_many(view, items, at)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use smol_str::SmolStr;

    use super::*;
    use crate::config::Config;
    use crate::document::EditorState;
    use crate::error::ResolveError;
    use crate::locate::pending_ids;
    use crate::node::Node;
    use crate::types::{Selection, UploadId};
    use crate::view::SharedView;

    fn counting_uploader() -> Uploader<SharedView> {
        let next = Arc::new(AtomicUsize::new(0));
        Uploader::new(
            Config::new(|_source: UploadSource| std::future::pending::<Result<SmolStr, ResolveError>>())
                .with_placeholder_src("loading.svg")
                .with_accepted_types(["image/png"])
                .with_id_generator(move || UploadId::new(format!("id{}", next.fetch_add(1, Ordering::Relaxed)))),
        )
    }

    fn view_with(text: &str) -> SharedView {
        SharedView::new(EditorState::new(Node::doc(vec![Node::paragraph(vec![
            Node::text(text),
        ])])))
    }

    fn view() -> SharedView {
        view_with("ab")
    }

    #[tokio::test]
    async fn test_dispatch_many_consecutive_positions() {
        let view = view();
        let handles = counting_uploader().dispatch_many(
            &view,
            vec![UploadSource::from("https://x/1.png"), UploadSource::from("https://x/2.png")],
            2,
        );
        assert_eq!(handles.len(), 2);

        let doc = view.doc();
        assert_eq!(doc.node_at(2).and_then(|n| n.attr("upload_id").as_str()), Some("id0"));
        assert_eq!(doc.node_at(3).and_then(|n| n.attr("upload_id").as_str()), Some("id1"));
    }

    #[tokio::test]
    async fn test_dispatch_many_over_selection_stays_consecutive() {
        let view = view_with("abcdefghij");
        view.update(|state| state.set_selection(Selection::new(2, 5)));

        let handles = counting_uploader().dispatch_many(
            &view,
            vec![UploadSource::from("https://x/1.png"), UploadSource::from("https://x/2.png")],
            8,
        );
        assert_eq!(handles.len(), 2);
        assert_eq!(
            view.doc().outline(),
            r#"doc(paragraph("aefg" image[src="loading.svg", upload_id="id0"] image[src="loading.svg", upload_id="id1"] "hij"))"#
        );
    }

    #[tokio::test]
    async fn test_upload_files_filters_types() {
        let view = view();
        let handles = counting_uploader().upload_files(
            &view,
            vec![
                FileHandle::new("a.png", "image/png", vec![1u8]),
                FileHandle::new("b.pdf", "application/pdf", vec![2u8]),
            ],
            1,
        );
        assert_eq!(handles.len(), 1);
        assert_eq!(pending_ids(&view.doc()), vec![UploadId::new("id0")]);
    }

    #[tokio::test]
    async fn test_upload_files_nothing_accepted() {
        let view = view();
        let handles = counting_uploader().upload_files(
            &view,
            vec![FileHandle::new("b.pdf", "application/pdf", vec![2u8])],
            1,
        );
        assert!(handles.is_empty());
        assert_eq!(view.read(|state| state.version()), 0);
    }
}
