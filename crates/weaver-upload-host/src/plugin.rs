//! Editor event hooks for image uploads.
//!
//! `ImageUploader` wraps the upload engine with the handlers a host wires to
//! its input events. Each handler returns whether it claimed the event; an
//! unclaimed event should fall through to the host's default handling.

use smol_str::SmolStr;
use weaver_upload_core::{
    Config, DocumentTree, EditorView, Slice, UploadHandle, UploadId, UploadItems, UploadSource,
    Uploader,
};

use crate::clipboard::{self, ClipboardItem};
use crate::drop::DropEvent;
use crate::paste;

/// The view that last received keyboard focus or input.
///
/// Structural paste transforms don't receive a view, so they upload
/// against the one remembered here.
#[derive(Debug, Clone)]
pub struct InteractionContext<V> {
    view: Option<V>,
}

impl<V> Default for InteractionContext<V> {
    fn default() -> Self {
        Self { view: None }
    }
}

impl<V: EditorView> InteractionContext<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `view` as the active one.
    pub fn bind(&mut self, view: &V) {
        self.view = Some(view.clone());
    }

    pub fn active(&self) -> Option<&V> {
        self.view.as_ref()
    }

    pub fn clear(&mut self) {
        self.view = None;
    }
}

/// Image upload event handlers bound to one configuration.
#[derive(Debug, Clone)]
pub struct ImageUploader<V> {
    uploader: Uploader<V>,
}

impl<V: EditorView> ImageUploader<V> {
    pub fn new(config: Config<V>) -> Self {
        Self {
            uploader: Uploader::new(config),
        }
    }

    pub fn uploader(&self) -> &Uploader<V> {
        &self.uploader
    }

    /// Paste handler.
    ///
    /// Declines any paste carrying HTML, leaving it to the structural
    /// transform. Otherwise uploads the first accepted file at the start of
    /// the selection and claims the paste; without one the paste falls
    /// through, as does a paste whose placeholder couldn't be inserted.
    pub fn handle_paste(&self, ctx: &mut InteractionContext<V>, view: &V, items: &[ClipboardItem]) -> bool {
        ctx.bind(view);
        if clipboard::has_html(items) {
            tracing::debug!("paste carries html, leaving it to the paste transform");
            return false;
        }

        let config = self.uploader.config();
        let Some(file) = clipboard::first_accepted_file(items, |mime| config.accepts(mime)) else {
            return false;
        };

        let at = view.read(|state| state.selection().from());
        match self.uploader.upload_image(view, file, at) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "could not insert pasted image");
                false
            }
        }
    }

    /// Drop handler.
    ///
    /// Needs at least one file and a drop point inside the document. Every
    /// accepted file gets its own placeholder at consecutive positions from
    /// the drop point. Once the point resolves the drop is claimed, even if
    /// no file had an accepted type.
    pub fn handle_drop(&self, ctx: &mut InteractionContext<V>, view: &V, event: DropEvent) -> bool {
        ctx.bind(view);
        if !event.has_files() {
            return false;
        }
        let Some(pos) = view.pos_at_coords(event.coords) else {
            tracing::debug!(coords = ?event.coords, "drop outside the document");
            return false;
        };

        let handles = self.uploader.upload_files(view, event.files, pos);
        tracing::debug!(pos, uploads = handles.len(), "handled drop");
        true
    }

    /// Keydown hook. Marks `view` active and never claims the event.
    pub fn handle_keydown(&self, ctx: &mut InteractionContext<V>, view: &V) -> bool {
        ctx.bind(view);
        false
    }

    /// Focus hook. Marks `view` active and never claims the event.
    pub fn handle_focus(&self, ctx: &mut InteractionContext<V>, view: &V) -> bool {
        ctx.bind(view);
        false
    }

    /// Rewrite pasted content before the host inserts it.
    ///
    /// Every image with a string `src` becomes a placeholder carrying the
    /// pasted display attributes. The sources are captured as URL uploads
    /// against the active view; the host starts them with
    /// [`PastedUploads::start`] once the rewritten slice is in the document.
    /// Without an active view the slice passes through untouched.
    pub fn transform_pasted(&self, ctx: &InteractionContext<V>, slice: Slice) -> (Slice, PastedUploads<V>) {
        let Some(view) = ctx.active() else {
            tracing::debug!("no active view, pasted images left as they are");
            return (slice, PastedUploads::none(self.uploader.clone()));
        };

        let mut pending: Vec<(UploadId, SmolStr)> = Vec::new();
        let slice = paste::replace_images(slice, |image, src| {
            let placeholder = self.uploader.create_placeholder(image.attrs());
            pending.push((placeholder.upload_id, SmolStr::new(src)));
            placeholder.node
        });

        let uploads = PastedUploads {
            uploader: self.uploader.clone(),
            view: Some(view.clone()),
            pending,
        };
        (slice, uploads)
    }

    /// Programmatic upload of one item or many at the selection start.
    pub async fn request_upload(&self, view: &V, items: impl Into<UploadItems>) -> Vec<UploadHandle> {
        self.uploader.request_upload(view, items).await
    }
}

/// Uploads captured while rewriting pasted content.
///
/// Nothing resolves until [`Self::start`] runs, so the placeholders must be
/// committed to the view first.
#[must_use = "pasted placeholders stay pending until their uploads are started"]
#[derive(Debug)]
pub struct PastedUploads<V> {
    uploader: Uploader<V>,
    view: Option<V>,
    pending: Vec<(UploadId, SmolStr)>,
}

impl<V: EditorView> PastedUploads<V> {
    fn none(uploader: Uploader<V>) -> Self {
        Self {
            uploader,
            view: None,
            pending: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Identifiers of the placeholders in the rewritten slice, in document order.
    pub fn upload_ids(&self) -> impl Iterator<Item = &UploadId> {
        self.pending.iter().map(|(upload_id, _)| upload_id)
    }

    /// Start resolving every captured source.
    pub fn start(self) -> Vec<UploadHandle> {
        let Some(view) = self.view else {
            return Vec::new();
        };
        tracing::debug!(count = self.pending.len(), "starting pasted uploads");
        self.pending
            .into_iter()
            .map(|(upload_id, src)| self.uploader.upload_for_id(&view, UploadSource::Url(src), upload_id))
            .collect()
    }
}
