//! Upload coordinator.
//!
//! Drives one upload through its lifecycle: the placeholder goes into the
//! document synchronously, the resolver runs on a spawned task, and once it
//! settles the placeholder is found again by identifier and rewritten with
//! the result. Settlement never holds the view across an await and never
//! creates an undo step.

use std::fmt;
use std::sync::Arc;

use n0_future::task::{JoinError, JoinHandle};
use smol_str::SmolStr;

use crate::config::Config;
use crate::document::DocumentTree;
use crate::error::{DocumentError, UploadFailure};
use crate::locate::{self, LocatedNode};
use crate::node::{Attrs, Node};
use crate::placeholder::{self, PendingInsertion};
use crate::types::{UploadId, UploadSource};
use crate::view::EditorView;

/// Lifecycle of a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    /// Identifier assigned, placeholder not yet in the document.
    Created,
    /// Placeholder inserted, resolver not yet called.
    Inserted,
    /// Waiting on the resolver.
    Resolving,
    /// Done, one way or another.
    Settled(Settlement),
}

/// What settlement did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The matching placeholders were rewritten.
    Applied { nodes: usize },
    /// No placeholder in the document carried the identifier any more; the
    /// document is unchanged.
    Skipped,
    /// The `on_resolved` hook claimed the result; nothing changed.
    OverriddenByCaller,
}

/// Outcome of one upload, sent on the report channel and returned by
/// [`UploadHandle::settled`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub upload_id: UploadId,
    pub settlement: Settlement,
    pub outcome: Result<SmolStr, UploadFailure>,
}

impl UploadReport {
    /// The resolved URI, if the upload succeeded.
    pub fn uri(&self) -> Option<&str> {
        self.outcome.as_ref().ok().map(SmolStr::as_str)
    }
}

impl fmt::Display for UploadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let settlement = match self.settlement {
            Settlement::Applied { nodes } => format!("applied to {nodes} node(s)"),
            Settlement::Skipped => "skipped".to_string(),
            Settlement::OverriddenByCaller => "handled by caller".to_string(),
        };
        match &self.outcome {
            Ok(uri) => write!(f, "{}: {settlement}, {uri}", self.upload_id),
            Err(failure) => write!(f, "{}: {settlement}, {failure}", self.upload_id),
        }
    }
}

/// Bookkeeping for one upload, owned by the task running it.
#[derive(Debug)]
pub struct UploadTask {
    pub upload_id: UploadId,
    pub source: UploadSource,
    /// Where the placeholder was requested; None when the caller placed it.
    pub target_offset: Option<usize>,
    state: UploadState,
}

impl UploadTask {
    pub fn new(upload_id: UploadId, source: UploadSource, target_offset: Option<usize>) -> Self {
        Self {
            upload_id,
            source,
            target_offset,
            state: UploadState::Created,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    fn advance(&mut self, next: UploadState) {
        tracing::debug!(upload_id = %self.upload_id, from = ?self.state, to = ?next, "upload state");
        self.state = next;
    }
}

/// Handle to a spawned upload.
///
/// Dropping it detaches the upload; it still settles.
#[derive(Debug)]
pub struct UploadHandle {
    upload_id: UploadId,
    task: JoinHandle<UploadReport>,
}

impl UploadHandle {
    pub fn upload_id(&self) -> &UploadId {
        &self.upload_id
    }

    /// Wait for the upload to settle.
    pub async fn settled(self) -> Result<UploadReport, JoinError> {
        self.task.await
    }
}

/// The upload engine bound to one configuration.
pub struct Uploader<V> {
    config: Arc<Config<V>>,
}

impl<V> Clone for Uploader<V> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
        }
    }
}

impl<V> fmt::Debug for Uploader<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uploader").field("config", &self.config).finish()
    }
}

impl<V: EditorView> Uploader<V> {
    pub fn new(config: Config<V>) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config<V> {
        &self.config
    }

    /// Build a placeholder with a fresh identifier, keeping `display_attrs`.
    pub fn create_placeholder(&self, display_attrs: &Attrs) -> PendingInsertion {
        let upload_id = self.config.generate_id();
        let node = placeholder::create_placeholder(
            &self.config.settings().placeholder_src,
            &upload_id,
            display_attrs,
        );
        PendingInsertion { upload_id, node }
    }

    /// Insert a placeholder at `at` and start resolving `source`.
    ///
    /// A non-empty selection is deleted in the same transaction and `at` is
    /// mapped through that deletion. Fails without spawning anything if the
    /// placeholder can't be placed.
    pub fn upload_image(
        &self,
        view: &V,
        source: impl Into<UploadSource>,
        at: usize,
    ) -> Result<UploadHandle, DocumentError> {
        self.place(view, source.into(), at).map(|(handle, _)| handle)
    }

    /// Like [`Self::upload_image`], also returning the position the
    /// placeholder landed at.
    pub(crate) fn place(
        &self,
        view: &V,
        source: UploadSource,
        at: usize,
    ) -> Result<(UploadHandle, usize), DocumentError> {
        let pending = self.create_placeholder(&Attrs::new());
        let mut task = UploadTask::new(pending.upload_id.clone(), source, Some(at));

        let pos = view.update(|state| -> Result<usize, DocumentError> {
            let mut tr = state.transaction();
            tr.delete_selection()?;
            let pos = tr.map(at);
            tr.insert(pos, pending.node)?;
            state.apply(tr)?;
            Ok(pos)
        })?;
        task.advance(UploadState::Inserted);

        Ok((self.spawn(view, task), pos))
    }

    /// Start resolving `source` for a placeholder the caller already placed.
    pub fn upload_for_id(&self, view: &V, source: impl Into<UploadSource>, upload_id: UploadId) -> UploadHandle {
        let mut task = UploadTask::new(upload_id, source.into(), None);
        task.advance(UploadState::Inserted);
        self.spawn(view, task)
    }

    fn spawn(&self, view: &V, task: UploadTask) -> UploadHandle {
        let upload_id = task.upload_id.clone();
        let task = n0_future::task::spawn(self.clone().run(view.clone(), task));
        UploadHandle { upload_id, task }
    }

    #[tracing::instrument(skip_all, fields(upload_id = %task.upload_id, source = task.source.label()))]
    async fn run(self, view: V, mut task: UploadTask) -> UploadReport {
        task.advance(UploadState::Resolving);
        let result = self.config.resolver().resolve(task.source.clone()).await;

        let outcome = match result {
            Ok(uri) if uri.is_empty() => Err(UploadFailure::EmptyResult),
            Ok(uri) => Ok(uri),
            Err(e) => Err(UploadFailure::Rejected(e)),
        };
        if let Err(failure) = &outcome {
            tracing::warn!(error = %failure, "image upload failed");
        }

        let uri = outcome.as_ref().ok().map(SmolStr::as_str);
        let settlement = self.reconcile(&view, &task.upload_id, uri);
        task.advance(UploadState::Settled(settlement));

        let report = UploadReport {
            upload_id: task.upload_id,
            settlement,
            outcome,
        };
        self.config.report(&report);
        report
    }

    /// Apply a resolution result to every placeholder tagged with `upload_id`.
    ///
    /// Nodes are re-located under the view lock right before the write; the
    /// `on_resolved` hook runs with the lock released. Placeholders sitting in
    /// stored history states are settled too, even when the current document
    /// no longer holds one, so undo and redo never bring a pending one back.
    pub fn reconcile(&self, view: &V, upload_id: &UploadId, uri: Option<&str>) -> Settlement {
        let found: Vec<LocatedNode> = view.read(|state| locate::find_by_id(state.doc(), upload_id));
        if !found.is_empty() {
            if let Some(hook) = self.config.resolved_hook() {
                if hook(view, found.as_slice(), uri) {
                    return Settlement::OverriddenByCaller;
                }
            }
        }

        let applied = view.update(|state| -> Result<usize, DocumentError> {
            let found = locate::find_by_id(state.doc(), upload_id);
            if !found.is_empty() {
                let mut tr = state.transaction();
                tr.without_history();
                for located in &found {
                    tr.replace_attrs(located.pos, placeholder::resolved_attrs(located.node.attrs(), uri))?;
                }
                state.apply(tr)?;
            }

            let stored = state.rewrite_history(&mut |node: &Node| {
                locate::matches_id(node, upload_id).then(|| placeholder::resolved_attrs(node.attrs(), uri))
            });
            if stored > 0 {
                tracing::debug!(%upload_id, nodes = stored, "settled placeholders in history");
            }
            Ok(found.len())
        });

        match applied {
            Ok(0) => {
                tracing::debug!(%upload_id, "placeholder gone, document left alone");
                Settlement::Skipped
            }
            Ok(nodes) => Settlement::Applied { nodes },
            Err(e) => {
                tracing::warn!(%upload_id, error = %e, "could not update placeholder");
                Settlement::Skipped
            }
        }
    }
}
