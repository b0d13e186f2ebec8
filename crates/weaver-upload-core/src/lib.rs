//! weaver-upload-core: placeholder lifecycle for async image uploads.
//!
//! This crate provides:
//! - `Node`, `Transaction`, `EditorState` - a small rich-text document model
//!   with position mapping and undo history
//! - `EditorView` trait and the `SharedView` reference view
//! - `Uploader<V>` - inserts placeholders, runs the resolver and reconciles
//!   results by upload identifier
//! - `Config` / `UploadSettings` - resolver, identifier generation, hooks

pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod id;
pub mod locate;
pub mod node;
pub mod placeholder;
pub mod transaction;
pub mod types;
pub mod undo;
pub mod upload;
pub mod view;

pub use config::{Config, DEFAULT_ACCEPTED_TYPES, DEFAULT_PLACEHOLDER_SRC, Resolver, UploadSettings};
pub use document::{DocumentTree, EditorState};
pub use error::{DocumentError, ResolveError, SettingsError, UploadFailure};
pub use locate::{LocatedNode, find_by_id, pending_ids};
pub use node::{
    ATTR_ERROR, ATTR_SRC, ATTR_UPLOAD_ID, AttrValue, Attrs, Fragment, Node, NodeId, NodeKind, Slice,
};
pub use placeholder::PendingInsertion;
pub use smol_str::SmolStr;
pub use transaction::Transaction;
pub use types::{Coords, FileHandle, Selection, UploadId, UploadItems, UploadSource};
pub use undo::{History, UndoManager};
pub use upload::{Settlement, UploadHandle, UploadReport, UploadState, UploadTask, Uploader};
pub use view::{EditorView, SharedView};
