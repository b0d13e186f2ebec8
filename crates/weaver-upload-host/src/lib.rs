//! Host interaction layer for weaver image uploads.
//!
//! Binds host input (clipboard, drag and drop, keyboard and focus) to the
//! upload engine in `weaver-upload-core`.
//!
//! # Architecture
//!
//! - `clipboard`: clipboard entries and the HTML-sibling heuristic
//! - `paste`: rewriting images inside pasted fragments
//! - `drop`: drop events
//! - `plugin`: `ImageUploader`, the event hooks and `InteractionContext`
//! - `resolver`: data-URL and directory-backed resolvers
//!
//! # Re-exports
//!
//! This crate re-exports `weaver-upload-core` for convenience, so consumers
//! only need to depend on `weaver-upload-host`.

// Re-export core crate
pub use weaver_upload_core;
pub use weaver_upload_core::*;

pub mod clipboard;
pub mod drop;
pub mod paste;
pub mod plugin;
pub mod resolver;

pub use clipboard::ClipboardItem;
pub use drop::DropEvent;
pub use plugin::{ImageUploader, InteractionContext, PastedUploads};
pub use resolver::{DataUrlResolver, DirectoryResolver};
