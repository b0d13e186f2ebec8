//! Clipboard entries as handed over by the host.
//!
//! A paste carries one entry per representation the source application
//! offered. Browsers put a copied web image on the clipboard both as a file
//! and as an HTML snippet; when HTML is present the structural paste
//! transform owns the paste and the file entries are ignored.

use smol_str::SmolStr;
use weaver_upload_core::FileHandle;

/// MIME type of rich HTML clipboard content.
pub const HTML_MIME: &str = "text/html";

/// One clipboard entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClipboardItem {
    /// Declared MIME type of the entry
    pub mime_type: SmolStr,
    /// File payload, for entries that can be read as a file
    pub file: Option<FileHandle>,
}

impl ClipboardItem {
    /// A file entry; the MIME type is taken from the file.
    pub fn file(file: FileHandle) -> Self {
        Self {
            mime_type: file.mime_type.clone(),
            file: Some(file),
        }
    }

    /// An entry without a file payload (text, HTML, ...).
    pub fn data(mime_type: impl Into<SmolStr>) -> Self {
        Self {
            mime_type: mime_type.into(),
            file: None,
        }
    }

    pub fn is_html(&self) -> bool {
        self.mime_type == HTML_MIME
    }
}

/// Whether any entry is HTML.
pub fn has_html(items: &[ClipboardItem]) -> bool {
    items.iter().any(ClipboardItem::is_html)
}

/// The first entry with an accepted type that yields a file.
pub fn first_accepted_file(
    items: &[ClipboardItem],
    accepts: impl Fn(&str) -> bool,
) -> Option<FileHandle> {
    items
        .iter()
        .filter(|item| accepts(&item.mime_type))
        .find_map(|item| item.file.clone())
}
