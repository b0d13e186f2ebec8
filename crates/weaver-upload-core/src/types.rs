//! Core types: selection, screen coordinates, upload identifiers and sources.
//!
//! These types are framework-agnostic and shared by the document model, the
//! upload engine and the host adapter.

use std::fmt;
use std::ops::Range;

use bytes::Bytes;
use smol_str::SmolStr;

/// Document selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `from()` and `to()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is empty (cursor only).
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.from()..self.to()
    }
}

/// Viewport coordinates of a pointer event, as reported by the host.
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct Coords {
    pub left: f64,
    pub top: f64,
}

impl Coords {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Opaque token correlating a placeholder with its eventual resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploadId(SmolStr);

impl UploadId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UploadId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<UploadId> for SmolStr {
    fn from(id: UploadId) -> Self {
        id.0
    }
}

/// A file handed over by the host (clipboard entry, dropped file, file picker).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHandle {
    /// The filename as reported by the host
    pub name: SmolStr,
    /// Declared MIME type
    pub mime_type: SmolStr,
    /// Raw file bytes
    pub data: Bytes,
}

impl FileHandle {
    pub fn new(name: impl Into<SmolStr>, mime_type: impl Into<SmolStr>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// What the resolver is asked to turn into a final URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadSource {
    File(FileHandle),
    Url(SmolStr),
}

impl UploadSource {
    /// Short human-readable label for logs.
    pub fn label(&self) -> &str {
        match self {
            UploadSource::File(file) => file.name.as_str(),
            UploadSource::Url(url) => url.as_str(),
        }
    }
}

impl From<FileHandle> for UploadSource {
    fn from(file: FileHandle) -> Self {
        UploadSource::File(file)
    }
}

impl From<&str> for UploadSource {
    fn from(url: &str) -> Self {
        UploadSource::Url(url.into())
    }
}

impl From<SmolStr> for UploadSource {
    fn from(url: SmolStr) -> Self {
        UploadSource::Url(url)
    }
}

/// One item or an ordered collection of items to upload.
///
/// Programmatic upload requests accept either shape; both are normalized to
/// an ordered sequence before dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadItems {
    One(UploadSource),
    Many(Vec<UploadSource>),
}

impl UploadItems {
    /// Normalize into an ordered sequence.
    pub fn into_vec(self) -> Vec<UploadSource> {
        match self {
            UploadItems::One(source) => vec![source],
            UploadItems::Many(sources) => sources,
        }
    }
}

impl From<UploadSource> for UploadItems {
    fn from(source: UploadSource) -> Self {
        UploadItems::One(source)
    }
}

impl From<FileHandle> for UploadItems {
    fn from(file: FileHandle) -> Self {
        UploadItems::One(UploadSource::File(file))
    }
}

impl From<&str> for UploadItems {
    fn from(url: &str) -> Self {
        UploadItems::One(UploadSource::Url(url.into()))
    }
}

impl From<Vec<UploadSource>> for UploadItems {
    fn from(sources: Vec<UploadSource>) -> Self {
        UploadItems::Many(sources)
    }
}

impl From<Vec<FileHandle>> for UploadItems {
    fn from(files: Vec<FileHandle>) -> Self {
        UploadItems::Many(files.into_iter().map(UploadSource::File).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_bounds() {
        let sel = Selection::new(7, 3);
        assert_eq!(sel.from(), 3);
        assert_eq!(sel.to(), 7);
        assert!(!sel.is_empty());
        assert_eq!(sel.to_range(), 3..7);
        assert!(Selection::collapsed(4).is_empty());
    }

    #[test]
    fn test_upload_items_normalize() {
        let one = UploadItems::from("https://example.com/a.png");
        assert_eq!(one.into_vec().len(), 1);

        let files = vec![
            FileHandle::new("a.png", "image/png", vec![1u8]),
            FileHandle::new("b.png", "image/png", vec![2u8]),
        ];
        let many = UploadItems::from(files);
        let sources = many.into_vec();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[1].label(), "b.png");
    }
}
