//! Drag-and-drop events.

use weaver_upload_core::{Coords, FileHandle};

/// Files dropped onto the editor and where the pointer was.
#[derive(Clone, Debug, PartialEq)]
pub struct DropEvent {
    pub files: Vec<FileHandle>,
    pub coords: Coords,
}

impl DropEvent {
    pub fn new(files: Vec<FileHandle>, coords: Coords) -> Self {
        Self { files, coords }
    }

    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }
}
