//! In-flight record of one input file.

use std::path::{Path, PathBuf};

use crate::filetype::FileKind;

/// Position, location, content and kind of one input as it moves through
/// classification, preprocessing and merging.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDescriptor {
    /// Index of the file in the resolved order. Assigned once; replacements
    /// keep the number of the descriptor they replace.
    pub order_no: usize,

    /// Input path as given by the user, used in messages.
    pub origin: PathBuf,

    /// Where the bytes currently live. `None` once a preprocessor produced
    /// the content in memory.
    pub path: Option<PathBuf>,

    /// File content, once read or produced.
    pub content: Option<Vec<u8>>,

    /// Detected kind, once classified.
    pub kind: Option<FileKind>,
}

impl FileDescriptor {
    /// Create a descriptor for an input path that has not been classified yet.
    pub fn new(order_no: usize, origin: impl Into<PathBuf>) -> Self {
        let origin = origin.into();
        Self {
            order_no,
            path: Some(origin.clone()),
            origin,
            content: None,
            kind: None,
        }
    }

    /// Set the detected kind.
    pub fn with_kind(mut self, kind: Option<FileKind>) -> Self {
        self.kind = kind;
        self
    }

    /// Replacement backed by a file produced from `self`.
    pub fn replaced_by_file(&self, path: PathBuf, kind: FileKind) -> Self {
        Self {
            order_no: self.order_no,
            origin: self.origin.clone(),
            path: Some(path),
            content: None,
            kind: Some(kind),
        }
    }

    /// Replacement backed by content produced in memory from `self`.
    pub fn replaced_by_content(&self, content: Vec<u8>, kind: FileKind) -> Self {
        Self {
            order_no: self.order_no,
            origin: self.origin.clone(),
            path: None,
            content: Some(content),
            kind: Some(kind),
        }
    }

    /// Path to read the bytes from.
    pub fn source_path(&self) -> &Path {
        self.path.as_deref().unwrap_or(&self.origin)
    }
}
