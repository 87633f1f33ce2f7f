//! File type detection.
//!
//! Files are classified by their leading bytes, not by their name. The file
//! extension is only consulted for formats without a signature (Markdown)
//! and to tell legacy Word documents apart from other OLE compound files.

use std::path::Path;

use tokio::io::AsyncReadExt;
use tracing::trace;

use crate::error::{PageCatError, Result};

/// Number of leading bytes inspected when sniffing.
pub const SNIFF_LEN: usize = 8 * 1024;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const CFB_SIGNATURE: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Kind of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileKind {
    /// PDF document.
    Pdf,
    /// JPEG image.
    Jpeg,
    /// PNG image.
    Png,
    /// Markdown text.
    Markdown,
    /// Microsoft Word document (`.docx`, or `.doc` by extension).
    WordDocument,
    /// GIF image.
    Gif,
    /// BMP image.
    Bmp,
    /// TIFF image.
    Tiff,
    /// WebP image.
    Webp,
    /// Generic ZIP archive.
    Zip,
    /// Generic OLE compound file.
    Cfb,
}

impl FileKind {
    /// MIME type of this kind.
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Markdown => "text/markdown",
            Self::WordDocument => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Webp => "image/webp",
            Self::Zip => "application/zip",
            Self::Cfb => "application/x-cfb",
        }
    }

    /// Canonical file extension of this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Markdown => "md",
            Self::WordDocument => "docx",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tif",
            Self::Webp => "webp",
            Self::Zip => "zip",
            Self::Cfb => "cfb",
        }
    }

    /// Whether the merge engine can append this kind without preprocessing.
    pub fn is_mergeable(&self) -> bool {
        matches!(self, Self::Pdf | Self::Jpeg | Self::Png)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime())
    }
}

/// Classify a buffer by its magic bytes alone.
pub fn sniff(bytes: &[u8]) -> Option<FileKind> {
    let kind = if bytes.starts_with(b"%PDF-") {
        FileKind::Pdf
    } else if bytes.starts_with(b"\xFF\xD8\xFF") {
        FileKind::Jpeg
    } else if bytes.starts_with(PNG_SIGNATURE) {
        FileKind::Png
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        FileKind::Gif
    } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
        FileKind::Tiff
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        FileKind::Webp
    } else if bytes.starts_with(ZIP_SIGNATURE) {
        if contains(bytes, b"word/") {
            FileKind::WordDocument
        } else {
            FileKind::Zip
        }
    } else if bytes.starts_with(CFB_SIGNATURE) {
        FileKind::Cfb
    } else if bytes.len() >= 14 && bytes.starts_with(b"BM") && bytes[6..10] == [0; 4] {
        FileKind::Bmp
    } else {
        return None;
    };

    Some(kind)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Classify a file from its sniffed prefix and its name.
pub fn classify_bytes(path: &Path, prefix: &[u8]) -> Option<FileKind> {
    let ext = extension_of(path);

    match sniff(prefix) {
        Some(FileKind::Cfb) if ext.as_deref() == Some("doc") => Some(FileKind::WordDocument),
        Some(kind) => Some(kind),
        None => match ext.as_deref() {
            Some("md" | "markdown") => Some(FileKind::Markdown),
            _ => None,
        },
    }
}

/// Detect the kind of the file at `path`.
///
/// Returns `Ok(None)` when the type cannot be determined.
///
/// # Errors
///
/// Returns an error if the file does not exist, is a directory, or cannot be
/// read.
pub async fn classify(path: &Path) -> Result<Option<FileKind>> {
    let mut file = tokio::fs::File::open(path).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            PageCatError::file_not_found(path.to_path_buf())
        } else {
            PageCatError::FileNotAccessible {
                path: path.to_path_buf(),
                source: err,
            }
        }
    })?;

    let metadata = file.metadata().await?;
    if metadata.is_dir() {
        return Err(PageCatError::not_a_file(path.to_path_buf()));
    }

    let mut prefix = Vec::with_capacity(SNIFF_LEN);
    (&mut file)
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut prefix)
        .await
        .map_err(|err| PageCatError::FileNotAccessible {
            path: path.to_path_buf(),
            source: err,
        })?;

    let kind = classify_bytes(path, &prefix);
    trace!(path = %path.display(), ?kind, "classified");

    Ok(kind)
}
