//! Reading input files and parsing PDF documents.
//!
//! File content is always read fully into memory. Parsing happens on the
//! blocking pool, since `lopdf` is synchronous.

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PageCatError, Result};

/// A parsed PDF document with load metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Input path the document came from.
    pub origin: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to parse the document.
    pub load_time: Duration,
}

/// Read a file fully into memory.
///
/// # Errors
///
/// Returns [`PageCatError::FileNotFound`] for a missing file and
/// [`PageCatError::FileNotAccessible`] for any other read failure.
pub async fn read_to_buffer(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            PageCatError::file_not_found(path.to_path_buf())
        } else {
            PageCatError::FileNotAccessible {
                path: path.to_path_buf(),
                source: err,
            }
        }
    })
}

/// Parse PDF bytes.
///
/// Blocking; call it from `spawn_blocking`.
///
/// # Errors
///
/// Returns [`PageCatError::EncryptedPdf`] for encrypted documents and
/// [`PageCatError::FailedToLoadPdf`] for anything `lopdf` cannot parse.
pub fn load_pdf(bytes: &[u8], origin: &Path) -> Result<LoadedPdf> {
    let start = Instant::now();

    let document = Document::load_mem(bytes).map_err(|err| {
        let message = err.to_string();
        if message.contains("encrypt") || message.contains("password") {
            PageCatError::encrypted_pdf(origin.to_path_buf())
        } else {
            PageCatError::failed_to_load_pdf(origin.to_path_buf(), message)
        }
    })?;

    if document.trailer.get(b"Encrypt").is_ok() {
        return Err(PageCatError::encrypted_pdf(origin.to_path_buf()));
    }

    let page_count = document.get_pages().len();

    Ok(LoadedPdf {
        document,
        origin: origin.to_path_buf(),
        page_count,
        load_time: start.elapsed(),
    })
}
