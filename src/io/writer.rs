//! Serializing and writing the merged document.
//!
//! The document is serialized into memory before anything is written, so a
//! failing run never leaves partial output behind. File output goes through
//! a temporary file in the destination directory that is renamed over the
//! target once complete.
//!
//! # Examples
//!
//! ```no_run
//! use pagecat::io::writer::OutputSink;
//! use lopdf::Document;
//! use std::path::PathBuf;
//!
//! # async fn example(doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let sink = OutputSink::File(PathBuf::from("output.pdf"));
//! let stats = sink.write(doc).await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::task;
use tracing::debug;

use crate::error::{PageCatError, Result};
use crate::utils::format_file_size;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to serialize and write the document.
    pub write_time: Duration,

    /// Number of bytes written.
    pub file_size: u64,
}

impl WriteStatistics {
    /// Format the written size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Destination of the merged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// Write to a file, replacing it atomically.
    File(PathBuf),
    /// Write to standard output.
    Stdout,
}

impl OutputSink {
    /// Sink for an optional output path; `None` means standard output.
    pub fn from_output(output: Option<&Path>) -> Self {
        match output {
            Some(path) => Self::File(path.to_path_buf()),
            None => Self::Stdout,
        }
    }

    /// Human-readable name of the destination.
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Stdout => "<stdout>".to_string(),
        }
    }

    fn error_path(&self) -> PathBuf {
        match self {
            Self::File(path) => path.clone(),
            Self::Stdout => PathBuf::from("-"),
        }
    }

    /// Serialize `doc` and write it to the destination.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::FailedToWrite`] if serialization or writing
    /// fails. A file destination is left untouched in that case.
    pub async fn write(&self, doc: Document) -> Result<WriteStatistics> {
        let start = Instant::now();

        let bytes = task::spawn_blocking(move || serialize(doc))
            .await
            .map_err(|e| PageCatError::other(format!("Serialization task failed: {e}")))?
            .map_err(|source| PageCatError::FailedToWrite {
                path: self.error_path(),
                source,
            })?;

        let file_size = bytes.len() as u64;

        match self {
            Self::File(path) => {
                let path = path.clone();
                task::spawn_blocking(move || write_atomic(&path, &bytes))
                    .await
                    .map_err(|e| PageCatError::other(format!("Write task failed: {e}")))??;
            }
            Self::Stdout => write_stdout(&bytes).await?,
        }

        debug!(output = %self.describe(), bytes = file_size, "output written");

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size,
        })
    }
}

/// Serialize a document into a buffer.
///
/// # Errors
///
/// Returns the I/O error reported by `lopdf` while writing.
pub fn serialize(mut doc: Document) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(std::io::Error::other)?;
    Ok(buffer)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let failed = |source: std::io::Error| PageCatError::FailedToWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(failed)?;

    let mut file = NamedTempFile::new_in(parent).map_err(failed)?;
    file.write_all(bytes).map_err(failed)?;
    file.flush().map_err(failed)?;
    file.persist(path).map_err(|e| failed(e.error))?;

    Ok(())
}

async fn write_stdout(bytes: &[u8]) -> Result<()> {
    let failed = |source: std::io::Error| PageCatError::FailedToWrite {
        path: PathBuf::from("-"),
        source,
    };

    let mut stdout = tokio::io::stdout();
    stdout.write_all(bytes).await.map_err(failed)?;
    stdout.flush().await.map_err(failed)?;

    Ok(())
}
