//! Preprocessing of inputs that must become PDFs before merging.
//!
//! Two preprocessors exist:
//! - [`LegacyDocumentConverter`] for Word documents (Windows only)
//! - [`MarkdownRenderer`] for Markdown text
//!
//! Descriptors are grouped by kind and every preprocessor receives its whole
//! group as one batch. Batches run concurrently; the replacements they return
//! are spliced back into the input order with [`splice`].

pub mod layout;
pub mod legacy;
pub mod markdown;

pub use legacy::LegacyDocumentConverter;
pub use markdown::MarkdownRenderer;

use futures::future::join_all;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::descriptor::FileDescriptor;
use crate::error::Result;
use crate::filetype::FileKind;

/// A preprocessor turning one kind of input into PDF.
#[derive(Debug, Clone)]
pub enum Preprocessor {
    /// Word documents through the external converter.
    LegacyDocument(LegacyDocumentConverter),
    /// Markdown rendered in process.
    Markdown(MarkdownRenderer),
}

impl Preprocessor {
    /// The kind this preprocessor accepts.
    pub fn handles(&self) -> FileKind {
        match self {
            Self::LegacyDocument(_) => FileKind::WordDocument,
            Self::Markdown(_) => FileKind::Markdown,
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LegacyDocument(_) => "legacy-document",
            Self::Markdown(_) => "markdown",
        }
    }

    /// Convert a batch of descriptors of the handled kind.
    ///
    /// # Errors
    ///
    /// Propagates the preprocessor's failure.
    pub async fn apply(&self, batch: Vec<FileDescriptor>) -> Result<Vec<FileDescriptor>> {
        match self {
            Self::LegacyDocument(converter) => converter.apply(batch).await,
            Self::Markdown(renderer) => renderer.apply(batch).await,
        }
    }
}

/// The set of preprocessors used by a run.
#[derive(Debug, Clone)]
pub struct PreprocessorRegistry {
    preprocessors: Vec<Preprocessor>,
}

impl PreprocessorRegistry {
    /// Registry with the given preprocessors.
    pub fn new(preprocessors: Vec<Preprocessor>) -> Self {
        Self { preprocessors }
    }

    /// Registry with both preprocessors configured from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(vec![
            Preprocessor::LegacyDocument(LegacyDocumentConverter::new(config.converter_timeout)),
            Preprocessor::Markdown(MarkdownRenderer::new()),
        ])
    }

    /// Run every preprocessor on the descriptors of its kind.
    ///
    /// Returns the replacements of all batches. Descriptors of other kinds
    /// are left alone. If any batch fails, temp files already produced by the
    /// other batches are removed before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first batch failure.
    #[instrument(skip_all, fields(files = descriptors.len()))]
    pub async fn run(&self, descriptors: &[FileDescriptor]) -> Result<Vec<FileDescriptor>> {
        let mut by_kind: HashMap<FileKind, Vec<FileDescriptor>> = HashMap::new();
        for descriptor in descriptors {
            if let Some(kind) = descriptor.kind {
                by_kind.entry(kind).or_default().push(descriptor.clone());
            }
        }

        let batches = self.preprocessors.iter().filter_map(|preprocessor| {
            let batch = by_kind.remove(&preprocessor.handles())?;
            debug!(
                preprocessor = preprocessor.name(),
                files = batch.len(),
                "running preprocessor"
            );
            Some(preprocessor.apply(batch))
        });
        let results = join_all(batches.collect::<Vec<_>>()).await;

        let mut replacements = Vec::new();
        let mut failure = None;
        for result in results {
            match result {
                Ok(batch) => replacements.extend(batch),
                Err(err) if failure.is_none() => failure = Some(err),
                Err(err) => warn!(error = %err, "additional preprocessor failure"),
            }
        }

        if let Some(err) = failure {
            drop(TempFileGuard::from_descriptors(&replacements));
            return Err(err);
        }

        Ok(replacements)
    }
}

/// Replace descriptors by their replacements, matched on `order_no`.
///
/// The result is ordered by `order_no`.
pub fn splice(
    descriptors: Vec<FileDescriptor>,
    replacements: Vec<FileDescriptor>,
) -> Vec<FileDescriptor> {
    let mut by_order: HashMap<usize, FileDescriptor> = replacements
        .into_iter()
        .map(|r| (r.order_no, r))
        .collect();

    let mut spliced: Vec<FileDescriptor> = descriptors
        .into_iter()
        .map(|d| by_order.remove(&d.order_no).unwrap_or(d))
        .collect();
    spliced.sort_by_key(|d| d.order_no);
    spliced
}

/// Removes temporary files when dropped.
///
/// Files are removed whether the merge succeeded, failed or was cancelled.
/// Removal failures are logged.
#[derive(Debug, Default)]
pub struct TempFileGuard {
    paths: Vec<PathBuf>,
}

impl TempFileGuard {
    /// Guard the given paths.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Guard the files backing preprocessor replacements.
    ///
    /// Replacements holding in-memory content have no file to remove.
    pub fn from_descriptors(replacements: &[FileDescriptor]) -> Self {
        Self::new(
            replacements
                .iter()
                .filter_map(|r| r.path.clone())
                .collect(),
        )
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "removed temp file"),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to remove temp file")
                }
            }
        }
    }
}
