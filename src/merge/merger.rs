//! Core merging implementation.
//!
//! Reading and decoding run concurrently through the [`TaskRunner`]; pages
//! are then assembled strictly in descriptor order. Every image becomes one
//! A4 page. Every PDF contributes its whole page tree, grafted under the
//! root of the result so inherited resources and media boxes survive.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, instrument};

use crate::config::{Config, FitMode};
use crate::descriptor::FileDescriptor;
use crate::error::{PageCatError, Result};
use crate::filetype::FileKind;
use crate::io::{LoadedPdf, load_pdf, read_to_buffer};
use crate::merge::image::{EmbeddedImage, add_image_page, prepare_image};
use crate::output::OutputFormatter;
use crate::utils::{TaskRunner, format_file_size};

/// Statistics about a merge operation.
#[derive(Debug, Clone, Default)]
pub struct MergeStatistics {
    /// Number of inputs that contributed pages.
    pub files_merged: usize,

    /// Number of inputs skipped for their type.
    pub files_skipped: usize,

    /// Number of images placed on their own page.
    pub images_embedded: usize,

    /// Number of PDF documents copied.
    pub documents_copied: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total size of the merged inputs in bytes.
    pub input_size: u64,

    /// Time taken to read and decode all inputs.
    pub load_time: Duration,

    /// Total time taken for the merge.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }
}

/// Result of a merge operation.
pub struct MergeResult {
    /// The merged PDF document.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

enum Payload {
    Image(EmbeddedImage),
    Pdf(LoadedPdf),
    Unsupported(Option<FileKind>),
}

struct PreparedItem {
    origin: PathBuf,
    size: u64,
    payload: Payload,
}

/// Combines images and PDF documents into one document.
#[derive(Debug, Clone)]
pub struct Merger {
    /// Runner bounding concurrent reads and decodes.
    runner: TaskRunner,

    /// Placement of images on their pages.
    fit: FitMode,
}

impl Merger {
    /// Create a merger.
    pub fn new(runner: TaskRunner, fit: FitMode) -> Self {
        Self { runner, fit }
    }

    /// Create a merger from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(TaskRunner::new(config.effective_jobs()), config.image_fit)
    }

    /// Merge `descriptors` in order into a new document.
    ///
    /// Descriptors whose kind cannot be merged are reported and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an input cannot be read or decoded, or
    /// [`PageCatError::NoFilesToMerge`] if nothing could be merged.
    #[instrument(skip_all, fields(files = descriptors.len()))]
    pub async fn merge(
        &self,
        mut descriptors: Vec<FileDescriptor>,
        formatter: &OutputFormatter,
    ) -> Result<MergeResult> {
        let merge_start = Instant::now();
        descriptors.sort_by_key(|d| d.order_no);

        let load_start = Instant::now();
        let items = self.runner.try_map(descriptors, prepare_item).await?;
        let load_time = load_start.elapsed();

        let mut statistics = MergeStatistics {
            load_time,
            ..Default::default()
        };

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::with_capacity(items.len());
        let mut page_count: i64 = 0;

        for item in items {
            match item.payload {
                Payload::Image(image) => {
                    let page_id = add_image_page(&mut doc, pages_id, image, self.fit)?;
                    kids.push(page_id.into());
                    page_count += 1;
                    statistics.images_embedded += 1;
                }
                Payload::Pdf(loaded) => {
                    formatter.debug(&format!(
                        "{}: {} page(s), parsed in {:.3}s",
                        loaded.origin.display(),
                        loaded.page_count,
                        loaded.load_time.as_secs_f64()
                    ));
                    let (node_id, count) = append_document(&mut doc, pages_id, loaded.document)?;
                    kids.push(node_id.into());
                    page_count += count;
                    statistics.documents_copied += 1;
                }
                Payload::Unsupported(kind) => {
                    let reason = match kind {
                        Some(kind) => format!("unsupported file type ({kind})"),
                        None => "unknown file type".to_string(),
                    };
                    formatter.skip(&item.origin, &reason);
                    statistics.files_skipped += 1;
                    continue;
                }
            }

            statistics.files_merged += 1;
            statistics.input_size += item.size;
        }

        if statistics.files_merged == 0 {
            return Err(PageCatError::NoFilesToMerge);
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc.prune_objects();
        doc.renumber_objects();
        doc.compress();

        statistics.total_pages = doc.get_pages().len();
        statistics.merge_time = merge_start.elapsed();

        debug!(
            pages = statistics.total_pages,
            merged = statistics.files_merged,
            skipped = statistics.files_skipped,
            "merge finished"
        );

        Ok(MergeResult {
            document: doc,
            statistics,
        })
    }
}

/// Read a descriptor's bytes if needed and decode them off the runtime.
async fn prepare_item(descriptor: FileDescriptor) -> Result<PreparedItem> {
    let FileDescriptor {
        origin,
        path,
        content,
        kind,
        ..
    } = descriptor;

    let Some(kind) = kind.filter(FileKind::is_mergeable) else {
        return Ok(PreparedItem {
            origin,
            size: 0,
            payload: Payload::Unsupported(kind),
        });
    };

    let bytes = match content {
        Some(bytes) => bytes,
        None => read_to_buffer(path.as_deref().unwrap_or(&origin)).await?,
    };
    let size = bytes.len() as u64;

    let decode_origin = origin.clone();
    let payload = task::spawn_blocking(move || match kind {
        FileKind::Pdf => load_pdf(&bytes, &decode_origin).map(Payload::Pdf),
        _ => prepare_image(kind, &bytes, &decode_origin).map(Payload::Image),
    })
    .await
    .map_err(|e| PageCatError::other(format!("Decode task failed: {e}")))??;

    Ok(PreparedItem {
        origin,
        size,
        payload,
    })
}

/// Move every object of `source` into `target` and hang its page tree under
/// `parent`.
///
/// Returns the id of the grafted page tree node and its page count.
fn append_document(
    target: &mut Document,
    parent: ObjectId,
    mut source: Document,
) -> Result<(ObjectId, i64)> {
    // Avoid object id collisions by renumbering the incoming document
    source.renumber_objects_with(target.max_id + 1);

    let catalog_id = source.trailer.get(b"Root")?.as_reference()?;
    let node_id = source
        .get_object(catalog_id)?
        .as_dict()?
        .get(b"Pages")?
        .as_reference()?;
    let count = source.get_pages().len() as i64;

    // The source catalog (outlines, forms, names) is not carried over.
    source.objects.remove(&catalog_id);

    let node = source.get_object_mut(node_id)?.as_dict_mut()?;
    node.set("Parent", parent);
    node.set("Count", count);

    target.max_id = target.max_id.max(source.max_id);
    target.objects.extend(source.objects);

    Ok((node_id, count))
}
