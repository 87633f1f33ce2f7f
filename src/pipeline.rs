//! The end-to-end concatenation run.
//!
//! Inputs are expanded and ordered, classified concurrently, preprocessed,
//! merged and finally written out. Temp files created by preprocessors are
//! removed when the run ends, however it ends.

use std::path::PathBuf;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::descriptor::FileDescriptor;
use crate::error::{PageCatError, Result};
use crate::filetype::classify;
use crate::io::{OutputSink, WriteStatistics};
use crate::merge::{MergeStatistics, Merger};
use crate::order::{ReorderPrompt, resolve_order};
use crate::output::OutputFormatter;
use crate::preprocess::{PreprocessorRegistry, TempFileGuard, splice};
use crate::utils::{TaskRunner, expand_inputs};

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Statistics of the merge.
    pub statistics: MergeStatistics,
    /// Statistics of the output write.
    pub write: WriteStatistics,
    /// Where the document went.
    pub destination: String,
}

/// Concatenate the configured inputs into one PDF.
///
/// # Errors
///
/// Returns the first fatal error: an unreadable input, a failed
/// preprocessor, a decode failure, nothing left to merge, or a failed write.
#[instrument(skip_all, fields(inputs = config.inputs.len()))]
pub async fn run(
    config: &Config,
    formatter: &OutputFormatter,
    prompt: &dyn ReorderPrompt,
) -> Result<RunReport> {
    let runner = TaskRunner::new(config.effective_jobs());

    let expanded = expand_inputs(config.inputs())?;
    let ordered = resolve_order(expanded, config, prompt, formatter)?;
    debug!(files = ordered.len(), "resolved input order");

    let (descriptors, unknown) = classify_all(&runner, ordered, formatter).await?;

    let registry = PreprocessorRegistry::from_config(config);
    let replacements = registry.run(&descriptors).await?;
    let _temp_files = TempFileGuard::from_descriptors(&replacements);
    let descriptors = splice(descriptors, replacements);

    let merger = Merger::from_config(config);
    let mut result = merger.merge(descriptors, formatter).await?;
    result.statistics.files_skipped += unknown;

    let sink = OutputSink::from_output(config.output.as_deref());
    let write = sink.write(result.document).await?;
    info!(
        output = %sink.describe(),
        bytes = write.file_size,
        "document written"
    );

    Ok(RunReport {
        statistics: result.statistics,
        write,
        destination: sink.describe(),
    })
}

/// Classify every path, dropping the ones of unknown type.
///
/// Returns the descriptors in input order and the number of dropped files.
async fn classify_all(
    runner: &TaskRunner,
    paths: Vec<PathBuf>,
    formatter: &OutputFormatter,
) -> Result<(Vec<FileDescriptor>, usize)> {
    let classified = runner
        .try_map(paths.into_iter().enumerate(), |(order_no, path)| async move {
            let kind = classify(&path).await?;
            Ok::<_, PageCatError>(FileDescriptor::new(order_no, path).with_kind(kind))
        })
        .await?;

    let mut unknown = 0;
    let descriptors = classified
        .into_iter()
        .filter(|descriptor| {
            if descriptor.kind.is_some() {
                return true;
            }
            formatter.skip(&descriptor.origin, "unknown file type");
            unknown += 1;
            false
        })
        .collect();

    Ok((descriptors, unknown))
}
