//! Utilities for input expansion, bounded fan-out and size formatting.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::{PageCatError, Result};

/// Runs asynchronous work over a sequence with a fixed concurrency limit.
///
/// Results come back in input order, whatever order the tasks finish in.
#[derive(Debug, Clone, Copy)]
pub struct TaskRunner {
    limit: usize,
}

impl TaskRunner {
    /// Create a runner allowing `limit` tasks in flight (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Maximum number of tasks in flight.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Apply the fallible `f` to every item and collect the outputs in order.
    ///
    /// # Errors
    ///
    /// Returns the first error in input order; outstanding tasks are dropped.
    pub async fn try_map<I, F, Fut, T>(&self, items: I, f: F) -> Result<Vec<T>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        stream::iter(items)
            .map(f)
            .buffered(self.limit)
            .try_collect()
            .await
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        let limit = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(limit)
    }
}

/// Whether `s` contains glob metacharacters.
fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Whether `input` is expanded as a glob pattern rather than taken literally.
fn is_pattern(input: &Path) -> bool {
    !input.exists() && has_glob_meta(&input.to_string_lossy())
}

/// Check that every input taken as a glob pattern is well formed.
///
/// # Errors
///
/// Returns [`PageCatError::InvalidConfig`] naming the first malformed pattern.
pub fn validate_patterns(inputs: &[PathBuf]) -> Result<()> {
    for input in inputs.iter().filter(|input| is_pattern(input)) {
        let pattern = input.to_string_lossy();
        glob::Pattern::new(&pattern).map_err(|err| invalid_pattern(&pattern, &err))?;
    }
    Ok(())
}

fn invalid_pattern(pattern: &str, err: &glob::PatternError) -> PageCatError {
    PageCatError::invalid_config(format!("Invalid pattern '{pattern}': {err}"))
}

/// Expand input arguments that name no existing file but look like glob
/// patterns.
///
/// Literal paths are kept as they are, even when missing, so that the
/// classifier reports them. A pattern without matches is kept literally too.
///
/// # Errors
///
/// Returns an error for a malformed pattern or an unreadable match.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut resolved = Vec::with_capacity(inputs.len());

    for input in inputs {
        if !is_pattern(input) {
            resolved.push(input.clone());
            continue;
        }

        let pattern = input.to_string_lossy();
        let matches = collect_paths_for_pattern(&pattern)?;
        if matches.is_empty() {
            resolved.push(input.clone());
        } else {
            tracing::debug!(%pattern, count = matches.len(), "expanded glob pattern");
            resolved.extend(matches);
        }
    }

    Ok(resolved)
}

/// Expand a single glob pattern into file paths, in sorted order.
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| invalid_pattern(pattern, &err))?;

    let mut resolved = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| PageCatError::Other {
            message: err.to_string(),
        })?;
        if is_file(&path) {
            resolved.push(path);
        }
    }

    Ok(resolved)
}

fn is_file(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file())
}

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
