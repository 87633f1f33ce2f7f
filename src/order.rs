//! Input ordering.
//!
//! Resolves the final order in which input files are concatenated: the
//! command-line order, a lexicographic or numeric sort, and optionally a
//! manual reordering through an interactive prompt.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{Config, SortOrder};
use crate::error::{PageCatError, Result};
use crate::output::OutputFormatter;

/// Something that can let the user reorder a list of files.
pub trait ReorderPrompt {
    /// Present `items` and return the confirmed order as indices into `items`.
    ///
    /// Returns `Ok(None)` when the user aborted the prompt.
    fn reorder(&self, message: &str, items: &[String]) -> std::io::Result<Option<Vec<usize>>>;
}

/// Reorder prompt backed by `dialoguer`'s sort widget, drawn on stderr.
///
/// Ctrl-C inside the widget surfaces as [`std::io::ErrorKind::Interrupted`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl ReorderPrompt for TerminalPrompt {
    fn reorder(&self, message: &str, items: &[String]) -> std::io::Result<Option<Vec<usize>>> {
        dialoguer::Sort::new()
            .with_prompt(message)
            .items(items)
            .interact_opt()
            .map_err(|dialoguer::Error::IO(err)| err)
    }
}

/// Numeric sort key of a file name.
///
/// Everything but digits and dots is stripped from the file stem and the rest
/// is parsed as a number, so `page10.png` yields `10.0`. A stem without digits
/// yields `0.0`; a leftover like `1.2.3` yields NaN.
pub fn numeric_key(path: &Path) -> f64 {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();

    let digits: String = stem
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        return 0.0;
    }

    digits.parse().unwrap_or(f64::NAN)
}

fn compare(a: &Path, b: &Path, ignore_text: bool) -> Ordering {
    if ignore_text {
        // NaN keys compare equal to everything.
        numeric_key(a)
            .partial_cmp(&numeric_key(b))
            .unwrap_or(Ordering::Equal)
    } else {
        // Plain byte order: case sensitive, uppercase before lowercase.
        a.as_os_str().cmp(b.as_os_str())
    }
}

/// Sort paths according to `order`.
///
/// The sort is stable: paths that compare equal keep their relative order,
/// in descending mode too.
pub fn sort_paths(paths: &mut [PathBuf], order: SortOrder, ignore_text: bool) {
    match order {
        SortOrder::Unsorted => {}
        SortOrder::Ascending => paths.sort_by(|a, b| compare(a, b, ignore_text)),
        SortOrder::Descending => paths.sort_by(|a, b| compare(a, b, ignore_text).reverse()),
    }
}

/// Resolve the final processing order of the configured inputs.
///
/// # Errors
///
/// Returns [`PageCatError::Cancelled`] when the interactive prompt is aborted
/// or interrupted, or an I/O error when the terminal cannot be used.
pub fn resolve_order(
    inputs: Vec<PathBuf>,
    config: &Config,
    prompt: &dyn ReorderPrompt,
    formatter: &OutputFormatter,
) -> Result<Vec<PathBuf>> {
    let mut paths = inputs;
    sort_paths(&mut paths, config.sort, config.ignore_text);

    if !config.interactive {
        return Ok(paths);
    }

    if !config.can_prompt() {
        formatter.error(
            "No output file specified - cannot use stdout interactively \
             (because it would interfere with the final PDF)",
        );
        return Ok(paths);
    }

    let items: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    let order = prompt
        .reorder("Change the order in which files will be concatenated", &items)
        .map_err(|err| match err.kind() {
            std::io::ErrorKind::Interrupted => PageCatError::Cancelled,
            _ => err.into(),
        })?
        .ok_or(PageCatError::Cancelled)?;

    debug!(?order, "interactive reorder confirmed");

    let mut slots: Vec<Option<PathBuf>> = paths.into_iter().map(Some).collect();
    let reordered = order
        .into_iter()
        .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
        .collect();

    Ok(reordered)
}
