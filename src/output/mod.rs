//! Output formatting and display for pagecat.
//!
//! This module handles all user-facing output: status messages, skip
//! notices, warnings and the verbose run summary. Everything is written to
//! standard error.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::merge::MergeStatistics;

/// Display merge statistics to the user.
///
/// # Arguments
///
/// * `formatter` - Output formatter to use
/// * `stats` - Statistics of the finished merge
pub fn display_merge_statistics(formatter: &OutputFormatter, stats: &MergeStatistics) {
    if stats.files_skipped > 0 {
        formatter.warning(&format!("{} file(s) skipped", stats.files_skipped));
    }

    formatter.info(&format!(
        "Merged {} file(s) into {} page(s) in {:.2}s",
        stats.files_merged,
        stats.total_pages,
        stats.merge_time.as_secs_f64()
    ));

    if formatter.is_verbose() {
        formatter.section("Statistics");
        formatter.detail("Images", &stats.images_embedded.to_string());
        formatter.detail("Documents", &stats.documents_copied.to_string());
        formatter.detail("Input size", &stats.format_input_size());
        formatter.detail(
            "Load time",
            &format!("{:.2}s", stats.load_time.as_secs_f64()),
        );
    }
}
