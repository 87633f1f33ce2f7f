//! Configuration module for pagecat.
//!
//! This module holds the validated, normalized configuration that drives a
//! concatenation run. The CLI layer builds it; the pipeline only reads it.

use anyhow::{Result, bail};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

/// Default bound on the document converter subprocess.
pub const DEFAULT_CONVERTER_TIMEOUT: Duration = Duration::from_secs(300);

/// How an image is placed on its generated page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FitMode {
    /// Native size, centred on both axes.
    Center,
    /// Scaled so the image height equals the page height, centred horizontally.
    #[default]
    FitHeight,
    /// Scaled so the image width equals the page width, centred vertically.
    FitWidth,
    /// Stretched over the whole page, ignoring the aspect ratio.
    Stretch,
}

/// Sorting applied to the input paths before processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Keep the order given on the command line.
    #[default]
    Unsorted,
    /// Sort ascending.
    Ascending,
    /// Sort descending.
    Descending,
}

impl SortOrder {
    /// Resolve the sort order from the two mutually exclusive flags.
    ///
    /// Setting both (or neither) leaves the input order untouched.
    pub fn from_flags(ascending: bool, descending: bool) -> Self {
        match (ascending, descending) {
            (true, false) => Self::Ascending,
            (false, true) => Self::Descending,
            _ => Self::Unsorted,
        }
    }
}

/// Complete configuration for a concatenation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input file paths, in command-line order.
    pub inputs: Vec<PathBuf>,

    /// Output file path. `None` writes to standard output.
    pub output: Option<PathBuf>,

    /// Placement of images on their generated pages.
    pub image_fit: FitMode,

    /// Sorting applied to the inputs.
    pub sort: SortOrder,

    /// Compare the numeric part of file names instead of the full path.
    pub ignore_text: bool,

    /// Let the user reorder the files interactively.
    pub interactive: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Number of concurrent file operations (None = auto-detect).
    pub jobs: Option<usize>,

    /// Bound on the document converter process (None = wait forever).
    pub converter_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            image_fit: FitMode::default(),
            sort: SortOrder::default(),
            ignore_text: false,
            interactive: false,
            verbose: false,
            quiet: false,
            jobs: None,
            converter_timeout: Some(DEFAULT_CONVERTER_TIMEOUT),
        }
    }
}

impl Config {
    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path is also one of the inputs
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if let Some(ref output) = self.output {
            for input in &self.inputs {
                if input == output {
                    bail!(
                        "Output file cannot be the same as an input file: {}",
                        output.display()
                    );
                }
            }
        }

        Ok(())
    }

    /// Get the effective number of concurrent jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Whether the interactive prompt can actually be shown.
    ///
    /// Standard output cannot host a prompt while it also carries the PDF.
    pub fn can_prompt(&self) -> bool {
        self.interactive && self.output.is_some()
    }
}
