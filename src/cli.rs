//! CLI argument parsing for pagecat.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.
//!
//! # Examples
//!
//! ```no_run
//! use pagecat::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Concatenating {} files", cli.inputs.len());
//! ```

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, FitMode, SortOrder};
use crate::error::{PageCatError, Result};
use crate::utils::validate_patterns;

/// Concatenate PDF, image and Markdown files into a single PDF document.
///
/// Images are placed on their own pages, PDFs contribute every page and
/// Markdown files are rendered before merging. Word documents are converted
/// through Microsoft Word on Windows.
#[derive(Parser, Debug)]
#[command(name = "pagecat")]
#[command(version)]
#[command(about = "Concatenate PDF, image and Markdown files into a single PDF", long_about = None)]
#[command(author)]
#[command(override_usage = "pagecat [OPTIONS] [FILES...]")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Input files to concatenate
    ///
    /// PDF, JPEG, PNG and Markdown files are supported everywhere;
    /// Word documents on Windows only. Quoted glob patterns are expanded.
    ///
    /// Examples:
    ///   pagecat cover.png body.pdf notes.md -o book.pdf
    ///   pagecat -a --ignore-text "scans/*.jpg" > scans.pdf
    #[arg(value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Path to the output file
    ///
    /// If not specified, the result is printed to stdout.
    /// Printing to a terminal is refused.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Controls the alignment of an image on a page
    #[arg(long, value_enum, value_name = "MODE", default_value_t = FitMode::FitHeight)]
    #[arg(env = "PAGECAT_IMAGE_FIT")]
    pub image_fit: FitMode,

    /// Ignore text in file names while sorting
    ///
    /// Compares the numbers embedded in file names, so that
    /// page2.png sorts before page10.png.
    #[arg(long)]
    pub ignore_text: bool,

    /// Sort input files in ascending order before processing
    #[arg(short, long, conflicts_with = "descending")]
    pub ascending: bool,

    /// Sort input files in descending order before processing
    #[arg(short, long, conflicts_with = "ascending")]
    pub descending: bool,

    /// Interactive mode: reorder the files before concatenating them
    ///
    /// Ignored when no output file is specified (-o flag not used).
    #[arg(short, long)]
    pub interactive: bool,

    /// Show detailed information about each input file
    #[arg(long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Number of files read and decoded concurrently
    ///
    /// Default is number of CPU cores. Use 1 for sequential processing.
    #[arg(short, long, value_name = "N", env = "PAGECAT_JOBS")]
    pub jobs: Option<usize>,

    /// Seconds to wait for the Word document converter (0 = no limit)
    #[arg(
        long,
        value_name = "SECS",
        default_value_t = 300,
        env = "PAGECAT_CONVERTER_TIMEOUT"
    )]
    pub converter_timeout: u64,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration validation fails.
    pub fn to_config(&self) -> Result<Config> {
        let converter_timeout = match self.converter_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        // A blank --output behaves like no --output at all.
        let output = self
            .output
            .clone()
            .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty());

        let config = Config {
            inputs: self.inputs.clone(),
            output,
            image_fit: self.image_fit,
            sort: SortOrder::from_flags(self.ascending, self.descending),
            ignore_text: self.ignore_text,
            interactive: self.interactive,
            verbose: self.verbose,
            quiet: self.quiet,
            jobs: self.jobs,
            converter_timeout,
        };

        config.validate().map_err(|e| {
            PageCatError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// Performs early validation that doesn't require file I/O.
    ///
    /// # Errors
    ///
    /// Returns [`PageCatError::NoInputFiles`] when no inputs are given and an
    /// invalid-config error for a zero job count.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PageCatError::NoInputFiles);
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(PageCatError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        validate_patterns(&self.inputs)
    }

    /// Whether the result goes to standard output.
    pub fn writes_to_stdout(&self) -> bool {
        self.output
            .as_ref()
            .is_none_or(|path| path.as_os_str().to_string_lossy().trim().is_empty())
    }
}
