//! pagecat - Concatenate PDF, image and Markdown files into a single PDF.
//!
//! This library provides the pieces of the `pagecat` command:
//!
//! - Input expansion and ordering, including numeric and interactive ordering
//! - File type detection from content signatures
//! - Preprocessing of Markdown (rendered in process) and Word documents
//!   (converted through Word on Windows)
//! - Merging of PDF pages and JPEG/PNG images placed on A4 pages
//! - Atomic output to a file, or output to standard output
//!
//! # Examples
//!
//! ## Full Run
//!
//! ```no_run
//! use pagecat::config::{Config, FitMode};
//! use pagecat::order::TerminalPrompt;
//! use pagecat::output::OutputFormatter;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     inputs: vec![PathBuf::from("cover.png"), PathBuf::from("body.pdf")],
//!     output: Some(PathBuf::from("book.pdf")),
//!     image_fit: FitMode::FitWidth,
//!     ..Default::default()
//! };
//!
//! let report = pagecat::pipeline::run(&config, &OutputFormatter::default(), &TerminalPrompt).await?;
//! println!("Created {} page document", report.statistics.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use pagecat::filetype::classify;
//! use pagecat::preprocess::markdown::render_markdown;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let kind = classify(Path::new("notes.md")).await?;
//! println!("Detected {kind:?}");
//!
//! let rendered = render_markdown("# Title\n\nBody text.")?;
//! println!("Rendered {} bytes", rendered.pdf.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod filetype;
pub mod io;
pub mod merge;
pub mod order;
pub mod output;
pub mod pipeline;
pub mod preprocess;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use descriptor::FileDescriptor;
pub use error::{PageCatError, Result};
pub use filetype::FileKind;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
