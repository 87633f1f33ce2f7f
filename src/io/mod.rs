//! I/O operations for pagecat.
//!
//! This module handles all file I/O:
//! - Reading input files into memory
//! - Parsing PDF documents
//! - Writing the merged PDF to a file or standard output
//!
//! # Examples
//!
//! ```no_run
//! use pagecat::io::{OutputSink, load_pdf, read_to_buffer};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let path = Path::new("input.pdf");
//! let bytes = read_to_buffer(path).await?;
//! let loaded = load_pdf(&bytes, path)?;
//!
//! OutputSink::Stdout.write(loaded.document).await?;
//! # Ok(())
//! # }
//! ```

pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, load_pdf, read_to_buffer};
pub use writer::{OutputSink, WriteStatistics, serialize};
