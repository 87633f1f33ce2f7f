//! Merge engine.
//!
//! This module turns classified descriptors into PDF pages:
//! - PDF documents contribute every page, in order
//! - JPEG and PNG images are placed on a generated A4 page each
//! - Anything else is reported and skipped
//!
//! # Examples
//!
//! ```no_run
//! use pagecat::config::FitMode;
//! use pagecat::descriptor::FileDescriptor;
//! use pagecat::filetype::FileKind;
//! use pagecat::merge::Merger;
//! use pagecat::output::OutputFormatter;
//! use pagecat::utils::TaskRunner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let descriptors = vec![
//!     FileDescriptor::new(0, "cover.png").with_kind(Some(FileKind::Png)),
//!     FileDescriptor::new(1, "body.pdf").with_kind(Some(FileKind::Pdf)),
//! ];
//!
//! let merger = Merger::new(TaskRunner::new(4), FitMode::FitHeight);
//! let result = merger.merge(descriptors, &OutputFormatter::default()).await?;
//! println!("Merged {} pages", result.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod draw;
pub mod image;
pub mod merger;

pub use draw::{A4_HEIGHT, A4_WIDTH, DrawConfig};
pub use merger::{MergeResult, MergeStatistics, Merger};
