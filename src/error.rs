//! Error types for pagecat.
//!
//! Errors fall into three groups:
//!
//! - **Usage errors**: no inputs, binary output to a terminal, bad options.
//!   These exit with code 2 before any file is touched.
//! - **Processing errors**: unreadable files, broken PDFs or images, a failing
//!   converter process, write failures. These abort the run with code 1.
//! - **Cancellation**: Ctrl-C or an aborted interactive prompt (code 130).
//!
//! Files that merely have an unknown or unsupported type are not errors; the
//! pipeline reports and skips them.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Result type alias for pagecat operations.
pub type Result<T> = std::result::Result<T, PageCatError>;

/// Main error type for pagecat operations.
#[derive(Debug, thiserror::Error)]
pub enum PageCatError {
    /// No input files were given on the command line.
    #[error("No input files were specified")]
    NoInputFiles,

    /// Output would be written to an interactive terminal.
    #[error(
        "Cannot print raw PDF data to the terminal.\n  \
         Hint: Pipe the output somewhere or use --output to specify an output file"
    )]
    TerminalOutput,

    /// Invalid configuration or option combination.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file exists but cannot be read.
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input path is a directory.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Failed to parse a PDF input.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF input is encrypted and cannot be copied.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// Failed to decode or embed an image.
    #[error("Failed to embed image: {}\n  Reason: {reason}", path.display())]
    ImageDecode {
        /// Path to the image.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Failed to render a Markdown document.
    #[error("Failed to render Markdown: {}\n  Reason: {reason}", path.display())]
    MarkdownRender {
        /// Path to the Markdown file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// The document converter process could not be started.
    #[error("Failed to start document converter '{program}'\n  Reason: {source}")]
    ConverterSpawn {
        /// Program that was executed.
        program: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The document converter process exited unsuccessfully.
    #[error("Document converter exited with {status}")]
    ConverterFailed {
        /// Exit status of the converter process.
        status: ExitStatus,
    },

    /// The document converter process did not finish in time.
    #[error("Document converter did not finish within {}s", timeout.as_secs())]
    ConverterTimedOut {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Nothing mergeable was left after classification and preprocessing.
    #[error("No files to merge: every input was skipped")]
    NoFilesToMerge,

    /// Failed to write the output document.
    #[error("Failed to write output: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to, or `-` for standard output.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Error reported by the PDF object library.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for PageCatError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PageCatError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create an ImageDecode error.
    pub fn image_decode(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ImageDecode {
            path,
            reason: reason.into(),
        }
    }

    /// Create a MarkdownRender error.
    pub fn markdown_render(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::MarkdownRender {
            path,
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this is a usage error, reported before any processing starts.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::NoInputFiles | Self::TerminalOutput | Self::InvalidConfig { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            _ if self.is_usage_error() => 2,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            _ => 1,
        }
    }
}
