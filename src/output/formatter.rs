//! Message formatting and display.
//!
//! Standard output may carry the merged PDF, so every message produced here
//! goes to standard error.
//!
//! # Examples
//!
//! ```
//! use pagecat::output::formatter::OutputFormatter;
//! use std::path::Path;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Concatenating 3 files...");
//! formatter.skip(Path::new("notes.odt"), "unknown file type");
//! formatter.success("Created book.pdf");
//! ```

use std::io::{self, IsTerminal};
use std::path::Path;

use crate::config::Config;

/// Kind of a message, deciding its marker and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Plain progress information.
    Info,
    /// A finished step.
    Success,
    /// Something was skipped or looks wrong, but the run goes on.
    Warning,
    /// The run failed.
    Error,
    /// Extra detail for `--verbose`.
    Debug,
}

impl MessageLevel {
    fn marker(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn ansi_color(self) -> Option<&'static str> {
        match self {
            Self::Info => None,
            Self::Success => Some("32"),
            Self::Warning => Some("33"),
            Self::Error => Some("31"),
            Self::Debug => Some("36"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Writes user-facing messages to stderr according to `--quiet`/`--verbose`.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    verbosity: Verbosity,
    colored: bool,
}

impl OutputFormatter {
    /// Create a formatter. `quiet` wins over `verbose`.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        let verbosity = match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };

        Self {
            verbosity,
            colored: io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Create a formatter from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Formatter printing only warnings and errors.
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    /// Formatter printing everything.
    pub fn verbose() -> Self {
        Self::new(false, true)
    }

    /// Print progress information. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        self.emit(Verbosity::Normal, MessageLevel::Info, message);
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        self.emit(Verbosity::Normal, MessageLevel::Success, message);
    }

    /// Print a warning, even in quiet mode.
    pub fn warning(&self, message: &str) {
        self.emit(Verbosity::Quiet, MessageLevel::Warning, message);
    }

    /// Print an error, even in quiet mode.
    pub fn error(&self, message: &str) {
        self.emit(Verbosity::Quiet, MessageLevel::Error, message);
    }

    /// Print a message only shown with `--verbose`.
    pub fn debug(&self, message: &str) {
        self.emit(Verbosity::Verbose, MessageLevel::Debug, message);
    }

    /// Report an input left out of the result: `<path>: <reason>. Skipping...`.
    pub fn skip(&self, origin: &Path, reason: &str) {
        self.warning(&skip_message(origin, reason));
    }

    /// Print a section header. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if self.shows(Verbosity::Normal) {
            eprintln!("\n{title}");
        }
    }

    /// Print a `label: value` line. Only shown with `--verbose`.
    pub fn detail(&self, label: &str, value: &str) {
        if self.shows(Verbosity::Verbose) {
            eprintln!("  {label}: {value}");
        }
    }

    /// Whether non-error output is shown.
    pub fn should_print(&self) -> bool {
        self.shows(Verbosity::Normal)
    }

    /// Whether verbose output is shown.
    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Whether quiet mode is enabled.
    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    fn shows(&self, needed: Verbosity) -> bool {
        self.verbosity >= needed
    }

    fn emit(&self, needed: Verbosity, level: MessageLevel, message: &str) {
        if self.shows(needed) {
            eprintln!("{}", render(level, message, self.colored));
        }
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}

/// The line shown for a skipped input.
pub fn skip_message(origin: &Path, reason: &str) -> String {
    format!("{}: {reason}. Skipping...", origin.display())
}

fn render(level: MessageLevel, message: &str, colored: bool) -> String {
    let marker = level.marker();
    match level.ansi_color() {
        Some(code) if colored => format!("\x1b[{code}m{marker}{message}\x1b[0m"),
        _ => format!("{marker}{message}"),
    }
}
