//! Word document conversion through an external converter process.
//!
//! On Windows the bundled PowerShell script drives Word over COM and saves a
//! PDF next to every input, named `<prefix><stem>.pdf`. The produced files are
//! temporary and removed once the merge is done.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{self, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tokio::{fs, time};
use tracing::{debug, info, instrument, warn};

use crate::descriptor::FileDescriptor;
use crate::error::{PageCatError, Result};
use crate::filetype::FileKind;

/// PowerShell script performing the conversion.
pub const SCRIPT: &str = include_str!("../../scripts/doc_to_pdf.ps1");

static TOKEN_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Unique prefix for the files of one converter run.
fn next_token() -> String {
    let n = TOKEN_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("temp{}_{}_", process::id(), n)
}

/// Converts Word documents to PDF files by running an external program.
#[derive(Debug, Clone)]
pub struct LegacyDocumentConverter {
    program: OsString,
    leading_args: Vec<OsString>,
    timeout: Option<Duration>,
    supported: bool,
}

impl LegacyDocumentConverter {
    /// Converter running the bundled script with `powershell.exe`.
    ///
    /// Only supported on Windows; elsewhere [`apply`](Self::apply) warns and
    /// converts nothing.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            program: "powershell.exe".into(),
            leading_args: ["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"]
                .into_iter()
                .map(OsString::from)
                .collect(),
            timeout,
            supported: cfg!(windows),
        }
    }

    /// Replace the program and the arguments placed before the script path.
    ///
    /// The child is invoked as
    /// `<program> <args...> <script> -prefix <token> <files...>` and must
    /// write `<dir>/<token><stem>.pdf` for every input. A custom command is
    /// considered supported on every platform.
    pub fn with_command<I, S>(mut self, program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.program = program.into();
        self.leading_args = args.into_iter().map(Into::into).collect();
        self.supported = true;
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Convert every descriptor of the batch in a single converter run.
    ///
    /// Replacements point at the produced PDF files, keep their `order_no`
    /// and are of kind [`FileKind::Pdf`].
    ///
    /// # Errors
    ///
    /// Fails when the converter cannot be started, exits unsuccessfully or
    /// exceeds the configured timeout.
    #[instrument(skip_all, fields(files = batch.len()))]
    pub async fn apply(&self, batch: Vec<FileDescriptor>) -> Result<Vec<FileDescriptor>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        if !self.supported {
            warn!("doc to pdf conversion is currently supported only on Windows");
            return Ok(Vec::new());
        }

        let sources = batch
            .iter()
            .map(|d| std::path::absolute(d.source_path()))
            .collect::<std::io::Result<Vec<_>>>()?;

        let token = next_token();
        let script = tempfile::Builder::new()
            .prefix("pagecat-")
            .suffix(".ps1")
            .tempfile()?
            .into_temp_path();
        fs::write(&script, SCRIPT).await?;

        info!(
            program = %self.program_name(),
            files = sources.len(),
            "converting documents"
        );
        self.run(&script, &token, &sources).await?;

        Ok(batch
            .iter()
            .zip(&sources)
            .map(|(descriptor, source)| {
                descriptor.replaced_by_file(converted_path(source, &token), FileKind::Pdf)
            })
            .collect())
    }

    async fn run(&self, script: &Path, token: &str, sources: &[PathBuf]) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(script)
            .arg("-prefix")
            .arg(token)
            .args(sources)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PageCatError::ConverterSpawn {
                program: self.program_name(),
                source,
            })?;

        let stderr = child.stderr.take();
        let wait = async {
            let (status, ()) = tokio::join!(child.wait(), forward_stderr(stderr));
            status
        };

        let waited = match self.timeout {
            Some(limit) => time::timeout(limit, wait).await.ok(),
            None => Some(wait.await),
        };

        let Some(status) = waited else {
            if let Err(err) = child.kill().await {
                warn!(error = %err, "failed to kill document converter");
            }
            return Err(PageCatError::ConverterTimedOut {
                timeout: self.timeout.unwrap_or_default(),
            });
        };

        let status = status.map_err(|source| PageCatError::ConverterSpawn {
            program: self.program_name(),
            source,
        })?;
        debug!(%status, "document converter finished");

        if status.success() {
            Ok(())
        } else {
            Err(PageCatError::ConverterFailed { status })
        }
    }
}

/// Path of the PDF the converter writes for `source`.
fn converted_path(source: &Path, token: &str) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default().to_string_lossy();
    let name = format!("{token}{stem}.pdf");
    match source.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

async fn forward_stderr(stderr: Option<ChildStderr>) {
    let Some(stderr) = stderr else {
        return;
    };

    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if !line.trim().is_empty() {
            warn!("converter: {line}");
        }
    }
}
