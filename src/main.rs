//! pagecat - Concatenate PDF, image and Markdown files into a single PDF.

use clap::{CommandFactory, Parser};
use std::io::{self, IsTerminal};
use std::process;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use pagecat::cli::Cli;
use pagecat::error::PageCatError;
use pagecat::order::TerminalPrompt;
use pagecat::output::{OutputFormatter, display_merge_statistics};
use pagecat::pipeline;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = preflight(&cli) {
        match err {
            PageCatError::NoInputFiles => {
                eprintln!("No input files were specified!\n");
                eprintln!("{}", Cli::command().render_help());
            }
            ref other => eprintln!("Error: {other}"),
        }
        process::exit(err.exit_code());
    }

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Checks that must pass before anything is read.
fn preflight(cli: &Cli) -> Result<(), PageCatError> {
    cli.validate()?;

    if cli.writes_to_stdout() && io::stdout().is_terminal() {
        return Err(PageCatError::TerminalOutput);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PageCatError> {
    let config = cli.to_config()?;
    let formatter = OutputFormatter::from_config(&config);

    if formatter.is_verbose() {
        formatter.section(&format!("{} v{}", pagecat::NAME, pagecat::VERSION));
    }
    formatter.debug(&format!("Concatenating {} input(s)", config.inputs.len()));

    let report = tokio::select! {
        report = pipeline::run(&config, &formatter, &TerminalPrompt) => report?,
        _ = signal::ctrl_c() => return Err(PageCatError::Cancelled),
    };

    display_merge_statistics(&formatter, &report.statistics);

    if config.output.is_some() {
        formatter.success(&format!(
            "Successfully created {} ({})",
            report.destination,
            report.write.format_file_size()
        ));
    }

    if formatter.is_verbose() {
        formatter.detail("Output size", &report.write.format_file_size());
        formatter.detail(
            "Write time",
            &format!("{:.2}s", report.write.write_time.as_secs_f64()),
        );
    }

    Ok(())
}
