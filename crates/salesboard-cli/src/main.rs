#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;

use anyhow::Context;
use clap::{Parser, Subcommand};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use salesboard_core::config::load_config;
use std::env;
use std::fs::OpenOptions;
use std::io;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "salesboard: revenue by product and month, with drill-down",
    long_about = None
)]
struct Cli {
    /// Config file (default: salesboard.toml in the current directory, if present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    debug: bool,

    /// Output format for non-interactive commands.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    /// The dashboard owns the terminal, so logs must not reach it.
    const fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Run(_)))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Open the interactive dashboard (default)",
        long_about = "Show revenue as a stacked bar chart per month. Click a segment, or move \
                      to it with the arrow keys and press Enter, to list its records.",
        after_help = "EXAMPLES:\n    # Use data.path from salesboard.toml\n    salesboard\n\n    # Open a specific file\n    salesboard run data/q1.csv"
    )]
    Run(cmd::run::RunArgs),

    #[command(
        about = "Print revenue per product and month",
        long_about = "Aggregate the data the chart is drawn from and print one row per \
                      (product, month) group with the grand total.",
        after_help = "EXAMPLES:\n    # Aligned table\n    salesboard summary\n\n    # Emit machine-readable output\n    salesboard summary --format json"
    )]
    Summary(cmd::summary::SummaryArgs),

    #[command(
        about = "Print the records behind one bar segment",
        long_about = "Filter the data to one product and month, as clicking a chart segment \
                      does, and print every column of the matching records.",
        after_help = "EXAMPLES:\n    # Select by name\n    salesboard drill --product \"Product A\" --month \"Jan 2022\"\n\n    # Replay a recorded click\n    salesboard drill --payload '{\"points\":[{\"x\":\"Jan 2022\",\"customdata\":[\"Product A\"]}]}'"
    )]
    Drill(cmd::drill::DrillArgs),
}

fn init_tracing(debug: bool, interactive: bool) {
    let filter = EnvFilter::try_from_env("SALESBOARD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if debug || env::var("DEBUG").is_ok() {
            "salesboard=debug,info"
        } else {
            "salesboard=info,warn"
        })
    });

    let format = env::var("SALESBOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let (writer, ansi) = log_writer(interactive);

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_ansi(ansi).with_writer(writer))
                .init();
        }
    }
}

/// Log destination: `SALESBOARD_LOG_FILE` if set, else stderr, else nowhere
/// while the dashboard holds the screen.
fn log_writer(interactive: bool) -> (BoxMakeWriter, bool) {
    if let Some(path) = env::var_os("SALESBOARD_LOG_FILE") {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => return (BoxMakeWriter::new(Mutex::new(file)), false),
            Err(err) if !interactive => {
                eprintln!(
                    "warning: cannot open log file {}: {err}",
                    std::path::Path::new(&path).display()
                );
            }
            Err(_) => {}
        }
    }

    if interactive {
        (BoxMakeWriter::new(io::sink), false)
    } else {
        (BoxMakeWriter::new(io::stderr), true)
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let project_root = env::current_dir().context("resolve current directory")?;
    let config = load_config(&project_root, cli.config.as_deref()).context("load config")?;
    let output = resolve_output_mode(cli.format, cli.json, config.output.as_deref());
    debug!(?output, "resolved output mode");

    match &cli.command {
        None => cmd::run::run_interactive(&cmd::run::RunArgs::default(), &config, &project_root),
        Some(Commands::Run(args)) => cmd::run::run_interactive(args, &config, &project_root),
        Some(Commands::Summary(args)) => {
            cmd::summary::run_summary(args, &config, output, &project_root)
        }
        Some(Commands::Drill(args)) => cmd::drill::run_drill(args, &config, output, &project_root),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.is_interactive());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mode = resolve_output_mode(cli.format, cli.json, None);
            let _ = render_error(&mut io::stderr().lock(), mode, &CliError::from_anyhow(&err));
            ExitCode::FAILURE
        }
    }
}
