//! physical-nets: rebuild netlist pin assignments from board copper.
//!
//! Reads a board document, its pad list and its netlist from files, finds
//! which pads are joined by copper, and writes the resulting nets back into
//! the netlist.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use physical_nets::config::{self, FormatSetting};
use physical_nets::host::FileHost;
use physical_nets::pipeline::{self, RunOptions};

/// Rebuild netlist pin assignments from physical copper connectivity.
///
/// Pads joined by tracks, arcs, vias or filled copper end up on one net.
/// Existing hand-given net names are kept; unnamed groups get `NET<k>`.
#[derive(Parser, Debug)]
#[command(name = "physical-nets")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board document source (one record per line)
    #[arg(long, value_name = "FILE")]
    source: PathBuf,

    /// Netlist JSON document
    #[arg(long, value_name = "FILE")]
    netlist: PathBuf,

    /// Pad list JSON array
    #[arg(long, value_name = "FILE")]
    pads: Option<PathBuf>,

    /// Where to write the patched netlist (defaults to --netlist)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Editor version, used to detect the document format
    #[arg(long, value_name = "VERSION")]
    editor_version: Option<String>,

    /// Document format (overrides the configuration file)
    #[arg(long, value_enum)]
    format: Option<FormatSetting>,

    /// Compute and report, but do not write the netlist
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    report: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the physical-nets tool.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig read from: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    if let Some(format) = args.format {
        cfg.format = format;
    }
    if args.editor_version.is_some() {
        cfg.editor_version = args.editor_version;
    }
    let options = RunOptions {
        format: cfg.source_format(),
        engine: cfg.engine,
        dry_run: args.dry_run,
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        format = ?options.format,
        source = %args.source.display(),
        netlist = %args.netlist.display(),
        "Starting physical-nets"
    );

    let mut host = FileHost::new(args.source, args.netlist);
    if let Some(pads) = args.pads {
        host = host.with_pads(pads);
    }
    if let Some(output) = args.output {
        host = host.with_output(output);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(pipeline::run(&mut host, &options)) {
        Ok(report) => {
            info!(
                changes = report.change_count(),
                written = report.written,
                output = %host.output_path().display(),
                elapsed_ms = report.elapsed.as_millis(),
                "Finished"
            );
            if args.report {
                match serde_json::to_string_pretty(&report.outcome) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        error!(error = %e, "Failed to encode report");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Reconstruction failed");
            ExitCode::FAILURE
        }
    }
}
