// DeployScribe - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading
// 3. Logging initialisation (debug mode support)
// 4. Pattern table loading (built-in or user file)
// 5. Running the pipeline and mapping failures to exit code 1

use clap::Parser;
use deployscribe::app::{pattern_mgr, pipeline};
use deployscribe::core::model::OutputFormat;
use deployscribe::platform::config;
use deployscribe::platform::sink::FileSink;
use deployscribe::util;
use deployscribe::util::error::DeployScribeError;
use std::path::PathBuf;

/// DeployScribe - Deployment log summariser.
///
/// Scans a directory of `<Subject>_deploy_<YYYY-MM-DD>.log` files, recovers
/// package ids, transaction digests and created objects from each, and writes
/// one aggregated report.
#[derive(Parser, Debug)]
#[command(name = "deployscribe", version, about)]
struct Cli {
    /// Directory containing deployment logs (default: deploy_logs).
    log_dir: Option<PathBuf>,

    /// Report destination (default: contract_deploy_newest.md).
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Configuration file (default: platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Pattern table replacing the built-in one.
    #[arg(short = 'p', long = "patterns")]
    patterns: Option<PathBuf>,

    /// Output format: markdown, json, or csv.
    #[arg(short = 'f', long = "format")]
    format: Option<OutputFormat>,

    /// Network label printed in the report.
    #[arg(long = "network")]
    network: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), DeployScribeError> {
    // Config is loaded before logging so its [logging] level can apply.
    let config_result = config::load_config(cli.config.as_deref());
    let config_level = config_result
        .as_ref()
        .ok()
        .and_then(|(c, _)| c.log_level.clone());
    util::logging::init(cli.debug, config_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "DeployScribe starting"
    );

    let (mut app_config, warnings) = config_result?;
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    // CLI flags override config values.
    if let Some(dir) = cli.log_dir {
        app_config.log_dir = dir;
    }
    if let Some(output) = cli.output {
        app_config.output_path = output;
    }
    if let Some(patterns) = cli.patterns {
        app_config.pattern_file = Some(patterns);
    }
    if let Some(format) = cli.format {
        app_config.format = format;
    }
    if let Some(network) = cli.network {
        app_config.network_label = network;
    }

    let table = pattern_mgr::load_pattern_table(app_config.pattern_file.as_deref())?;
    let run_config = pipeline::RunConfig::from_app_config(&app_config);
    let mut sink = FileSink::new(&app_config.output_path);

    let summary = pipeline::run(&run_config, &table, &mut sink)?;

    println!(
        "Wrote {} record(s) with {} object(s) to {} ({} degraded)",
        summary.sources,
        summary.total_objects,
        app_config.output_path.display(),
        summary.degraded,
    );
    Ok(())
}
