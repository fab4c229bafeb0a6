//! `snaplocate` command-line entry point.

mod cli;
mod console;

use anyhow::{Context, bail};
use clap::Parser;
use snaplocate_core::{DecoderKind, ScannerConfig};
use snaplocate_pipeline::{ScanSession, SessionReport};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ConfigArgs, OutputFormat, ScanArgs};
use console::ConsoleSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli::load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Scan(args) => scan(config, args).await,
        Command::Config(args) => show_config(config, args),
    }
}

/// Logs go to stderr so scan output on stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn scan(config: ScannerConfig, args: ScanArgs) -> anyhow::Result<()> {
    let config = args.overrides.apply(config)?;

    if config.decoder == DecoderKind::Mock {
        bail!("No frame source configured; pass --script or set decoder.kind = \"replay\"");
    }

    let targets = args.load_targets()?;
    info!(targets = ?targets.snapshot(), "Looking for serial numbers");

    let sink = ConsoleSink::stdout(args.output);
    let (session, _) = ScanSession::from_config(&config, targets, sink)
        .context("Failed to start scan session")?;
    let report = session.join().await?;

    if let Some(error) = &report.decoder_error {
        warn!("Scan stopped early: {}", error);
    }

    print_summary(&report, args.output);

    if let Some(path) = args.export_path(&config) {
        let written = report.export_csv(&path)?;
        info!("Scan history exported to {}", written.display());
    }

    Ok(())
}

fn print_summary(report: &SessionReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let summary = serde_json::json!({ "event": "summary", "data": report });
            println!("{summary}");
        }
        OutputFormat::Text => {
            println!(
                "\n{} decodes accepted, {} suppressed, {} matched",
                report.stats.accepted, report.stats.suppressed, report.stats.matched
            );
            if let (Some(first), Some(last)) = (report.first_capture, report.last_capture) {
                println!("captured {} .. {}", first.to_rfc3339(), last.to_rfc3339());
            }
            println!("{} distinct barcodes seen:", report.history.len());
            for entry in report.history.entries() {
                println!("  {entry}");
            }
        }
    }
}

fn show_config(config: ScannerConfig, args: ConfigArgs) -> anyhow::Result<()> {
    let config = args.overrides.apply(config)?;
    let text = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{text}");
    Ok(())
}
