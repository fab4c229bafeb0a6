//! CLI argument parsing with clap derive.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use snaplocate_core::{DecoderKind, ScannerConfig, TargetSet};

/// Find serial numbers in a stream of decoded barcodes
#[derive(Debug, Parser)]
#[command(name = "snaplocate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Use specific config file
    #[arg(short = 'C', long = "config", global = true, env = "SNAPLOCATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a recorded scan session against the target serial numbers
    Scan(ScanArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

/// Output format for scan events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Overrides shared by every command that builds a configuration.
#[derive(Debug, Default, clap::Args)]
pub struct ConfigOverrides {
    /// Replay script (tab-separated: millis, payload, optional x,y,w,h)
    #[arg(short, long, value_name = "TSV")]
    pub script: Option<PathBuf>,

    /// Minimum milliseconds between two accepted decodes
    #[arg(long, value_name = "MS")]
    pub cooldown_ms: Option<u64>,

    /// Milliseconds a match highlight stays up
    #[arg(long, value_name = "MS")]
    pub highlight_ms: Option<u64>,

    /// Keep decoding while a match is highlighted
    #[arg(long)]
    pub no_pause: bool,
}

#[derive(Debug, clap::Args)]
pub struct ScanArgs {
    /// Serial numbers to look for, comma separated
    #[arg(short, long, value_name = "LIST")]
    pub targets: Vec<String>,

    /// File with serial numbers, one or more comma-separated per line
    #[arg(long, value_name = "FILE")]
    pub targets_file: Option<PathBuf>,

    /// Export the scan history as CSV (defaults to the configured path)
    #[arg(short, long, value_name = "CSV", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

impl ConfigOverrides {
    /// Apply the overrides on top of `config` and validate the result.
    pub fn apply(&self, mut config: ScannerConfig) -> anyhow::Result<ScannerConfig> {
        if let Some(script) = &self.script {
            config.decoder = DecoderKind::Replay {
                script: script.clone(),
            };
        }
        if let Some(cooldown_ms) = self.cooldown_ms {
            config.cooldown_ms = cooldown_ms;
        }
        if let Some(highlight_ms) = self.highlight_ms {
            config.highlight_ms = highlight_ms;
        }
        if self.no_pause {
            config.pause_on_match = false;
        }

        config.validate()?;
        Ok(config)
    }
}

impl ScanArgs {
    /// Build the target set from `--targets` and `--targets-file`.
    pub fn load_targets(&self) -> anyhow::Result<TargetSet> {
        let targets = TargetSet::new();

        for list in &self.targets {
            targets.submit(list);
        }

        if let Some(path) = &self.targets_file {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read targets from {}", path.display()))?;
            for line in text.lines() {
                targets.submit(line);
            }
        }

        if targets.is_empty() {
            bail!("No target serial numbers given; use --targets or --targets-file");
        }

        Ok(targets)
    }

    /// Where to write the CSV export, if requested.
    pub fn export_path(&self, config: &ScannerConfig) -> Option<PathBuf> {
        self.export
            .as_ref()
            .map(|path| path.clone().unwrap_or_else(|| config.export_path.clone()))
    }
}

/// Load the config file if given, otherwise start from defaults.
pub fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ScannerConfig> {
    match path {
        Some(path) => ScannerConfig::load(path)
            .with_context(|| format!("Invalid configuration in {}", path.display())),
        None => Ok(ScannerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn scan_args(cli: Cli) -> ScanArgs {
        match cli.command {
            Command::Scan(args) => args,
            other => panic!("expected scan, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_scan() {
        let args = scan_args(parse(&[
            "snaplocate",
            "scan",
            "--script",
            "session.tsv",
            "--targets",
            "SN001, sn002",
            "--cooldown-ms",
            "250",
            "--output",
            "json",
        ]));

        assert_eq!(args.overrides.script, Some(PathBuf::from("session.tsv")));
        assert_eq!(args.overrides.cooldown_ms, Some(250));
        assert_eq!(args.output, OutputFormat::Json);
        assert!(args.export.is_none());
    }

    #[test]
    fn test_overrides_apply() {
        let overrides = ConfigOverrides {
            script: Some(PathBuf::from("session.tsv")),
            cooldown_ms: Some(100),
            highlight_ms: Some(2000),
            no_pause: true,
        };

        let config = overrides.apply(ScannerConfig::default()).unwrap();
        assert_eq!(config.cooldown_ms, 100);
        assert_eq!(config.highlight_ms, 2000);
        assert!(!config.pause_on_match);
        assert_eq!(
            config.decoder,
            DecoderKind::Replay {
                script: PathBuf::from("session.tsv")
            }
        );
    }

    #[test]
    fn test_overrides_validated() {
        let overrides = ConfigOverrides {
            highlight_ms: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(overrides.apply(ScannerConfig::default()).is_err());
    }

    #[test]
    fn test_targets_from_flags_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SN010\n\nSN011, SN012").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let args = scan_args(parse(&[
            "snaplocate",
            "scan",
            "-t",
            "SN001,sn002",
            "-t",
            " SN003 ",
            "--targets-file",
            &path,
        ]));

        let targets = args.load_targets().unwrap();
        assert_eq!(
            targets.snapshot(),
            ["SN001", "sn002", "SN003", "SN010", "SN011", "SN012"]
        );
    }

    #[test]
    fn test_no_targets_is_an_error() {
        let args = scan_args(parse(&["snaplocate", "scan", "-t", " , "]));
        assert!(args.load_targets().is_err());
    }

    #[test]
    fn test_export_path() {
        let config = ScannerConfig::default();

        let args = scan_args(parse(&["snaplocate", "scan", "--export"]));
        assert_eq!(args.export_path(&config), Some(config.export_path.clone()));

        let args = scan_args(parse(&["snaplocate", "scan", "--export", "out.csv"]));
        assert_eq!(args.export_path(&config), Some(PathBuf::from("out.csv")));

        let args = scan_args(parse(&["snaplocate", "scan"]));
        assert_eq!(args.export_path(&config), None);
    }

    #[test]
    fn test_load_config_default_and_file() {
        assert_eq!(load_config(None).unwrap(), ScannerConfig::default());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cooldown_ms = 750").unwrap();
        let config = load_config(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.cooldown_ms, 750);
    }
}
