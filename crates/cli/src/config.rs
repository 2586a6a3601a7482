//! Host configuration: command-line flags layered over a TOML file.
//!
//! Precedence, highest first:
//!
//! 1. Command-line flags
//! 2. The file named by `--config`, or `reconciler.toml` in the working
//!    directory when that exists
//! 3. Built-in defaults
//!
//! `RUST_LOG`, when set, overrides the log level at subscriber install time
//! (see [`crate::telemetry`]).

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use topology::TopologyConfig;

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "reconciler.toml";

/// Default `EnvFilter` directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Command-line arguments.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "reconciler-host",
    version,
    about = "Reconcile topology resources through the guest export"
)]
pub struct Args {
    /// Configuration file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log filter directive, e.g. `debug` or `guest=trace`.
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// OTLP collector endpoint; enables trace export.
    #[arg(long, value_name = "URL")]
    pub otlp_endpoint: Option<String>,

    /// Seconds before the confirming pass after a status change.
    #[arg(long, value_name = "SECS")]
    pub requeue_after: Option<u64>,

    /// Serialized resources to reconcile. Reads stdin when empty.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

/// Log line encoding on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_owned(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    /// OTLP/gRPC endpoint. No exporter is installed when unset.
    pub otlp_endpoint: Option<String>,
}

/// Fully resolved host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    pub logging: LoggingConfig,
    pub telemetry: TelemetryConfig,
    pub topology: TopologyConfig,
}

impl HostConfig {
    /// Parses a configuration document.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid host configuration")
    }

    /// Reads the configuration file, if any.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] in
    /// the working directory is used when present, and the defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn apply(&mut self, args: &Args) {
        if let Some(format) = args.log_format {
            self.logging.format = format;
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if let Some(endpoint) = &args.otlp_endpoint {
            self.telemetry.otlp_endpoint = Some(endpoint.clone());
        }
        if let Some(secs) = args.requeue_after {
            self.topology.requeue_after_secs = secs;
        }
    }

    /// Loads, overrides and validates in one step.
    pub fn resolve(args: &Args) -> anyhow::Result<Self> {
        let mut config = Self::load(args.config.as_deref())?;
        config.apply(args);
        config.topology.validate()?;
        Ok(config)
    }
}
