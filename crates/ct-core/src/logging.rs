//! Structured logging bootstrap for ct-core.
//!
//! Dual-mode output on stderr: human-readable console format for
//! interactive use, JSONL for automation. stdout stays reserved for
//! command payloads. Respects `CT_LOG` / `RUST_LOG` for the filter and
//! `CT_LOG_FORMAT` for the format.

use std::io::IsTerminal;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// Machine-parseable JSON lines.
    Jsonl,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "console" | "pretty" => Ok(LogFormat::Human),
            "jsonl" | "json" | "machine" => Ok(LogFormat::Jsonl),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Logging configuration resolved from flags and environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogConfig {
    pub verbose: u8,
    pub quiet: bool,
    pub format: LogFormat,
}

impl LogConfig {
    /// Applies `CT_LOG_FORMAT` on top of the flag-derived config.
    pub fn from_env(verbose: u8, quiet: bool, format: Option<LogFormat>) -> Self {
        let format = format
            .or_else(|| std::env::var("CT_LOG_FORMAT").ok().and_then(|s| s.parse().ok()))
            .unwrap_or_default();
        LogConfig {
            verbose,
            quiet,
            format,
        }
    }

    fn default_filter(&self) -> &'static str {
        if self.quiet {
            return "ct_core=error";
        }
        match self.verbose {
            0 => "ct_core=warn",
            1 => "ct_core=info",
            2 => "ct_core=debug",
            _ => "ct_core=trace",
        }
    }
}

/// Initializes the logging subsystem; call once at startup.
///
/// `CT_LOG` (then `RUST_LOG`) overrides the flag-derived filter.
pub fn init_logging(config: &LogConfig) {
    let filter = std::env::var("CT_LOG")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new(config.default_filter()));

    match config.format {
        LogFormat::Human => {
            let use_ansi = std::io::stderr().is_terminal();
            let _ = fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(use_ansi)
                .try_init();
        }
        LogFormat::Jsonl => {
            let _ = fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
