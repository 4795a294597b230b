//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// ransomwatch -- ransomware C2 and exfiltration indicator scanner.
///
/// Use `ransomwatch <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "ransomwatch", version, about, long_about = None)]
pub struct Cli {
    /// Path to the ransomwatch.toml configuration file.
    ///
    /// A missing file falls back to built-in defaults.
    #[arg(short, long, default_value = "ransomwatch.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan DNS and proxy logs for ransomware indicators.
    Scan(ScanArgs),

    /// Render a severity histogram from a saved alerts file.
    Report(ReportArgs),

    /// Show the effective C2 domain blocklist.
    Blocklist(BlocklistArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- scan ----

/// Run one detection pass and write the alerts CSV.
///
/// Flags override the matching configuration values.
#[derive(Args, Debug, Default)]
pub struct ScanArgs {
    /// DNS query log to scan.
    #[arg(long)]
    pub dns_log: Option<PathBuf>,

    /// Proxy/firewall access log to scan.
    #[arg(long)]
    pub proxy_log: Option<PathBuf>,

    /// Local C2 domain list file.
    #[arg(long)]
    pub blocklist: Option<PathBuf>,

    /// Remote hosts-format feed to try before the local list.
    #[arg(long)]
    pub remote_feed: Option<String>,

    /// Where to write the alerts CSV.
    #[arg(long)]
    pub alerts_out: Option<PathBuf>,

    /// Large-transfer threshold in bytes (alerts fire above this value).
    #[arg(long)]
    pub threshold: Option<u64>,
}

// ---- report ----

/// Summarize an alerts CSV by severity.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Alerts CSV to read (default: `[output].alerts_path`).
    #[arg(long)]
    pub alerts: Option<PathBuf>,
}

// ---- blocklist ----

/// Load the blocklist the way `scan` would and describe it.
#[derive(Args, Debug, Default)]
pub struct BlocklistArgs {
    /// Remote hosts-format feed to try before the local list.
    #[arg(long)]
    pub remote: Option<String>,

    /// Print every domain, sorted.
    #[arg(long)]
    pub list: bool,
}

// ---- config ----

/// Manage ransomwatch configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, blocklist, detection, output).
        #[arg(long)]
        section: Option<String>,
    },
}
