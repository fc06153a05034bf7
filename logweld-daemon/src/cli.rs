//! CLI argument definitions for logweld-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Logweld log forwarding daemon.
///
/// Consumes raw log fragments from the input channel, reassembles them
/// into logical records, extracts named fields, and forwards the
/// structured result to the output channel.
#[derive(Parser, Debug)]
#[command(name = "logweld-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logweld.toml configuration file.
    #[arg(short, long, default_value = "/etc/logweld/logweld.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}
