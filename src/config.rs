//! Runtime configuration from flags and environment.

use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;
use crate::services::ReassignPolicy;

/// Log output format and default verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogMode {
    /// Human-readable output at debug level.
    #[default]
    Development,
    /// JSON lines at info level.
    Production,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "review-assign",
    about = "Assigns pull request reviewers from the author's team",
    version
)]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0", env = "APP_HOST")]
    pub host: IpAddr,

    /// Port to bind the HTTP server to
    #[arg(long, default_value_t = 8080, env = "APP_PORT")]
    pub port: u16,

    /// Log format and default level
    #[arg(long, value_enum, default_value_t = LogMode::Development, env = "LOG_MODE")]
    pub log_mode: LogMode,

    /// SQLite database file, created if missing
    #[arg(long, env = "DATABASE_PATH")]
    pub database_path: PathBuf,

    /// Upper bound on a single operation's transaction, in seconds
    #[arg(long, default_value_t = 5, env = "OPERATION_TIMEOUT_SECS")]
    pub operation_timeout_secs: u64,

    /// Never pick the pull request's other reviewer as a replacement
    #[arg(long, env = "STRICT_REASSIGNMENT")]
    pub strict_reassignment: bool,

    /// Seed for reproducible reviewer selection
    #[arg(long, env = "RNG_SEED")]
    pub rng_seed: Option<u64>,
}

impl Config {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.operation_timeout_secs == 0 {
            return Err(AppError::invalid_input_field(
                "INVALID_PARAMETER",
                "operation timeout must be at least one second",
                "operation_timeout_secs",
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn reassign_policy(&self) -> ReassignPolicy {
        if self.strict_reassignment {
            ReassignPolicy::ExcludeAssigned
        } else {
            ReassignPolicy::AllowDuplicate
        }
    }
}
