//! Command-line and environment configuration.
//!
//! Every flag can also come from the environment (and therefore from a
//! `.env` file, which `main` loads with `dotenvy` before parsing).

use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use crate::store::ConnectOptions;

pub const BIND_ADDRESS_DEFAULT: &str = "0.0.0.0:8000";

/// Which [`PostStore`](crate::store::PostStore) backs the service.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StoreKind {
    Memory,
    Postgres,
}

/// A CRUD service for posts.
#[derive(Parser, Debug)]
#[command(name = "postboard", version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(short, long, env = "POSTBOARD_BIND", default_value = BIND_ADDRESS_DEFAULT)]
    pub bind: String,

    /// Storage backend.
    #[arg(long, env = "POSTBOARD_STORE", value_enum, default_value_t = StoreKind::Memory)]
    pub store: StoreKind,

    /// PostgreSQL connection URL, required with `--store postgres`.
    #[arg(long, env = "DATABASE_URL", required_if_eq("store", "postgres"))]
    pub database_url: Option<String>,

    /// Size of the database connection pool.
    #[arg(long, env = "POSTBOARD_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Seconds a single connection attempt may take.
    #[arg(long, env = "POSTBOARD_CONNECT_TIMEOUT_SECS", default_value_t = 30)]
    pub connect_timeout_secs: u64,

    /// Seconds to wait between startup connection attempts.
    #[arg(long, env = "POSTBOARD_CONNECT_RETRY_SECS", default_value_t = 2)]
    pub connect_retry_secs: u64,

    /// Give up after this many connection attempts (default: never).
    #[arg(long, env = "POSTBOARD_CONNECT_ATTEMPTS")]
    pub connect_attempts: Option<u32>,

    /// Seconds to wait for open connections to finish on shutdown.
    #[arg(long, env = "POSTBOARD_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    pub drain_timeout_secs: u64,

    /// Start the memory store with two sample posts.
    #[arg(long)]
    pub seed: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` wins if set.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.connect_timeout_secs),
            retry_delay: Duration::from_secs(self.connect_retry_secs),
            max_attempts: self.connect_attempts,
        }
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    /// Default `tracing` filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }

    #[test]
    fn postgres_requires_database_url() {
        let res = Config::try_parse_from(["postboard", "--store", "postgres"]);
        // DATABASE_URL may be set in the test environment.
        if std::env::var_os("DATABASE_URL").is_none() {
            assert!(res.is_err());
        }
    }

    #[test]
    fn flags_map_to_connect_options() {
        let cfg = Config::try_parse_from([
            "postboard",
            "--store", "postgres",
            "--database-url", "postgres://localhost/fastapi",
            "--connect-retry-secs", "5",
            "--connect-attempts", "3",
            "--drain-timeout-secs", "4",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cfg.store, StoreKind::Postgres);
        let opts = cfg.connect_options();
        assert_eq!(opts.retry_delay, Duration::from_secs(5));
        assert_eq!(opts.acquire_timeout, Duration::from_secs(30));
        assert_eq!(opts.max_attempts, Some(3));
        assert_eq!(cfg.drain_timeout(), Duration::from_secs(4));
        assert_eq!(cfg.log_filter(), "trace");
    }
}
