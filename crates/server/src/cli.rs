//! Clap command definition for the server binary.

use clap::{value_parser, Arg, ArgMatches, Command};
use snapkv_engine::StoreConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Build the server command line.
pub fn build_cli() -> Command {
    Command::new("snapkv-server")
        .about("In-memory key-value store with periodic snapshots")
        .arg(
            Arg::new("port")
                .long("port")
                .env("PORT")
                .help("Port to listen on")
                .value_parser(value_parser!(u16))
                .default_value("8080"),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .env("SNAPKV_INTERVAL")
                .help("Seconds between snapshots")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("300"),
        )
        .arg(
            Arg::new("snapshot-dir")
                .long("snapshot-dir")
                .env("SNAPKV_SNAPSHOT_DIR")
                .help("Snapshot directory (default: system temp dir)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("request-timeout-ms")
                .long("request-timeout-ms")
                .help("Fail requests not answered within this many milliseconds")
                .value_parser(value_parser!(u64).range(1..)),
        )
}

/// Parsed server arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerArgs {
    /// Listen port
    pub port: u16,
    /// Snapshot interval in seconds
    pub interval_secs: u64,
    /// Snapshot directory override
    pub snapshot_dir: Option<PathBuf>,
    /// Request timeout
    pub request_timeout: Option<Duration>,
}

impl ServerArgs {
    /// Extract arguments from clap matches.
    pub fn from_matches(matches: &ArgMatches) -> Self {
        ServerArgs {
            port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
            interval_secs: matches.get_one::<u64>("interval").copied().unwrap_or(300),
            snapshot_dir: matches.get_one::<PathBuf>("snapshot-dir").cloned(),
            request_timeout: matches
                .get_one::<u64>("request-timeout-ms")
                .map(|ms| Duration::from_millis(*ms)),
        }
    }

    /// Store configuration for these arguments
    pub fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::default().with_interval_secs(self.interval_secs);
        if let Some(dir) = &self.snapshot_dir {
            config.persistence = config.persistence.with_snapshot_dir(dir.clone());
        }
        if let Some(timeout) = self.request_timeout {
            config = config.with_request_timeout(timeout);
        }
        config
    }
}
