//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigV1, MAX_POLL_INTERVAL};

#[derive(Parser, Debug)]
#[command(
    name = "nodestatus-exporter",
    version,
    about = "Exports grid node status counts as Prometheus gauges"
)]
pub struct Cli {
    /// Duration of interval between calls, in seconds.
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=MAX_POLL_INTERVAL))]
    pub duration: Option<u64>,

    /// YAML configuration file; missing files are ignored.
    #[arg(short, long, default_value = "./config.yaml")]
    pub config: PathBuf,

    /// Print the configuration JSON schema and exit.
    #[arg(long)]
    pub print_schema: bool,
}

impl Cli {
    /// Applies flag overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut ConfigV1) {
        if let Some(duration) = self.duration {
            config.poll_interval = duration;
        }
    }
}
