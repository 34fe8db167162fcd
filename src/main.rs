use std::sync::Arc;

use clap::Parser;
use tracing::error;

use nodestatus_exporter::cli::Cli;
use nodestatus_exporter::config::{load_config, print_schema};
use nodestatus_exporter::startup;
use nodestatus_exporter::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.print_schema {
        print_schema();
        return;
    }

    let mut config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    cli.apply(&mut config);

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = startup::run(Arc::new(config)).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
