//! erdreplay CLI - replay DDL statements into ER diagram snapshots

mod cli;

use clap::Parser;
use erdreplay::logging::init_logging;

fn main() {
    let cli_args = cli::Cli::parse();

    if let Err(e) = init_logging(
        cli_args.log_level.map(|l| l.as_str()),
        cli_args.log_format.map(|f| f.as_str()),
    ) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    if let Err(e) = cli::run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
