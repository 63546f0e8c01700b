//! site-checks - end-to-end checks for the Time-to-Geek blog
//!
//! Loads the target site and runs a checklist of DOM and metadata
//! assertions against it.

use clap::Parser;
use site_checks::{cli, commands::Commands, common::logging};

#[derive(Parser)]
#[command(name = "site-checks", about = "End-to-end checks for the Time-to-Geek blog")]
#[command(version, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose);

    match cli::dispatch(cli.command, cli.verbose).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    }
}
