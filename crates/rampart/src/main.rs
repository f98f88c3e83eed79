//! rampart - access-rule authoring and template propagation server

use clap::Parser;
use color_eyre::eyre::Result;
use rampart::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(cmd) => cmd.run().await,
        Command::Resources(cmd) => cmd.run().await,
        Command::Templates(cmd) => cmd.run().await,
        Command::Ipsets(cmd) => cmd.run().await,
    }
}
