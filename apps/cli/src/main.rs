//! distill CLI: extract the main text of web pages.
//!
//! Fetches pages (or reads local files), strips navigation, ads and other
//! boilerplate, and writes the remaining prose as wrapped plain text.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
