//! Pricewise CLI

use clap::Parser;

use crate::cli::Cli;

mod cli;

fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    cli.init_logging()?;
    cli.run()
}
