// src/main.rs
use clap::Parser;

use dirsort::cli::Args;
use dirsort::config::Config;
use dirsort::organize::handle_sort;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    handle_sort(&args.source, args.create_empty.map(bool::from), &config).await?;

    Ok(())
}
