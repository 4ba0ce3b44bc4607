use clap::Parser;

use crate::cli::Cli;
use crate::commands::Commands;
use crate::error::AppError;
use crate::util::load_theme;

mod cli;
mod commands;
mod error;
mod util;

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let args = Cli::parse();
    let theme = load_theme(&args.theme)?;

    match &args.command {
        Commands::Initials(initials) => initials.run(theme),
        Commands::Resolve(resolve) => resolve.run(theme).await,
        Commands::Bubble(bubble) => bubble.run(theme).await,
    }
}
