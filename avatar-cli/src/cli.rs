use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

#[derive(Parser, Debug)]
#[clap(name = "avatar-cli")]
#[clap(about = "Render and resolve contact avatars", long_about = None)]
pub struct Cli {
    #[clap(long, global = true, help = "JSON theme overriding the defaults")]
    pub theme: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Commands,
}
