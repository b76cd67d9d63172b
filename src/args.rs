use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Clone, Debug, Parser)]
#[clap(infer_subcommands = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Command {
    /// Builds the site into the output directory
    Build(BuildArgs),

    /// Builds the site and rebuilds it on changes
    Watch(WatchArgs),

    /// Prints the resolved build configuration
    Config(BuildArgs),
}

#[derive(Clone, Debug, Parser)]
pub struct BuildArgs {
    #[clap(default_value = ".")]
    pub directory: PathBuf,
}

#[derive(Clone, Debug, Parser)]
pub struct WatchArgs {
    #[clap(default_value = ".")]
    pub directory: PathBuf,

    /// Milliseconds to wait for further changes before rebuilding
    #[clap(long, default_value_t = 200)]
    pub debounce_ms: u64,
}
