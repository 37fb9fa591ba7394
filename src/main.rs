use anyhow::Result;
use clap::Parser;

mod cli_bin;

use cli_bin::args::{Cli, Commands};
use cli_bin::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Build(args) => commands::build_command(args),
        Commands::Split(args) => commands::split_command(args),
        Commands::Title(args) => commands::title_command(args),
        Commands::Slug(args) => commands::slug_command(args),
        Commands::Validate(args) => commands::validate_command(args),
        Commands::Helper(args) => commands::helper_command(args),
    }
}
