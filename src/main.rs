//! The main entry point for the hemosim command line tool.
use anyhow::Result;
use clap::Parser;
use hemosim::commands::{Cli, Commands, handle_run_command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            model_dir,
            days,
            start_date,
            seed,
            output_dir,
        } => handle_run_command(
            model_dir.as_deref(),
            days,
            start_date,
            seed,
            output_dir.as_deref(),
        ),
    }
}
