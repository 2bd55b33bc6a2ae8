mod commands;

use anyhow::Result;
use clap::Parser;

use residua_cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Inspect { checkpoint, format } => commands::inspect::run(&checkpoint, &format),

        Commands::Embed {
            checkpoint,
            input,
            batch_size,
            max_length,
            per_token,
            device,
            mlp_activation,
            format,
        } => commands::embed::run(
            &checkpoint,
            input.as_deref(),
            batch_size,
            max_length,
            per_token,
            &device,
            &mlp_activation,
            &format,
        ),
    }
}
