mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;

use matrix_service::{Defaults, MatrixResult};

/// Validate and expand matrix fan-out definitions in pipeline files
#[derive(Parser, Debug)]
#[command(name = "matrix", version, about)]
struct Cli {
    /// Defaults file (YAML) holding default-max-matrix-combinations-count
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum combinations per matrix, at least 1 (overrides the config file)
    #[arg(long, global = true, value_name = "N")]
    max_combinations: Option<usize>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Validate(commands::validate::ValidateArgs),
    Count(commands::count::CountArgs),
    Expand(commands::expand::ExpandArgs),
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let defaults = load_defaults(cli.config.as_deref(), cli.max_combinations)?;

    match cli.command {
        Command::Validate(args) => commands::validate::execute(args, &defaults),
        Command::Count(args) => commands::count::execute(args),
        Command::Expand(args) => commands::expand::execute(args, &defaults),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();
}

fn load_defaults(
    config: Option<&std::path::Path>,
    max_combinations: Option<usize>,
) -> MatrixResult<Defaults> {
    let mut defaults = match config {
        Some(path) => Defaults::from_file(path)?,
        None => Defaults::default(),
    };

    if let Some(max) = max_combinations {
        defaults.set_max_matrix_combinations_count(max)?;
    }

    Ok(defaults)
}
