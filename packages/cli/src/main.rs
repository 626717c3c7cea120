mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    from_pydantic, map, normalize, pydantic, state, FromPydanticArgs, MapArgs, NormalizeArgs, PydanticArgs, StateArgs,
};
use tracing_subscriber::EnvFilter;

/// Schemaforge CLI - build and convert JSON Schema documents
#[derive(Parser, Debug)]
#[command(name = "schemaforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor and bridge activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse schemas and write them back in normalized form
    Normalize(NormalizeArgs),

    /// Generate Pydantic models from schemas
    Pydantic(PydanticArgs),

    /// Convert Pydantic models into schemas (requires Python with pydantic)
    FromPydantic(FromPydanticArgs),

    /// Print the path → node identity map of normalized schemas
    Map(MapArgs),

    /// Inspect or edit the saved workbench
    State(StateArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Normalize(args) => normalize(args, &cwd),
        Command::Pydantic(args) => pydantic(args, &cwd),
        Command::FromPydantic(args) => from_pydantic(args, &cwd),
        Command::Map(args) => map(args, &cwd),
        Command::State(args) => state(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
