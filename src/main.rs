use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use buildstamp::DistMode;

mod commands;

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Generate a package's entry-point build metadata file", long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log lookup details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the entry-point file
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Print the entry-point file without writing it
    Render {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Show the build metadata recorded in a generated file
    Inspect {
        /// Generated file (defaults to the configured output path)
        path: Option<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Arguments shared by generate and render
#[derive(Args, Default)]
pub struct GenerateArgs {
    /// Distribution being built (none, sdist, bdist)
    #[arg(long, value_enum, default_value_t = DistMode::None)]
    dist: DistMode,

    /// Version to embed instead of reading the version file
    #[arg(long = "set-version", value_parser = clap::builder::NonEmptyStringValueParser::new())]
    version: Option<String>,

    /// Revision to embed instead of asking git
    #[arg(long)]
    sha: Option<String>,

    /// Output file, relative to the project root
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Project config holding the [metadata] section
    #[arg(long)]
    config: Option<PathBuf>,

    /// Version file
    #[arg(long)]
    version_file: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Some(Commands::Generate { args }) => commands::generate::execute(&root, &args),
        Some(Commands::Render { args }) => commands::generate::render(&root, &args),
        Some(Commands::Inspect { path, json }) => commands::inspect::execute(&root, path, json),
        // Bare invocation writes a version-only file
        None => commands::generate::execute(&root, &GenerateArgs::default()),
    }
}
