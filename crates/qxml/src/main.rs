//! qxml - inspect, query and highlight XML documents

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod report;

#[derive(Parser)]
#[command(name = "qxml")]
#[command(version)]
#[command(about = "Inspect, query and highlight XML documents", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// YAML color scheme (colors under `xml_highlighter_colors`)
    #[arg(long, global = true, value_name = "FILE")]
    pub scheme: Option<PathBuf>,

    /// Keep parsing after a mismatched end tag
    #[arg(long, global = true)]
    pub no_halt: bool,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the document tree with node spans
    Tree {
        /// File, URL, or '-' for standard input
        input: String,
    },

    /// List every node in document order
    Nodes {
        /// File, URL, or '-' for standard input
        input: String,
    },

    /// Describe what is at a position
    Query {
        /// File, URL, or '-' for standard input
        input: String,

        /// Byte offset, or LINE:COLUMN (both 1-based)
        position: String,
    },

    /// Print the document with syntax colors
    Highlight {
        /// File, URL, or '-' for standard input
        input: String,
    },

    /// Report parse errors and warnings; fails if there are errors
    Check {
        /// File, URL, or '-' for standard input
        input: String,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qxml=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let options = cli.options;

    match cli.command {
        Commands::Tree { input } => commands::tree::execute(&input, &options),
        Commands::Nodes { input } => commands::nodes::execute(&input, &options),
        Commands::Query { input, position } => {
            commands::query::execute(&input, &position, &options)
        }
        Commands::Highlight { input } => commands::highlight::execute(&input, &options),
        Commands::Check { input } => commands::check::execute(&input, &options),
    }
}
