use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use rust_entitygen::catalog::CatalogScope;
use rust_entitygen::model::GenerationOptions;
use rust_entitygen::output::generate_model_xml;
use rust_entitygen::{extract_model, ExtractOptions};

#[derive(Parser)]
#[command(name = "rust-entitygen")]
#[command(author, version, about = "Extract entity models from database catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an entity model from a catalog snapshot
    Extract {
        /// Path to the catalog snapshot XML file
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Output path for the model XML (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only include these schemas (repeatable)
        #[arg(long = "schema")]
        schemas: Vec<String>,

        /// Only include these databases (repeatable)
        #[arg(long = "database")]
        databases: Vec<String>,

        /// Map tinyint(1) columns to boolean through a transformer
        #[arg(long)]
        tinyint_transformer: bool,

        /// Map bigint columns to integer through a transformer
        #[arg(long)]
        bigint_transformer: bool,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            snapshot,
            output,
            schemas,
            databases,
            tinyint_transformer,
            bigint_transformer,
            verbose,
        } => {
            init_tracing(verbose);

            let to_stdout = output.is_none();
            let options = ExtractOptions {
                snapshot_path: snapshot,
                output_path: output,
                scope: CatalogScope::new(schemas, databases),
                generation: GenerationOptions {
                    generate_tinyint_transformer: tinyint_transformer,
                    generate_bigint_transformer: bigint_transformer,
                },
            };

            let extracted = extract_model(&options)?;
            if to_stdout {
                generate_model_xml(std::io::stdout().lock(), &extracted)?;
                println!();
            }
        }
    }

    Ok(())
}
