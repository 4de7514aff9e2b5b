mod compare;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comparador_core::{SearchMode, StoreSelection};
use comparador_search::Sources;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "comparador-cli")]
#[command(about = "Compare product prices across Gollo, Monge and MExpress")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search one or all stores for a product
    Search {
        /// Product to search for
        term: String,

        /// Store to query: all, gollo, monge or mexpress
        #[arg(long, default_value = "all")]
        store: StoreSelection,

        /// Query the stores concurrently or one after another
        #[arg(long, default_value = "concurrent")]
        mode: SearchMode,

        /// Also write the results to an .xlsx workbook at this path
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Write a batch price comparison workbook
    Compare {
        /// Destination .xlsx path
        #[arg(long, default_value = "comparacion_precios.xlsx")]
        output: PathBuf,

        /// Name of the product list being compared; prints its summary first
        #[arg(long)]
        list: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("nothing to do; run `comparador-cli --help` for usage");
        return Ok(());
    };

    let config = comparador_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let sources = Sources::from_config(&config)?;
    match command {
        Commands::Search {
            term,
            store,
            mode,
            export,
        } => search::run_search(&sources, &term, store, mode, export.as_deref()).await,
        Commands::Compare { output, list } => {
            compare::run_compare(&sources, &output, list.as_deref()).await
        }
    }
}

#[cfg(test)]
mod tests;
