//! Relex CLI - Command-line interface
//!
//! Usage:
//!   relex extract --text <file> --entities <file> [--json]
//!   relex labels

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use relex_core::{EntityMention, ExtractionReport};
use relex_extractor::{HeuristicCatalog, RelationExtractor};

#[derive(Parser)]
#[command(name = "relex")]
#[command(about = "Heuristic relation extraction for requirements documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract relations from a document
    Extract {
        /// Path to the raw document text
        #[arg(long)]
        text: PathBuf,
        /// Path to the recognized entity mentions (JSON array)
        #[arg(long)]
        entities: PathBuf,
        /// Emit the full extraction report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the relation labels the catalog knows about
    Labels,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let catalog = HeuristicCatalog::new();

    match cli.command {
        Commands::Extract {
            text,
            entities,
            json,
        } => {
            let document = std::fs::read_to_string(&text)
                .with_context(|| format!("reading document text from {}", text.display()))?;
            let entities_json = std::fs::read_to_string(&entities)
                .with_context(|| format!("reading entity mentions from {}", entities.display()))?;
            let mentions: Vec<EntityMention> = serde_json::from_str(&entities_json)
                .context("parsing entity mentions JSON")?;

            info!(
                bytes = document.len(),
                mentions = mentions.len(),
                "starting extraction"
            );
            let relations = catalog.extract(&document, &mentions)?;
            let report = ExtractionReport::new(relations);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for relation in &report.relations {
                    println!("{relation}");
                }
            }
        }
        Commands::Labels => {
            println!("authored:");
            for label in catalog.authored_labels() {
                println!("  {} ({})", label, catalog.vocabulary().phrase(label));
            }
            println!("reserved:");
            for label in catalog.reserved_labels() {
                println!("  {label}");
            }
        }
    }

    Ok(())
}
