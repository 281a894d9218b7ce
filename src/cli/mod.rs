use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "solsearch")]
#[command(author, version, about = "Hybrid search over reusable automation solution records")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize solsearch in the current directory
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Store a solution record from a JSON draft file
    Add {
        /// Path to the JSON draft file
        file: PathBuf,
    },

    /// Search stored solutions
    Search {
        /// Search query
        query: String,

        /// Maximum number of results to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Search mode: auto, vector, text, hybrid or regex
        #[arg(short, long)]
        mode: Option<String>,
    },

    /// List the most recently stored solutions
    Recent {
        /// Maximum number of solutions to list
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Rate a stored solution
    Rate {
        /// Identifier of the solution to rate
        id: String,

        /// Score from 1 (poor) to 5 (excellent)
        score: u8,

        /// Optional free-form comment
        #[arg(long)]
        comment: Option<String>,
    },

    /// Backfill embeddings for solutions stored without one
    Migrate {
        /// Solutions to embed per batch
        #[arg(long)]
        batch_size: Option<usize>,

        /// Maximum solutions to process in one run
        #[arg(long)]
        max_documents: Option<usize>,
    },

    /// Show store statistics and metrics
    Stats {
        /// Output in Prometheus format
        #[arg(long)]
        prometheus: bool,
    },
}
