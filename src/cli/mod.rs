// Command-line interface
pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(about = "Larder - recipe recommendations from the ingredients you have", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract recipe records from a cookbook document and print a summary
    Extract {
        /// Cookbook text file (defaults to DATASET_PATH)
        input: Option<String>,
    },

    /// Extract, embed and upload recipes, rebuilding the vector table
    Ingest {
        /// Cookbook text file (defaults to DATASET_PATH)
        input: Option<String>,
    },

    /// Retrieve matching recipes without generating recommendations
    Search {
        /// Ingredients, optionally with filter:CATEGORY and | free text
        query: String,

        /// Maximum candidates to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Ask for recommendations (retrieval + generation)
    Ask {
        /// Ingredients, optionally with filter:CATEGORY and | free text
        query: String,

        /// Number of recipes to retrieve
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Interactive query loop
    Repl,

    /// Show vector store statistics
    Stats,
}
