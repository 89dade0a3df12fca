use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "simcheck")]
#[command(about = "Source-code similarity checker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate and copy source files into the upload store
    Upload {
        /// Files to ingest; the whole batch is rejected if any file fails
        /// validation
        #[arg(required = true)]
        files: Vec<std::path::PathBuf>,
    },
    /// Preprocess all uploads, score every file pair and save the results table
    Run,
    /// Print a position-aligned highlight rendering for two preprocessed files
    Highlight {
        /// First file name, as uploaded
        file_a: String,
        /// Second file name, as uploaded
        file_b: String,
    },
    /// Show the progress snapshot of the current or most recent run
    Progress,
    /// Print configuration values
    PrintConfig,
    /// Delete all uploads, preprocessed artifacts and results
    Clear,
}
