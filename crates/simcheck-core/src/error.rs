use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Results table error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid upload '{file}': {reason}")]
    InvalidUpload { file: String, reason: String },

    #[error("Upload directory {} does not exist", .0.display())]
    MissingUploadDir(PathBuf),

    #[error("No usable input files after preprocessing")]
    NoUsableFiles,
}
