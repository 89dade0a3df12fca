use config::{Config, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_preprocessed_dir")]
    pub preprocessed_dir: PathBuf,
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
    #[serde(default = "default_progress_path")]
    pub progress_path: PathBuf,
    /// Per-file upload cap in MiB.
    #[serde(default = "default_max_file_size_mib")]
    pub max_file_size_mib: u64,
    /// Worker pool size for both pipeline phases. 0 means one per logical core.
    #[serde(default)]
    pub worker_threads: usize,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}

fn default_preprocessed_dir() -> PathBuf {
    PathBuf::from("data/preprocessed")
}

fn default_results_path() -> PathBuf {
    PathBuf::from("data/results/similarity_results.csv")
}

fn default_progress_path() -> PathBuf {
    PathBuf::from("data/progress.json")
}

fn default_max_file_size_mib() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            preprocessed_dir: default_preprocessed_dir(),
            results_path: default_results_path(),
            progress_path: default_progress_path(),
            max_file_size_mib: default_max_file_size_mib(),
            worker_threads: 0,
        }
    }
}

impl AppConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mib * 1024 * 1024
    }
}

pub fn load_configuration() -> Result<AppConfig, Error> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    Ok(builder.try_deserialize::<AppConfig>()?)
}
