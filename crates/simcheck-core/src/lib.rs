pub mod config;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod intake;
pub mod matcher;
pub mod normalize;
pub mod preprocess;
pub mod progress;
pub mod score;
pub mod store;

pub use config::AppConfig;
pub use engine::{CompareEngine, RunReport};
pub use error::Error;
pub use matcher::{MatchBlock, SequenceMatcher};
pub use normalize::Dialect;
pub use progress::{ProgressFile, ProgressReporter, ProgressSnapshot, SilentReporter};
pub use score::{MatchDetail, SimilarityResult};
