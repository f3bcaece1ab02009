//! sf-results: results artifact and report file storage.

pub mod output;
pub mod report;
pub mod types;

pub use output::{SnapshotWriter, read_artifact};
pub use report::ReportFile;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Results artifact error: {message}")]
    Artifact { message: String },
}
