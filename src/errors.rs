use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid UTF-8 in file {file}")]
    InvalidUtf8 { file: PathBuf },
}

#[derive(Debug, Error)]
pub enum SmasherError {
    #[error("Invalid input folder: {}", .0.display())]
    InvalidRoot(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config {file}: {message}")]
    Config { file: PathBuf, message: String },

    #[error("Invalid --exclude pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
