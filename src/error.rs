use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Reference chart has no usable rows")]
    EmptyReference,
    #[error("File processing error: {0}")]
    FileProcessing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("DataFrame error: {0}")]
    DataFrame(#[from] polars::error::PolarsError),
    #[error("Config error: {0}")]
    Config(String),
}
