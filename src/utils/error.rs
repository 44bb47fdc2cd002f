// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode), // e.g., 500 Internal Server Error

    #[error("Status page not found: {0}")]
    PageNotFound(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Section '{0}' has no table element")]
    TableNotFound(String),

    #[error("Table has no rows where category/header rows were expected")]
    MissingHeaderRows,

    #[error("Malformed row in category '{category}': expected {expected} bed fields, got {got} (tokens: {tokens:?})")]
    RowShape {
        category: String,
        expected: usize,
        got: usize,
        tokens: Vec<String>,
    },

    #[error("Non-numeric bed count '{value}' in category '{category}'")]
    NumericParse { category: String, value: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Fetching the status page failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
