use thiserror::Error;

use common::error::Error as EngineError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigLoadError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV source selected but no --csv path was given.")]
    MissingCsvPath,

    #[error("No currencies given. Pass a comma-separated list, e.g. USD,EUR,JPY.")]
    NoCurrencies,

    #[error("Graph processing error: {0}")]
    GraphError(#[from] EngineError),
}
