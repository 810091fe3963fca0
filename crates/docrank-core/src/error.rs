use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No usable documents (or no indexable terms) at build time.
    #[error("Corpus has no usable documents")]
    EmptyCorpus,

    /// The word-vector table could not be loaded. Only the semantic path is affected.
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Unknown scoring method '{0}' (expected 'lexical' or 'semantic')")]
    InvalidMethod(String),

    #[error("top_k must be at least 1, got {0}")]
    InvalidTopK(usize),

    #[error("Vector dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Index persistence failed for {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },
}

impl Error {
    /// Errors caused by the caller's request rather than by the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidMethod(_) | Error::InvalidTopK(_) | Error::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
