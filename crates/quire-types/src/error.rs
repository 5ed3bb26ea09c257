use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid area slug '{0}': expected page-slug:areaname")]
    InvalidAreaSlug(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
