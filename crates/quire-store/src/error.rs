use std::fmt;

/// Field whose uniqueness constraint was violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniqueField {
    Id,
    Slug,
    Path,
    RedirectFrom,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => write!(f, "id"),
            Self::Slug => write!(f, "slug"),
            Self::Path => write!(f, "path"),
            Self::RedirectFrom => write!(f, "from"),
        }
    }
}

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A write would break a uniqueness constraint.
    #[error("duplicate {field}: {value}")]
    UniqueViolation { field: UniqueField, value: String },

    /// A lock guarding the backend was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Opaque failure reported by the persistence layer.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether retrying with a different slug or path could succeed.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
