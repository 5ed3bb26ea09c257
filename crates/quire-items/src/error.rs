/// Errors raised while configuring item types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("item type already registered: {0}")]
    DuplicateType(String),

    #[error("invalid item type name '{0}': must be nonempty and contain no whitespace")]
    InvalidTypeName(String),
}
