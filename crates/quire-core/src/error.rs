use quire_store::StoreError;

use crate::permissions::Action;

/// Errors from core operations.
///
/// Absence is never an error: lookups return `Option`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An area slug did not have the `pageSlug:areaName` shape.
    #[error("area slugs must be page-based (page-slug:areaname), got {0:?}")]
    InvalidSlugFormat(String),

    /// The permission checker refused the mutation.
    #[error("permission denied: {action} on {target}")]
    PermissionDenied { action: Action, target: String },

    /// A slug or path collision that could not be resolved.
    #[error("slug conflict on {slug} after {attempts} attempt(s)")]
    Conflict { slug: String, attempts: u32 },

    /// Failure reported by the storage layer.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl CoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use quire_store::UniqueField;

    #[test]
    fn error_display() {
        let err = CoreError::Conflict {
            slug: "/about".into(),
            attempts: 10,
        };
        assert_eq!(err.to_string(), "slug conflict on /about after 10 attempt(s)");

        let err = CoreError::PermissionDenied {
            action: Action::EditPage,
            target: "/secret".into(),
        };
        assert_eq!(err.to_string(), "permission denied: edit-page on /secret");
    }

    #[test]
    fn storage_errors_convert() {
        let err: CoreError = StoreError::UniqueViolation {
            field: UniqueField::Slug,
            value: "/a".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Storage(ref e) if e.is_unique_violation()));
        assert!(!err.is_conflict());
    }
}
