//! Domain-level error types.

use thiserror::Error;

/// Domain errors - the outcomes a use case can end with besides success.
///
/// `Denied`, `NotFound` and `Validation` are expected outcomes that callers
/// render as user-facing notices. `InternalInconsistency` means a storage
/// invariant was broken by a collaborator and must abort the operation.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Denied: {0}")]
    Denied(String),

    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }

    pub fn denied(notice: impl Into<String>) -> Self {
        Self::Denied(notice.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "resource",
                key: String::new(),
            },
            RepoError::Constraint(msg) => DomainError::Validation(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_violation_is_a_validation_failure() {
        let err: DomainError = RepoError::Constraint("slug already taken".to_string()).into();
        assert!(matches!(err, DomainError::Validation(msg) if msg == "slug already taken"));
    }

    #[test]
    fn test_query_failure_is_internal() {
        let err: DomainError = RepoError::Query("timeout".to_string()).into();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
