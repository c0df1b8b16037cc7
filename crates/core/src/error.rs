use crate::types::DbId;
use crate::validation::FieldViolation;

/// Boxed lower-layer failure carried as an error source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a persistence adapter.
///
/// Adapters wrap their driver errors here so the core never depends on a
/// particular database client.
#[derive(Debug, thiserror::Error)]
#[error("Store error: {source}")]
pub struct StoreError {
    #[source]
    source: BoxError,
}

impl StoreError {
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A required identifier or parameter is missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A bulk lookup matched none of the requested ids.
    #[error("Entity not found: no {entity} matched ids {ids:?}")]
    NoneFound { entity: &'static str, ids: Vec<DbId> },

    /// The entity failed its field constraints. Carries every violation.
    #[error("Validation failed for {entity}: {} violation(s)", violations.len())]
    Validation {
        entity: &'static str,
        violations: Vec<FieldViolation>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A lower-layer failure during delete or audit, with the cause kept.
    #[error("{context}")]
    Unexpected {
        context: String,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Wrap any failure as [`CoreError::Unexpected`] with a description.
    pub fn unexpected(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CoreError::Unexpected {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// Reject non-positive identifiers before any lookup is attempted.
pub fn require_id(name: &str, id: DbId) -> Result<DbId, CoreError> {
    if id <= 0 {
        return Err(CoreError::InvalidInput(format!(
            "{name} must be a positive identifier, got {id}"
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn require_id_rejects_zero_and_negative() {
        assert!(require_id("project_id", 0).is_err());
        assert!(require_id("project_id", -3).is_err());
        assert_eq!(require_id("project_id", 7).unwrap(), 7);
    }

    #[test]
    fn unexpected_keeps_its_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = CoreError::unexpected("Failed to delete project 4", cause);

        assert_eq!(err.to_string(), "Failed to delete project 4");
        let source = err.source().expect("source should be preserved");
        assert_eq!(source.to_string(), "disk gone");
    }

    #[test]
    fn store_error_converts_transparently() {
        let err: CoreError = StoreError::new("connection reset").into();
        assert_eq!(err.to_string(), "Store error: connection reset");
    }
}
