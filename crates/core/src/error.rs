use thiserror::Error;

/// Outcomes callers branch on when a data-access operation does not succeed.
///
/// Store-specific failures never leak through this type: anything that is
/// not a precondition or decoding failure is reported as [`DataError::Transient`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataError {
    /// Username or email already registered. Which of the two collided is not known.
    #[error("Username or email already signed up")]
    DuplicateUser,
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Malformed key {key}: {reason}")]
    MalformedKey { key: String, reason: String },
    #[error("Malformed item: {0}")]
    MalformedItem(String),
    #[error("Transient store failure: {0}")]
    Transient(String),
}

impl DataError {
    /// Only transient failures are worth retrying (with backoff).
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::Transient(_))
    }
}

/// Result type for data-access operations.
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_user_display() {
        assert_eq!(
            DataError::DuplicateUser.to_string(),
            "Username or email already signed up"
        );
    }

    #[test]
    fn test_not_found_display() {
        let error = DataError::NotFound {
            entity_type: "Workout",
            id: "alice/leg day".to_string(),
        };
        assert_eq!(error.to_string(), "Workout not found: alice/leg day");
    }

    #[test]
    fn test_already_exists_display() {
        let error = DataError::AlreadyExists {
            entity_type: "Workout",
            id: "alice/leg day".to_string(),
        };
        assert_eq!(error.to_string(), "Workout already exists: alice/leg day");
    }

    #[test]
    fn test_malformed_key_display() {
        let error = DataError::MalformedKey {
            key: "MEAL#alice".to_string(),
            reason: "expected `WORKOUT#alice#<name>`".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed key MEAL#alice: expected `WORKOUT#alice#<name>`"
        );
    }

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(DataError::Transient("throttled".to_string()).is_retryable());
        assert!(!DataError::DuplicateUser.is_retryable());
        assert!(!DataError::MalformedItem("missing user".to_string()).is_retryable());
        assert!(!DataError::NotFound {
            entity_type: "UserMetadata",
            id: "alice".to_string()
        }
        .is_retryable());
    }
}
