use thiserror::Error;

/// Why a single write inside a canceled transaction was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancellationReason {
    /// The write did not cause the cancellation.
    None,
    ConditionalCheckFailed,
    /// Any other store code, e.g. `TransactionConflict` or `ThrottlingError`.
    Other(String),
}

impl CancellationReason {
    /// Parses a store cancellation code.
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            None | Some("None") => CancellationReason::None,
            Some("ConditionalCheckFailed") => CancellationReason::ConditionalCheckFailed,
            Some(other) => CancellationReason::Other(other.to_string()),
        }
    }
}

/// Errors reported by a [`Store`](super::Store) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A single-item precondition did not hold.
    #[error("Conditional check failed")]
    ConditionFailed,
    /// A transaction was rejected as a whole. Reasons are in request order.
    #[error("Transaction canceled: {reasons:?}")]
    TransactionCanceled { reasons: Vec<CancellationReason> },
    #[error("Throttled: {0}")]
    Throttled(String),
    /// Batch writes the store still refused after every retry.
    #[error("{0} batch writes left unprocessed")]
    Unprocessed(usize),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Store request failed: {0}")]
    Other(String),
}

impl StoreError {
    /// True when a precondition failed.
    ///
    /// A transaction counts as soon as any write failed its precondition,
    /// even if a sibling write also hit a conflict: retrying cannot succeed.
    pub fn is_condition_failure(&self) -> bool {
        match self {
            StoreError::ConditionFailed => true,
            StoreError::TransactionCanceled { reasons } => reasons
                .iter()
                .any(|r| *r == CancellationReason::ConditionalCheckFailed),
            _ => false,
        }
    }

    /// Whether the write at `index` of a canceled transaction failed its precondition.
    pub fn condition_failed_at(&self, index: usize) -> bool {
        match self {
            StoreError::TransactionCanceled { reasons } => {
                reasons.get(index) == Some(&CancellationReason::ConditionalCheckFailed)
            }
            _ => false,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_reason_from_code() {
        assert_eq!(CancellationReason::from_code(None), CancellationReason::None);
        assert_eq!(
            CancellationReason::from_code(Some("None")),
            CancellationReason::None
        );
        assert_eq!(
            CancellationReason::from_code(Some("ConditionalCheckFailed")),
            CancellationReason::ConditionalCheckFailed
        );
        assert_eq!(
            CancellationReason::from_code(Some("TransactionConflict")),
            CancellationReason::Other("TransactionConflict".to_string())
        );
    }

    #[test]
    fn test_condition_failure_detection() {
        assert!(StoreError::ConditionFailed.is_condition_failure());

        let duplicate = StoreError::TransactionCanceled {
            reasons: vec![
                CancellationReason::None,
                CancellationReason::ConditionalCheckFailed,
            ],
        };
        assert!(duplicate.is_condition_failure());
        assert!(duplicate.condition_failed_at(1));
        assert!(!duplicate.condition_failed_at(0));

        let mixed = StoreError::TransactionCanceled {
            reasons: vec![
                CancellationReason::ConditionalCheckFailed,
                CancellationReason::Other("TransactionConflict".to_string()),
            ],
        };
        assert!(mixed.is_condition_failure());

        let conflict = StoreError::TransactionCanceled {
            reasons: vec![
                CancellationReason::None,
                CancellationReason::Other("TransactionConflict".to_string()),
            ],
        };
        assert!(!conflict.is_condition_failure());

        assert!(!StoreError::Throttled("slow down".to_string()).is_condition_failure());
    }
}
