//! Translation of store outcomes into the data-access error taxonomy.
//!
//! Precondition failures are translated by each operation since their
//! meaning depends on which row was guarded. Everything else ends here.

use gymdb_core::storage::StoreError;
use gymdb_core::DataError;

/// Normalizes an unexpected store failure into `DataError`.
///
/// Undecodable rows keep their fatal class; every other store fault becomes
/// `Transient` after being logged.
pub fn store_failure(operation: &'static str, err: StoreError) -> DataError {
    match err {
        StoreError::Serialization(reason) => {
            tracing::error!(operation, %reason, "Store returned an undecodable row");
            DataError::MalformedItem(reason)
        }
        err => {
            tracing::error!(operation, error = %err, "Store operation failed");
            DataError::Transient(err.to_string())
        }
    }
}
