//! User registration.

use std::sync::Arc;

use gymdb_core::codec;
use gymdb_core::models::{LoginRecord, NewUser};
use gymdb_core::storage::{Condition, Store, TransactWrite, Update};
use gymdb_core::{DataError, Result};

use super::error::store_failure;

/// Registers users, keeping usernames and emails globally unique.
///
/// Uniqueness is enforced by the store: the email reservation, the metadata
/// row and the email claim are written in one transaction, each guarded by
/// a does-not-exist precondition.
pub struct Registrar<S: Store> {
    store: Arc<S>,
}

impl<S: Store> Clone for Registrar<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> Registrar<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Writes the email reservation, metadata and email claim rows, or none.
    ///
    /// Fails with `DuplicateUser` when either the username or the email is
    /// taken; the store does not say which.
    #[tracing::instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register(&self, user: &NewUser) -> Result<()> {
        let writes = vec![
            TransactWrite::Put {
                item: codec::email_reservation_item(&user.email, &user.username),
                condition: Condition::NotExists,
            },
            TransactWrite::Put {
                item: codec::user_metadata_to_item(&user.to_metadata())?,
                condition: Condition::NotExists,
            },
            TransactWrite::Put {
                item: codec::email_claim_item(&user.email, &user.username),
                condition: Condition::NotExists,
            },
        ];

        match self.store.transact_write(writes).await {
            Ok(()) => {
                tracing::info!("Registered user");
                Ok(())
            }
            Err(err) if err.is_condition_failure() => {
                tracing::debug!("Username or email already taken");
                Err(DataError::DuplicateUser)
            }
            Err(err) => Err(store_failure("register", err)),
        }
    }

    /// Appends a login to the user's history.
    #[tracing::instrument(skip(self))]
    pub async fn record_login(&self, username: &str, ip: &str, iat: i64) -> Result<()> {
        let record = codec::login_record_value(&LoginRecord {
            iat,
            ip: ip.to_string(),
        })?;
        let update = Update::new().append(
            [codec::USER_ATTRIBUTE, codec::LOGIN_HISTORY_ATTRIBUTE],
            vec![record],
        );

        match self
            .store
            .update_item(&codec::metadata_key(username), update, Condition::Exists)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) if err.is_condition_failure() => Err(DataError::NotFound {
                entity_type: "User",
                id: username.to_string(),
            }),
            Err(err) => Err(store_failure("record_login", err)),
        }
    }
}
