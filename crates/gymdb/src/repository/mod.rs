//! Data-access components built on a [`Store`].
//!
//! Each component translates domain operations into keyed store requests
//! and store outcomes into [`DataError`](gymdb_core::DataError).

mod error;
mod profile;
mod registrar;
mod workouts;

use std::sync::Arc;

use gymdb_core::storage::Store;

pub use profile::ProfileReader;
pub use registrar::Registrar;
pub use workouts::WorkoutRepository;

use crate::config::Config;

/// All components sharing one store, configured from [`Config`].
pub struct Repositories<S: Store> {
    pub registrar: Registrar<S>,
    pub workouts: WorkoutRepository<S>,
    pub profiles: ProfileReader<S>,
}

impl<S: Store> Repositories<S> {
    pub fn new(store: Arc<S>, config: &Config) -> Self {
        Self {
            registrar: Registrar::new(Arc::clone(&store)),
            workouts: WorkoutRepository::new(Arc::clone(&store))
                .with_rename_mode(config.rename_mode())
                .with_consistency(config.read_consistency()),
            profiles: ProfileReader::new(store).with_consistency(config.read_consistency()),
        }
    }
}
