//! Single-table data access for users and their workouts.
//!
//! The pure pieces (keys, models, item codec, store contract) live in
//! `gymdb_core`. This crate adds the store backends and the components
//! that run domain operations against them.

pub mod config;
pub mod repository;
pub mod storage;

pub use config::Config;
pub use repository::{ProfileReader, Registrar, Repositories, WorkoutRepository};
