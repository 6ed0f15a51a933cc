//! Functional core of gymdb: single-table key scheme, domain models, the
//! store contract and the item codec. Nothing in this crate performs I/O.

pub mod codec;
pub mod error;
pub mod keys;
pub mod models;
pub mod plan;
pub mod storage;

pub use error::{DataError, Result};
