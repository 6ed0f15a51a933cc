//! Storage backend implementations.
//!
//! This module provides concrete implementations of the `Store` trait
//! defined in `gymdb_core::storage`.
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB storage backend using `aws-sdk-dynamodb`
//!
//! The in-memory backend is always compiled; the repository tests run
//! against it.

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;

pub use inmemory::MemoryStore;
