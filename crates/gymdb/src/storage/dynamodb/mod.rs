//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the `Store` trait
//! using `aws-sdk-dynamodb`, plus table provisioning for the CLI.

mod conversions;
mod error;
mod expressions;
mod retry;
mod store;
pub mod table;

pub use retry::RetryConfig;
pub use store::{create_client, DynamoDbStore};
