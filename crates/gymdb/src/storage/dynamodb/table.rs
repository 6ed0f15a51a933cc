//! Table provisioning (Imperative Shell).
//!
//! Creates and drops the single table every entity lives in. Only the
//! composite `PK`/`SK` string key is defined; all other attributes are
//! schemaless.

use std::time::Duration;

use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;
use thiserror::Error;

use super::conversions::{PK, SK};

/// Result type alias for table operations.
pub type Result<T> = std::result::Result<T, TableError>;

/// Errors that can occur while provisioning the table.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Timeout waiting for table '{0}' to become active")]
    ActivationTimeout(String),
}

/// What `ensure_table` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    Created,
    AlreadyExists,
}

/// What `drop_table` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Deleted,
    AlreadyGone,
}

/// Returns the table status, or `None` if the table does not exist.
pub async fn table_status(client: &Client, table_name: &str) -> Result<Option<TableStatus>> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(response) => Ok(Some(
            response
                .table()
                .and_then(|t| t.table_status())
                .cloned()
                .unwrap_or(TableStatus::Active),
        )),
        Err(err) => match err.into_service_error() {
            DescribeTableError::ResourceNotFoundException(_) => Ok(None),
            err => Err(TableError::AwsSdk(err.to_string())),
        },
    }
}

/// Creates the table if missing and waits until it is active.
pub async fn ensure_table(client: &Client, table_name: &str) -> Result<TableOutcome> {
    if table_status(client, table_name).await?.is_some() {
        tracing::info!(table = %table_name, "Table already exists");
        wait_for_table_active(client, table_name).await?;
        return Ok(TableOutcome::AlreadyExists);
    }

    create_table(client, table_name).await?;
    wait_for_table_active(client, table_name).await?;
    tracing::info!(table = %table_name, "Created table");
    Ok(TableOutcome::Created)
}

/// Deletes the table if present.
pub async fn drop_table(client: &Client, table_name: &str) -> Result<DropOutcome> {
    if table_status(client, table_name).await?.is_none() {
        return Ok(DropOutcome::AlreadyGone);
    }

    client
        .delete_table()
        .table_name(table_name)
        .send()
        .await
        .map_err(|e| TableError::AwsSdk(e.to_string()))?;

    tracing::info!(table = %table_name, "Deleted table");
    Ok(DropOutcome::Deleted)
}

async fn create_table(client: &Client, table_name: &str) -> Result<()> {
    let mut key_schema = Vec::with_capacity(2);
    let mut attribute_definitions = Vec::with_capacity(2);

    for (name, key_type) in [(PK, KeyType::Hash), (SK, KeyType::Range)] {
        key_schema.push(
            KeySchemaElement::builder()
                .attribute_name(name)
                .key_type(key_type)
                .build()
                .map_err(|e| TableError::AwsSdk(e.to_string()))?,
        );
        attribute_definitions.push(
            AttributeDefinition::builder()
                .attribute_name(name)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(|e| TableError::AwsSdk(e.to_string()))?,
        );
    }

    client
        .create_table()
        .table_name(table_name)
        .set_key_schema(Some(key_schema))
        .set_attribute_definitions(Some(attribute_definitions))
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await
        .map_err(|e| TableError::AwsSdk(e.to_string()))?;

    Ok(())
}

async fn wait_for_table_active(client: &Client, table_name: &str) -> Result<()> {
    let max_attempts = 60;
    let delay = Duration::from_secs(2);

    for _ in 0..max_attempts {
        if let Some(TableStatus::Active) = table_status(client, table_name).await? {
            return Ok(());
        }
        tokio::time::sleep(delay).await;
    }

    Err(TableError::ActivationTimeout(table_name.to_string()))
}
