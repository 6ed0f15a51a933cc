//! DynamoDB store implementation.
//!
//! Implements the `Store` trait from `gymdb_core::storage` using DynamoDB.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeValue, Delete, DeleteRequest, Put, PutRequest, TransactWriteItem, WriteRequest,
};
use aws_sdk_dynamodb::Client;

use gymdb_core::storage::{
    BatchWrite, Condition, Consistency, Item, ItemKey, RangeQuery, Store, StoreError, StoreResult,
    TransactWrite, Update,
};

use super::conversions::{attributes_to_item, item_to_attributes, key_to_attributes};
use super::error::{
    map_batch_write_error, map_build_error, map_delete_item_error, map_get_item_error,
    map_put_item_error, map_query_error, map_transact_write_error, map_update_item_error,
};
use super::expressions::{condition_expression, key_condition_expression, update_expression};
use super::retry::RetryConfig;
use crate::config::Config;

/// DynamoDB accepts at most 25 requests per BatchWriteItem call.
const MAX_BATCH_SIZE: usize = 25;

/// DynamoDB-based store implementation.
///
/// Every entity lives in one table addressed by `PK` and `SK`.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
    retry: RetryConfig,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            retry: RetryConfig::default(),
        }
    }

    /// Creates a new store from application configuration.
    ///
    /// Uses the AWS SDK default credential chain.
    pub async fn from_config(config: &Config) -> Self {
        let client = create_client(config).await;
        Self::new(client, &config.table_name)
            .with_retry(RetryConfig::default().with_max_retries(config.batch_max_retries))
    }

    /// Sets how unprocessed batch writes are resubmitted.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Get the underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn write_request(&self, write: BatchWrite) -> StoreResult<WriteRequest> {
        Ok(match write {
            BatchWrite::Put(item) => WriteRequest::builder()
                .put_request(
                    PutRequest::builder()
                        .set_item(Some(item_to_attributes(&item)))
                        .build()
                        .map_err(map_build_error)?,
                )
                .build(),
            BatchWrite::Delete(key) => WriteRequest::builder()
                .delete_request(
                    DeleteRequest::builder()
                        .set_key(Some(key_to_attributes(&key)))
                        .build()
                        .map_err(map_build_error)?,
                )
                .build(),
        })
    }

    fn transact_item(&self, write: TransactWrite) -> StoreResult<TransactWriteItem> {
        Ok(match write {
            TransactWrite::Put { item, condition } => TransactWriteItem::builder()
                .put(
                    Put::builder()
                        .table_name(&self.table_name)
                        .set_item(Some(item_to_attributes(&item)))
                        .set_condition_expression(condition_expression(condition).map(String::from))
                        .build()
                        .map_err(map_build_error)?,
                )
                .build(),
            TransactWrite::Delete { key, condition } => TransactWriteItem::builder()
                .delete(
                    Delete::builder()
                        .table_name(&self.table_name)
                        .set_key(Some(key_to_attributes(&key)))
                        .set_condition_expression(condition_expression(condition).map(String::from))
                        .build()
                        .map_err(map_build_error)?,
                )
                .build(),
        })
    }

    /// Sends one BatchWriteItem call, resubmitting unprocessed requests with backoff.
    async fn send_batch(&self, mut requests: Vec<WriteRequest>) -> StoreResult<()> {
        let mut attempt = 0;

        loop {
            let output = self
                .client
                .batch_write_item()
                .request_items(&self.table_name, requests)
                .send()
                .await
                .map_err(map_batch_write_error)?;

            requests = output
                .unprocessed_items
                .and_then(|mut unprocessed| unprocessed.remove(&self.table_name))
                .unwrap_or_default();

            if requests.is_empty() {
                return Ok(());
            }

            if attempt >= self.retry.max_retries {
                return Err(StoreError::Unprocessed(requests.len()));
            }

            let delay = self.retry.calculate_delay(attempt);
            tracing::warn!(
                unprocessed = requests.len(),
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                "Resubmitting unprocessed batch writes"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Creates a DynamoDB client for the configured region and endpoint.
pub async fn create_client(config: &Config) -> Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}

#[async_trait]
impl Store for DynamoDbStore {
    async fn get_item(
        &self,
        key: &ItemKey,
        consistency: Consistency,
    ) -> StoreResult<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_attributes(key)))
            .consistent_read(consistency.is_strong())
            .send()
            .await
            .map_err(map_get_item_error)?;

        match result.item {
            Some(attributes) => Ok(Some(attributes_to_item(&attributes)?)),
            None => Ok(None),
        }
    }

    async fn put_item(&self, item: Item, condition: Condition) -> StoreResult<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_attributes(&item)))
            .set_condition_expression(condition_expression(condition).map(String::from))
            .send()
            .await
            .map_err(map_put_item_error)?;

        Ok(())
    }

    async fn update_item(
        &self,
        key: &ItemKey,
        update: Update,
        condition: Condition,
    ) -> StoreResult<()> {
        if update.is_empty() {
            return Err(StoreError::Other("Update has no changes".to_string()));
        }
        let built = update_expression(&update);

        self.client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_attributes(key)))
            .update_expression(built.expression)
            .set_expression_attribute_names(Some(built.names))
            .set_expression_attribute_values(Some(built.values))
            .set_condition_expression(condition_expression(condition).map(String::from))
            .send()
            .await
            .map_err(map_update_item_error)?;

        Ok(())
    }

    async fn delete_item(&self, key: &ItemKey, condition: Condition) -> StoreResult<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_attributes(key)))
            .set_condition_expression(condition_expression(condition).map(String::from))
            .send()
            .await
            .map_err(map_delete_item_error)?;

        Ok(())
    }

    async fn batch_write(&self, writes: Vec<BatchWrite>) -> StoreResult<()> {
        let requests = writes
            .into_iter()
            .map(|write| self.write_request(write))
            .collect::<StoreResult<Vec<_>>>()?;

        for chunk in requests.chunks(MAX_BATCH_SIZE) {
            self.send_batch(chunk.to_vec()).await?;
        }

        Ok(())
    }

    async fn transact_write(&self, writes: Vec<TransactWrite>) -> StoreResult<()> {
        let items = writes
            .into_iter()
            .map(|write| self.transact_item(write))
            .collect::<StoreResult<Vec<_>>>()?;

        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await
            .map_err(map_transact_write_error)?;

        Ok(())
    }

    async fn query(&self, query: &RangeQuery) -> StoreResult<Vec<Item>> {
        let condition = key_condition_expression(&query.pk, &query.sk);
        let mut items = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression(condition.expression)
                .set_expression_attribute_values(Some(condition.values.clone()))
                .consistent_read(query.consistency.is_strong())
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(map_query_error)?;

            for attributes in result.items.unwrap_or_default() {
                items.push(attributes_to_item(&attributes)?);
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => return Ok(items),
            }
        }
    }
}
