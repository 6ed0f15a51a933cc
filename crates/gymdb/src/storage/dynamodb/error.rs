//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `gymdb_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use gymdb_core::storage::{CancellationReason, StoreError};

/// Map failures that never reached the service (timeouts, dispatch errors).
fn map_transport_error<E, R>(err: &SdkError<E, R>) -> Option<StoreError> {
    match err {
        SdkError::TimeoutError(_) => Some(StoreError::Unavailable(
            "Request to DynamoDB timed out".to_string(),
        )),
        SdkError::DispatchFailure(_) => Some(StoreError::Unavailable(
            "Could not reach DynamoDB".to_string(),
        )),
        _ => None,
    }
}

fn throughput_exceeded() -> StoreError {
    StoreError::Throttled("Throughput exceeded, please retry".to_string())
}

fn request_limit_exceeded() -> StoreError {
    StoreError::Throttled("Request limit exceeded, please retry".to_string())
}

fn internal_server_error() -> StoreError {
    StoreError::Unavailable("DynamoDB internal server error".to_string())
}

fn table_not_found() -> StoreError {
    StoreError::Other("Table not found".to_string())
}

/// Map a GetItem SDK error to StoreError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => table_not_found(),
        GetItemError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        GetItemError::RequestLimitExceeded(_) => request_limit_exceeded(),
        GetItemError::InternalServerError(_) => internal_server_error(),
        err => StoreError::Other(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a Query SDK error to StoreError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => table_not_found(),
        QueryError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        QueryError::RequestLimitExceeded(_) => request_limit_exceeded(),
        QueryError::InternalServerError(_) => internal_server_error(),
        err => StoreError::Other(format!("Query failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to StoreError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => StoreError::ConditionFailed,
        PutItemError::ResourceNotFoundException(_) => table_not_found(),
        PutItemError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        PutItemError::RequestLimitExceeded(_) => request_limit_exceeded(),
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::Other("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            StoreError::Other("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => internal_server_error(),
        err => StoreError::Other(format!("PutItem failed: {:?}", err)),
    }
}

/// Map an UpdateItem SDK error to StoreError.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        UpdateItemError::ConditionalCheckFailedException(_) => StoreError::ConditionFailed,
        UpdateItemError::ResourceNotFoundException(_) => table_not_found(),
        UpdateItemError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        UpdateItemError::RequestLimitExceeded(_) => request_limit_exceeded(),
        UpdateItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::Other("Item collection size limit exceeded".to_string())
        }
        UpdateItemError::TransactionConflictException(_) => {
            StoreError::Other("Transaction conflict, please retry".to_string())
        }
        UpdateItemError::InternalServerError(_) => internal_server_error(),
        err => StoreError::Other(format!("UpdateItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        DeleteItemError::ConditionalCheckFailedException(_) => StoreError::ConditionFailed,
        DeleteItemError::ResourceNotFoundException(_) => table_not_found(),
        DeleteItemError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        DeleteItemError::RequestLimitExceeded(_) => request_limit_exceeded(),
        DeleteItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::Other("Item collection size limit exceeded".to_string())
        }
        DeleteItemError::TransactionConflictException(_) => {
            StoreError::Other("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => internal_server_error(),
        err => StoreError::Other(format!("DeleteItem failed: {:?}", err)),
    }
}

/// Map a BatchWriteItem SDK error to StoreError.
pub fn map_batch_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        BatchWriteItemError::ResourceNotFoundException(_) => table_not_found(),
        BatchWriteItemError::ProvisionedThroughputExceededException(_) => throughput_exceeded(),
        BatchWriteItemError::RequestLimitExceeded(_) => request_limit_exceeded(),
        BatchWriteItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::Other("Item collection size limit exceeded".to_string())
        }
        BatchWriteItemError::InternalServerError(_) => internal_server_error(),
        err => StoreError::Other(format!("BatchWriteItem failed: {:?}", err)),
    }
}

/// Map a TransactWriteItems SDK error to StoreError.
///
/// Cancellations keep the per-item reasons so callers can tell a failed
/// precondition from a conflict.
pub fn map_transact_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<TransactWriteItemsError, R>,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        TransactWriteItemsError::TransactionCanceledException(e) => {
            StoreError::TransactionCanceled {
                reasons: e
                    .cancellation_reasons()
                    .iter()
                    .map(|r| CancellationReason::from_code(r.code()))
                    .collect(),
            }
        }
        TransactWriteItemsError::TransactionInProgressException(_) => {
            StoreError::Other("Transaction in progress, please retry".to_string())
        }
        TransactWriteItemsError::IdempotentParameterMismatchException(_) => {
            StoreError::Other("Idempotent parameter mismatch".to_string())
        }
        TransactWriteItemsError::ResourceNotFoundException(_) => table_not_found(),
        TransactWriteItemsError::ProvisionedThroughputExceededException(_) => {
            throughput_exceeded()
        }
        TransactWriteItemsError::RequestLimitExceeded(_) => request_limit_exceeded(),
        TransactWriteItemsError::InternalServerError(_) => internal_server_error(),
        err => StoreError::Other(format!("TransactWriteItems failed: {:?}", err)),
    }
}

/// Map a request-building error to StoreError.
pub fn map_build_error(err: impl std::fmt::Display) -> StoreError {
    StoreError::Serialization(err.to_string())
}
