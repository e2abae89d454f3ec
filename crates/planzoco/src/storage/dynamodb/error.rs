//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `planzoco_core::storage`.
//! Transport failures and throttling become `StoreUnavailable`; everything
//! else is a `QueryFailed`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use planzoco_core::storage::RepositoryError;

fn throttled() -> RepositoryError {
    RepositoryError::StoreUnavailable("Throughput exceeded, please retry".to_string())
}

fn request_limit() -> RepositoryError {
    RepositoryError::StoreUnavailable("Request limit exceeded, please retry".to_string())
}

fn table_not_found() -> RepositoryError {
    RepositoryError::QueryFailed("Table not found".to_string())
}

fn internal() -> RepositoryError {
    RepositoryError::QueryFailed("DynamoDB internal server error".to_string())
}

/// The request never got a response from the service.
pub fn transport_error<E, R>(err: &SdkError<E, R>) -> Option<RepositoryError> {
    match err {
        SdkError::DispatchFailure(_) => Some(RepositoryError::StoreUnavailable(
            "Could not reach DynamoDB".to_string(),
        )),
        SdkError::TimeoutError(_) => Some(RepositoryError::StoreUnavailable(
            "DynamoDB request timed out".to_string(),
        )),
        _ => None,
    }
}

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => table_not_found(),
        GetItemError::ProvisionedThroughputExceededException(_) => throttled(),
        GetItemError::RequestLimitExceeded(_) => request_limit(),
        GetItemError::InternalServerError(_) => internal(),
        err => RepositoryError::QueryFailed(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => table_not_found(),
        QueryError::ProvisionedThroughputExceededException(_) => throttled(),
        QueryError::RequestLimitExceeded(_) => request_limit(),
        QueryError::InternalServerError(_) => internal(),
        err => RepositoryError::QueryFailed(format!("Query failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to RepositoryError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => table_not_found(),
        PutItemError::ProvisionedThroughputExceededException(_) => throttled(),
        PutItemError::RequestLimitExceeded(_) => request_limit(),
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            RepositoryError::QueryFailed("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => internal(),
        err => RepositoryError::QueryFailed(format!("PutItem failed: {:?}", err)),
    }
}

/// Map an UpdateItem SDK error to RepositoryError.
///
/// Conditional check failures are handled by the caller before mapping.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        UpdateItemError::ResourceNotFoundException(_) => table_not_found(),
        UpdateItemError::ProvisionedThroughputExceededException(_) => throttled(),
        UpdateItemError::RequestLimitExceeded(_) => request_limit(),
        UpdateItemError::ItemCollectionSizeLimitExceededException(_) => {
            RepositoryError::QueryFailed("Item collection size limit exceeded".to_string())
        }
        UpdateItemError::TransactionConflictException(_) => {
            RepositoryError::QueryFailed("Transaction conflict, please retry".to_string())
        }
        UpdateItemError::InternalServerError(_) => internal(),
        err => RepositoryError::QueryFailed(format!("UpdateItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to RepositoryError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
) -> RepositoryError {
    if let Some(mapped) = transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => table_not_found(),
        DeleteItemError::ProvisionedThroughputExceededException(_) => throttled(),
        DeleteItemError::RequestLimitExceeded(_) => request_limit(),
        DeleteItemError::TransactionConflictException(_) => {
            RepositoryError::QueryFailed("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => internal(),
        err => RepositoryError::QueryFailed(format!("DeleteItem failed: {:?}", err)),
    }
}

/// True when an UpdateItem was rejected by its `attribute_exists` condition.
pub fn is_conditional_failure<R>(err: &SdkError<UpdateItemError, R>) -> bool {
    err.as_service_error()
        .map(|e| e.is_conditional_check_failed_exception())
        .unwrap_or(false)
}
