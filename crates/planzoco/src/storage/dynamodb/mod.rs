//! DynamoDB store backend.
//!
//! Implements [`KeyValueStore`](planzoco_core::storage::KeyValueStore) over
//! `aws-sdk-dynamodb` and provisions the shared table with its three indexes.

mod conversions;
mod error;
mod schema;
mod store;

pub use schema::ensure_table;
pub use store::DynamoDbStore;
