//! Storage layer.
//!
//! [`SingleTableRepository`] implements the repository traits from
//! `planzoco_core::storage` over any key-value store:
//!
//! - `dynamodb` (default feature): the shared DynamoDB table
//! - `inmemory`: a process-local map, always available for tests
//!
//! # Examples
//!
//! Build without the DynamoDB backend:
//! ```bash
//! cargo build -p planzoco --no-default-features
//! ```

#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod inmemory;
mod single_table;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStore;
pub use inmemory::InMemoryStore;
pub use single_table::SingleTableRepository;
