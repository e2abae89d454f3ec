//! In-memory store backend for testing.
//!
//! Keeps every item in a `HashMap` keyed by `(pk, sk)` behind `Arc<RwLock<_>>`
//! and evaluates index queries by attribute equality. Nothing is persisted.
//!
//! # Example
//!
//! ```rust,ignore
//! use planzoco::storage::{inmemory::InMemoryStore, SingleTableRepository};
//!
//! let repo = SingleTableRepository::new(InMemoryStore::new());
//! ```

mod store;

pub use store::InMemoryStore;
