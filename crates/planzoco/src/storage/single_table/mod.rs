//! Single-table data-access layer.
//!
//! Maps the Event -> Question -> Option hierarchy onto one flat table through
//! any [`KeyValueStore`](planzoco_core::storage::KeyValueStore). Nested
//! collections are rebuilt by fan-out queries on read and deletes cascade
//! leaf-first on write.

mod repository;

pub use repository::SingleTableRepository;
