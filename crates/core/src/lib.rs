//! planzoco_core - domain types and the single-table storage model.
//!
//! Everything in this crate is pure: records, validation, key derivation,
//! the entity codec and the traits the storage shell implements.

pub mod poll;
pub mod storage;
