//! planzoco - events, questions and votes over a single DynamoDB table.
//!
//! The pure model lives in `planzoco_core`; this crate is the shell around it:
//! the single-table data-access layer, the concrete stores, configuration
//! and the operator CLI.

pub mod cli;
pub mod commands;
pub mod config;
pub mod id;
pub mod output;
pub mod state;
pub mod storage;
