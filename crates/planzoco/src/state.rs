//! Process-scoped application state.
//!
//! Built once at startup around a single store handle and passed explicitly
//! to every command.

use std::sync::Arc;

use planzoco_core::storage::{
    DeletionRecovery, EventRepository, KeyValueStore, OptionRepository, QuestionRepository,
};

use crate::storage::{InMemoryStore, SingleTableRepository};

/// Shared repositories, all backed by the same store.
#[derive(Clone)]
pub struct AppState {
    pub event_repo: Arc<dyn EventRepository>,
    pub question_repo: Arc<dyn QuestionRepository>,
    pub option_repo: Arc<dyn OptionRepository>,
    pub recovery: Arc<dyn DeletionRecovery>,
}

impl AppState {
    /// Creates state over the given store.
    pub fn new<S: KeyValueStore + 'static>(store: S) -> Self {
        let repo = Arc::new(SingleTableRepository::new(store));
        Self {
            event_repo: repo.clone(),
            question_repo: repo.clone(),
            option_repo: repo.clone(),
            recovery: repo,
        }
    }

    /// Creates state over an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new())
    }
}
