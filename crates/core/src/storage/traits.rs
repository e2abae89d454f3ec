use async_trait::async_trait;
use serde::Serialize;

use crate::poll::{EntityType, Event, PollOption, Question};

use super::{IndexQuery, Item, ItemKey, Result};

/// Raw item operations against the shared table.
///
/// Implementations map their native failures into `RepositoryError`
/// (`StoreUnavailable` for transport problems, `QueryFailed` otherwise).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Upserts an item by its full key pair.
    async fn put_item(&self, item: Item) -> Result<()>;

    /// Reads an item by its exact key pair.
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>>;

    /// Deletes an item. Deleting an absent item succeeds.
    async fn delete_item(&self, key: &ItemKey) -> Result<()>;

    /// Returns every item matching an index query.
    async fn query(&self, query: &IndexQuery) -> Result<Vec<Item>>;

    /// Overwrites the given attributes on an existing item.
    ///
    /// Returns `false` without writing when no item has this key.
    async fn set_attributes(&self, key: &ItemKey, attributes: Item) -> Result<bool>;

    /// Atomically adds `delta` to a numeric attribute of an existing item.
    ///
    /// Returns the new value, or `None` when no item has this key.
    async fn increment(&self, key: &ItemKey, attribute: &str, delta: i64) -> Result<Option<i64>>;
}

/// Repository for event operations.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Writes an event, replacing any event with the same id.
    async fn create_event(&self, event: &Event) -> Result<Event>;

    /// Gets an event with its questions and their options.
    async fn get_event(&self, id: &str) -> Result<Option<Event>>;

    /// Replaces an event's stored item.
    async fn update_event(&self, event: &Event) -> Result<Event>;

    /// Deletes an event with all of its questions and options.
    async fn delete_event(&self, id: &str) -> Result<()>;

    /// Lists every event, each with its questions populated best-effort.
    async fn list_events(&self) -> Result<Vec<Event>>;
}

/// Repository for question operations.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Adds a question under an event.
    async fn add_question(&self, event_id: &str, question: &Question) -> Result<Question>;

    /// Gets a question with its options.
    async fn get_question(&self, id: &str) -> Result<Option<Question>>;

    /// Gets a question together with its parent event, if the event still exists.
    ///
    /// A missing event yields `Some((question, None))`. An error while
    /// fetching the event is returned as `Err`, and the question read
    /// before it is not returned.
    async fn get_question_with_event(&self, id: &str)
        -> Result<Option<(Question, Option<Event>)>>;

    /// Updates a question's text, re-deriving its key pair when missing.
    async fn update_question(&self, question: &Question) -> Result<Question>;

    /// Deletes a question with all of its options.
    async fn delete_question(&self, id: &str) -> Result<()>;

    /// Lists the questions of an event, each with its options populated best-effort.
    async fn list_questions_by_event(&self, event_id: &str) -> Result<Vec<Question>>;
}

/// Repository for option operations.
#[async_trait]
pub trait OptionRepository: Send + Sync {
    /// Adds an option under a question with zero votes.
    async fn add_option(&self, question_id: &str, option: &PollOption) -> Result<PollOption>;

    async fn get_option(&self, id: &str) -> Result<Option<PollOption>>;

    /// Updates an option's text. Never writes the vote count.
    async fn update_option(&self, option: &PollOption) -> Result<PollOption>;

    async fn delete_option(&self, id: &str) -> Result<()>;

    /// Atomically records one vote and returns the updated option.
    async fn vote_option(&self, id: &str) -> Result<PollOption>;

    async fn list_options_by_question(&self, question_id: &str) -> Result<Vec<PollOption>>;
}

/// A cascade that started but never finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingDeletion {
    pub entity_type: EntityType,
    pub id: String,
}

/// Reporting and resumption of interrupted cascading deletes.
#[async_trait]
pub trait DeletionRecovery: Send + Sync {
    /// Lists events and questions still carrying the deletion marker.
    async fn pending_deletions(&self) -> Result<Vec<PendingDeletion>>;

    /// Re-runs every interrupted cascade, events first.
    ///
    /// Returns how many cascades completed.
    async fn resume_deletions(&self) -> Result<usize>;
}
