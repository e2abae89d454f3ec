//! Key derivation for the single-table design.
//!
//! Pure functions for generating partition and sort keys. Every item's key pair
//! is derived from its entity type and ids; nothing else may set it.
//!
//! | Entity   | pk                 | sk                    |
//! |----------|--------------------|-----------------------|
//! | Event    | `EVENT#<id>`       | `EVENT#<id>`          |
//! | Question | `QUESTION#<id>`    | `EVENT#<event_id>`    |
//! | Option   | `OPTION#<id>`      | `QUESTION#<qid>`      |

use crate::poll::EntityType;

/// Attribute names shared by every item in the table.
pub mod attr {
    pub const PK: &str = "pk";
    pub const SK: &str = "sk";
    pub const ID: &str = "id";
    pub const ENTITY_TYPE: &str = "entity_type";
    pub const NAME: &str = "name";
    pub const TEXT: &str = "text";
    pub const EVENT_ID: &str = "event_id";
    pub const QUESTION_ID: &str = "question_id";
    pub const VOTES: &str = "votes";
    /// Set on a parent while its cascading delete is in progress.
    pub const DELETING: &str = "deleting";
}

/// Builds a key component: `<ENTITY_TYPE>#<id>`.
pub fn make_key(entity_type: EntityType, id: &str) -> String {
    format!("{}#{id}", entity_type.as_str())
}

/// The composite primary key of an item.
///
/// Fields are private so a key pair can only come from the derivation rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pk: String,
    sk: String,
}

impl ItemKey {
    /// Pattern: `EVENT#<id>` / `EVENT#<id>`
    pub fn event(id: &str) -> Self {
        Self {
            pk: make_key(EntityType::Event, id),
            sk: make_key(EntityType::Event, id),
        }
    }

    /// Pattern: `QUESTION#<id>` / `EVENT#<event_id>`
    pub fn question(id: &str, event_id: &str) -> Self {
        Self {
            pk: make_key(EntityType::Question, id),
            sk: make_key(EntityType::Event, event_id),
        }
    }

    /// Pattern: `OPTION#<id>` / `QUESTION#<question_id>`
    pub fn option(id: &str, question_id: &str) -> Self {
        Self {
            pk: make_key(EntityType::Option, id),
            sk: make_key(EntityType::Question, question_id),
        }
    }

    pub fn pk(&self) -> &str {
        &self.pk
    }

    pub fn sk(&self) -> &str {
        &self.sk
    }
}

/// Secondary indexes the data-access layer queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    /// Hash `entity_type`, range `pk`: list by type, or find one by type + id.
    EntityType,
    /// Hash `event_id`: questions of an event.
    EventId,
    /// Hash `question_id`: options of a question.
    QuestionId,
}

impl Index {
    pub const ALL: [Index; 3] = [Index::EntityType, Index::EventId, Index::QuestionId];

    /// Physical index name in the table.
    pub fn name(&self) -> &'static str {
        match self {
            Index::EntityType => "EntityTypeIndex",
            Index::EventId => "EventIDIndex",
            Index::QuestionId => "QuestionIDIndex",
        }
    }

    /// Attribute the index is partitioned on.
    pub fn partition_attribute(&self) -> &'static str {
        match self {
            Index::EntityType => attr::ENTITY_TYPE,
            Index::EventId => attr::EVENT_ID,
            Index::QuestionId => attr::QUESTION_ID,
        }
    }

    /// Attribute the index is sorted on, if any.
    pub fn sort_attribute(&self) -> Option<&'static str> {
        match self {
            Index::EntityType => Some(attr::PK),
            Index::EventId | Index::QuestionId => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_key() {
        assert_eq!(make_key(EntityType::Event, "aB3xYz"), "EVENT#aB3xYz");
        assert_eq!(make_key(EntityType::Question, "q1"), "QUESTION#q1");
        assert_eq!(make_key(EntityType::Option, "o1"), "OPTION#o1");
    }

    #[test]
    fn test_event_key_is_self_referencing() {
        let key = ItemKey::event("ev1");
        assert_eq!(key.pk(), "EVENT#ev1");
        assert_eq!(key.sk(), "EVENT#ev1");
    }

    #[test]
    fn test_question_key_points_at_event() {
        let key = ItemKey::question("q1", "ev1");
        assert_eq!(key.pk(), "QUESTION#q1");
        assert_eq!(key.sk(), "EVENT#ev1");
    }

    #[test]
    fn test_option_key_points_at_question() {
        let key = ItemKey::option("o1", "q1");
        assert_eq!(key.pk(), "OPTION#o1");
        assert_eq!(key.sk(), "QUESTION#q1");
    }

    #[test]
    fn test_index_names_and_attributes() {
        assert_eq!(Index::EntityType.name(), "EntityTypeIndex");
        assert_eq!(Index::EntityType.partition_attribute(), "entity_type");
        assert_eq!(Index::EntityType.sort_attribute(), Some("pk"));
        assert_eq!(Index::EventId.name(), "EventIDIndex");
        assert_eq!(Index::EventId.sort_attribute(), None);
        assert_eq!(Index::QuestionId.partition_attribute(), "question_id");
    }
}
