use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::storage::{ItemKey, RepositoryError};

/// Discriminant stored on every item of the shared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityType {
    Event,
    Question,
    Option,
}

impl EntityType {
    /// Returns the wire representation used in keys and the type index.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Event => "EVENT",
            EntityType::Question => "QUESTION",
            EntityType::Option => "OPTION",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::Event => "Event",
            EntityType::Question => "Question",
            EntityType::Option => "Option",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EVENT" => Ok(EntityType::Event),
            "QUESTION" => Ok(EntityType::Question),
            "OPTION" => Ok(EntityType::Option),
            other => Err(RepositoryError::MalformedRecord(format!(
                "Unknown entity type: {other}"
            ))),
        }
    }
}

/// A planning event. The root of the Event -> Question -> Option hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    /// Populated by fan-out on read, never persisted on the event item.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub questions: Vec<Question>,
    /// Canonical key pair, `None` until the record is anchored in the table.
    #[serde(skip)]
    pub key: Option<ItemKey>,
}

impl Event {
    /// Creates an event with its canonical key pair.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            key: Some(ItemKey::event(&id)),
            id,
            name: name.into(),
            questions: Vec::new(),
        }
    }

    /// Creates an event without a key pair, as received from a form.
    pub fn draft(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            questions: Vec::new(),
            key: None,
        }
    }
}

/// A question asked within an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub event_id: String,
    pub text: String,
    /// Populated by fan-out on read, never persisted on the question item.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PollOption>,
    #[serde(skip)]
    pub key: Option<ItemKey>,
}

impl Question {
    /// Creates a question under `event_id` with its canonical key pair.
    pub fn new(
        id: impl Into<String>,
        event_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let event_id = event_id.into();
        Self {
            key: Some(ItemKey::question(&id, &event_id)),
            id,
            event_id,
            text: text.into(),
            options: Vec::new(),
        }
    }

    /// Creates a keyless question carrying only an id and new text.
    ///
    /// The parent event is unknown; updates re-derive it from the stored record.
    pub fn draft(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            event_id: String::new(),
            text: text.into(),
            options: Vec::new(),
            key: None,
        }
    }

    /// Returns every option tied for the highest vote count.
    pub fn winning_options(&self) -> Vec<&PollOption> {
        super::operations::winning_options(&self.options)
    }
}

/// A multiple-choice answer to a question.
///
/// Named `PollOption` to stay clear of `std::option::Option`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub question_id: String,
    pub text: String,
    #[serde(default)]
    pub votes: u64,
    #[serde(skip)]
    pub key: Option<ItemKey>,
}

impl PollOption {
    /// Creates an option under `question_id` with zero votes.
    pub fn new(
        id: impl Into<String>,
        question_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let id = id.into();
        let question_id = question_id.into();
        Self {
            key: Some(ItemKey::option(&id, &question_id)),
            id,
            question_id,
            text: text.into(),
            votes: 0,
        }
    }

    /// Creates a keyless option carrying only an id and new text.
    pub fn draft(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question_id: String::new(),
            text: text.into(),
            votes: 0,
            key: None,
        }
    }

    /// Sets the vote count (useful for testing).
    pub fn with_votes(mut self, votes: u64) -> Self {
        self.votes = votes;
        self
    }
}
