//! Entity codec.
//!
//! Pure functions for converting between domain records and flat items.
//! These are testable in isolation without a store.

use crate::poll::{EntityType, Event, PollOption, Question};

use super::error::{RepositoryError, Result};
use super::item::{AttrValue, Item};
use super::keys::{attr, ItemKey};

/// One stored item, decoded into the record kind its `entity_type` names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Event(Event),
    Question(Question),
    Option(PollOption),
}

impl Record {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Record::Event(_) => EntityType::Event,
            Record::Question(_) => EntityType::Question,
            Record::Option(_) => EntityType::Option,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Event(e) => &e.id,
            Record::Question(q) => &q.id,
            Record::Option(o) => &o.id,
        }
    }

    /// The canonical key pair, derived from the record's ids.
    pub fn key(&self) -> ItemKey {
        match self {
            Record::Event(e) => ItemKey::event(&e.id),
            Record::Question(q) => ItemKey::question(&q.id, &q.event_id),
            Record::Option(o) => ItemKey::option(&o.id, &o.question_id),
        }
    }
}

/// Encode any record into its stored item.
pub fn encode(record: &Record) -> Item {
    match record {
        Record::Event(e) => event_to_item(e),
        Record::Question(q) => question_to_item(q),
        Record::Option(o) => option_to_item(o),
    }
}

/// Decode an item into the record kind named by its `entity_type`.
pub fn decode(item: &Item) -> Result<Record> {
    let entity_type: EntityType = get_string(item, attr::ENTITY_TYPE)?.parse()?;
    match entity_type {
        EntityType::Event => item_to_event(item).map(Record::Event),
        EntityType::Question => item_to_question(item).map(Record::Question),
        EntityType::Option => item_to_option(item).map(Record::Option),
    }
}

// ============================================================================
// Event conversions
// ============================================================================

/// Convert an Event to a stored item. `questions` is never written.
pub fn event_to_item(event: &Event) -> Item {
    let mut item = keyed_item(&ItemKey::event(&event.id), EntityType::Event);

    item.insert(attr::ID.to_string(), AttrValue::S(event.id.clone()));
    item.insert(attr::NAME.to_string(), AttrValue::S(event.name.clone()));

    item
}

/// Convert a stored item to an Event with no questions.
pub fn item_to_event(item: &Item) -> Result<Event> {
    expect_entity_type(item, EntityType::Event)?;

    let id = get_string(item, attr::ID)?;
    let key = ItemKey::event(&id);
    check_key(item, &key)?;

    Ok(Event {
        name: get_string(item, attr::NAME)?,
        questions: Vec::new(),
        key: Some(key),
        id,
    })
}

// ============================================================================
// Question conversions
// ============================================================================

/// Convert a Question to a stored item. `options` is never written.
pub fn question_to_item(question: &Question) -> Item {
    let mut item = keyed_item(
        &ItemKey::question(&question.id, &question.event_id),
        EntityType::Question,
    );

    item.insert(attr::ID.to_string(), AttrValue::S(question.id.clone()));
    item.insert(
        attr::EVENT_ID.to_string(),
        AttrValue::S(question.event_id.clone()),
    );
    item.insert(attr::TEXT.to_string(), AttrValue::S(question.text.clone()));

    item
}

/// Convert a stored item to a Question with no options.
pub fn item_to_question(item: &Item) -> Result<Question> {
    expect_entity_type(item, EntityType::Question)?;

    let id = get_string(item, attr::ID)?;
    let event_id = get_string(item, attr::EVENT_ID)?;
    let key = ItemKey::question(&id, &event_id);
    check_key(item, &key)?;

    Ok(Question {
        text: get_string(item, attr::TEXT)?,
        options: Vec::new(),
        key: Some(key),
        id,
        event_id,
    })
}

// ============================================================================
// Option conversions
// ============================================================================

/// Convert a PollOption to a stored item.
pub fn option_to_item(option: &PollOption) -> Item {
    let mut item = keyed_item(
        &ItemKey::option(&option.id, &option.question_id),
        EntityType::Option,
    );

    item.insert(attr::ID.to_string(), AttrValue::S(option.id.clone()));
    item.insert(
        attr::QUESTION_ID.to_string(),
        AttrValue::S(option.question_id.clone()),
    );
    item.insert(attr::TEXT.to_string(), AttrValue::S(option.text.clone()));
    // Stored counts only grow through i64 increments, so a count past
    // i64::MAX never comes from the table; saturate rather than wrap.
    item.insert(
        attr::VOTES.to_string(),
        AttrValue::N(i64::try_from(option.votes).unwrap_or(i64::MAX)),
    );

    item
}

/// Convert a stored item to a PollOption.
pub fn item_to_option(item: &Item) -> Result<PollOption> {
    expect_entity_type(item, EntityType::Option)?;

    let id = get_string(item, attr::ID)?;
    let question_id = get_string(item, attr::QUESTION_ID)?;
    let key = ItemKey::option(&id, &question_id);
    check_key(item, &key)?;

    Ok(PollOption {
        text: get_string(item, attr::TEXT)?,
        votes: get_votes(item)?,
        key: Some(key),
        id,
        question_id,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn keyed_item(key: &ItemKey, entity_type: EntityType) -> Item {
    let mut item = Item::new();
    item.insert(attr::PK.to_string(), AttrValue::S(key.pk().to_string()));
    item.insert(attr::SK.to_string(), AttrValue::S(key.sk().to_string()));
    item.insert(
        attr::ENTITY_TYPE.to_string(),
        AttrValue::S(entity_type.as_str().to_string()),
    );
    item
}

/// Get a required string attribute.
fn get_string(item: &Item, key: &str) -> Result<String> {
    item.get(key)
        .and_then(AttrValue::as_s)
        .map(str::to_string)
        .ok_or_else(|| RepositoryError::MalformedRecord(format!("Missing or invalid field: {key}")))
}

fn get_votes(item: &Item) -> Result<u64> {
    let votes = item.get(attr::VOTES).and_then(AttrValue::as_n).ok_or_else(|| {
        RepositoryError::MalformedRecord(format!("Missing or invalid field: {}", attr::VOTES))
    })?;

    u64::try_from(votes)
        .map_err(|_| RepositoryError::MalformedRecord(format!("Negative vote count: {votes}")))
}

fn expect_entity_type(item: &Item, expected: EntityType) -> Result<()> {
    let found: EntityType = get_string(item, attr::ENTITY_TYPE)?.parse()?;
    if found != expected {
        return Err(RepositoryError::MalformedRecord(format!(
            "Expected {expected} item, found {found}"
        )));
    }
    Ok(())
}

/// The stored key pair must be exactly the one derived from the ids.
fn check_key(item: &Item, key: &ItemKey) -> Result<()> {
    let pk = get_string(item, attr::PK)?;
    let sk = get_string(item, attr::SK)?;
    if pk != key.pk() || sk != key.sk() {
        return Err(RepositoryError::MalformedRecord(format!(
            "Key pair {pk}/{sk} does not match derived {}/{}",
            key.pk(),
            key.sk()
        )));
    }
    Ok(())
}
