//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between SDK `AttributeValue` maps and store items.
//! These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use planzoco_core::storage::{attr, AttrValue, Item, ItemKey, RepositoryError, Result};

pub type SdkItem = HashMap<String, AttributeValue>;

pub fn to_attribute_value(value: &AttrValue) -> AttributeValue {
    match value {
        AttrValue::S(s) => AttributeValue::S(s.clone()),
        AttrValue::N(n) => AttributeValue::N(n.to_string()),
        AttrValue::Bool(b) => AttributeValue::Bool(*b),
    }
}

/// Convert an SDK value, rejecting types the table never stores.
pub fn from_attribute_value(name: &str, value: &AttributeValue) -> Result<AttrValue> {
    match value {
        AttributeValue::S(s) => Ok(AttrValue::S(s.clone())),
        AttributeValue::N(n) => n.parse::<i64>().map(AttrValue::N).map_err(|_| {
            RepositoryError::MalformedRecord(format!("Invalid number in field {name}: {n}"))
        }),
        AttributeValue::Bool(b) => Ok(AttrValue::Bool(*b)),
        other => Err(RepositoryError::MalformedRecord(format!(
            "Unsupported attribute type in field {name}: {other:?}"
        ))),
    }
}

/// Convert a store item to a DynamoDB item.
pub fn item_to_sdk(item: &Item) -> SdkItem {
    item.iter()
        .map(|(name, value)| (name.clone(), to_attribute_value(value)))
        .collect()
}

/// Convert a DynamoDB item to a store item.
pub fn sdk_to_item(item: &SdkItem) -> Result<Item> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), from_attribute_value(name, value)?)))
        .collect()
}

/// The primary key map for GetItem, DeleteItem and UpdateItem.
pub fn key_to_sdk(key: &ItemKey) -> SdkItem {
    HashMap::from([
        (attr::PK.to_string(), AttributeValue::S(key.pk().to_string())),
        (attr::SK.to_string(), AttributeValue::S(key.sk().to_string())),
    ])
}
