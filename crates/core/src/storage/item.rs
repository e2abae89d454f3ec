//! Store-agnostic item model.

use std::collections::HashMap;

use super::keys::Index;

/// A scalar attribute value as the store holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    S(String),
    N(i64),
    Bool(bool),
}

impl AttrValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttrValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<i64> {
        match self {
            AttrValue::N(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::S(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::S(value)
    }
}

/// A flat item: attribute name to value.
pub type Item = HashMap<String, AttrValue>;

/// An equality query against one secondary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    pub index: Index,
    /// Value of the index's partition attribute.
    pub partition: AttrValue,
    /// Value of the index's sort attribute, when the index has one.
    pub sort: Option<AttrValue>,
    /// Equality post-filters on non-key attributes.
    pub filters: Vec<(String, AttrValue)>,
}

impl IndexQuery {
    /// Query `index` for items whose partition attribute equals `partition`.
    pub fn new(index: Index, partition: impl Into<AttrValue>) -> Self {
        Self {
            index,
            partition: partition.into(),
            sort: None,
            filters: Vec::new(),
        }
    }

    /// Narrow the query to one sort-key value.
    pub fn with_sort(mut self, sort: impl Into<AttrValue>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Add an equality filter applied after the key condition.
    pub fn filter(mut self, attribute: &str, value: impl Into<AttrValue>) -> Self {
        self.filters.push((attribute.to_string(), value.into()));
        self
    }

    /// True if `item` satisfies the key condition and every filter.
    ///
    /// Stores without native index support evaluate queries with this.
    pub fn matches(&self, item: &Item) -> bool {
        let partition_attr = self.index.partition_attribute();
        if item.get(partition_attr) != Some(&self.partition) {
            return false;
        }

        if let Some(sort) = &self.sort {
            let Some(sort_attr) = self.index.sort_attribute() else {
                return false;
            };
            if item.get(sort_attr) != Some(sort) {
                return false;
            }
        }

        self.filters
            .iter()
            .all(|(name, value)| item.get(name) == Some(value))
    }
}
