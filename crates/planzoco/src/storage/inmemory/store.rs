//! In-memory key-value store implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use planzoco_core::storage::{
    attr, AttrValue, IndexQuery, Item, ItemKey, KeyValueStore, RepositoryError, Result,
};

type TableKey = (String, String);

/// In-memory stand-in for the shared table.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    items: Arc<RwLock<HashMap<TableKey, Item>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items currently stored.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

fn table_key(key: &ItemKey) -> TableKey {
    (key.pk().to_string(), key.sk().to_string())
}

fn item_key(item: &Item) -> Result<TableKey> {
    let pk = item.get(attr::PK).and_then(AttrValue::as_s);
    let sk = item.get(attr::SK).and_then(AttrValue::as_s);
    match (pk, sk) {
        (Some(pk), Some(sk)) => Ok((pk.to_string(), sk.to_string())),
        _ => Err(RepositoryError::QueryFailed(
            "Item is missing its pk/sk key pair".to_string(),
        )),
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn put_item(&self, item: Item) -> Result<()> {
        let key = item_key(&item)?;
        self.items.write().await.insert(key, item);
        Ok(())
    }

    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(&table_key(key)).cloned())
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<()> {
        self.items.write().await.remove(&table_key(key));
        Ok(())
    }

    async fn query(&self, query: &IndexQuery) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        let mut matches: Vec<(&TableKey, &Item)> =
            items.iter().filter(|(_, item)| query.matches(item)).collect();
        // Stable order, like a range key would give.
        matches.sort_by(|a, b| a.0.cmp(b.0));
        Ok(matches.into_iter().map(|(_, item)| item.clone()).collect())
    }

    async fn set_attributes(&self, key: &ItemKey, attributes: Item) -> Result<bool> {
        let mut items = self.items.write().await;
        match items.get_mut(&table_key(key)) {
            Some(item) => {
                item.extend(attributes);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment(&self, key: &ItemKey, attribute: &str, delta: i64) -> Result<Option<i64>> {
        let mut items = self.items.write().await;
        let Some(item) = items.get_mut(&table_key(key)) else {
            return Ok(None);
        };

        let current = match item.get(attribute) {
            None => 0,
            Some(AttrValue::N(n)) => *n,
            Some(other) => {
                return Err(RepositoryError::QueryFailed(format!(
                    "Cannot increment non-numeric attribute {attribute}: {other:?}"
                )))
            }
        };
        let next = current.saturating_add(delta);
        item.insert(attribute.to_string(), AttrValue::N(next));
        Ok(Some(next))
    }
}
