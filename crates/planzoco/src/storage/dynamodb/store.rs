//! DynamoDB key-value store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use planzoco_core::storage::{
    attr, IndexQuery, Item, ItemKey, KeyValueStore, RepositoryError, Result,
};

use super::conversions::{item_to_sdk, key_to_sdk, sdk_to_item, to_attribute_value};
use super::error::{
    is_conditional_failure, map_delete_item_error, map_get_item_error, map_put_item_error,
    map_query_error, map_update_item_error,
};
use crate::config::Config;

/// DynamoDB-backed store for the shared table.
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    /// Creates a new store with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a store from resolved configuration.
    ///
    /// Uses the AWS SDK default credential chain. A configured endpoint URL
    /// points the client at a local DynamoDB instead of AWS.
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), config.table_name.clone())
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Expression strings and placeholders for one Query request.
#[derive(Debug)]
struct QueryExpressions {
    key_condition: String,
    filter: Option<String>,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

/// Builds the key condition and filter expressions for an index query.
///
/// Attribute names go through placeholders so reserved words are safe.
fn query_expressions(query: &IndexQuery) -> QueryExpressions {
    let mut names = HashMap::from([(
        "#hk".to_string(),
        query.index.partition_attribute().to_string(),
    )]);
    let mut values = HashMap::from([(":hk".to_string(), to_attribute_value(&query.partition))]);
    let mut key_condition = "#hk = :hk".to_string();

    if let (Some(sort), Some(sort_attr)) = (&query.sort, query.index.sort_attribute()) {
        names.insert("#rk".to_string(), sort_attr.to_string());
        values.insert(":rk".to_string(), to_attribute_value(sort));
        key_condition.push_str(" AND #rk = :rk");
    }

    let mut filters = Vec::new();
    for (i, (name, value)) in query.filters.iter().enumerate() {
        names.insert(format!("#f{i}"), name.clone());
        values.insert(format!(":f{i}"), to_attribute_value(value));
        filters.push(format!("#f{i} = :f{i}"));
    }
    let filter = (!filters.is_empty()).then(|| filters.join(" AND "));

    QueryExpressions {
        key_condition,
        filter,
        names,
        values,
    }
}

#[async_trait]
impl KeyValueStore for DynamoDbStore {
    async fn put_item(&self, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_sdk(&item)))
            .send()
            .await
            .map_err(map_put_item_error)?;

        Ok(())
    }

    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_sdk(key)))
            .send()
            .await
            .map_err(map_get_item_error)?;

        match result.item {
            Some(item) => Ok(Some(sdk_to_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_sdk(key)))
            .send()
            .await
            .map_err(map_delete_item_error)?;

        Ok(())
    }

    async fn query(&self, query: &IndexQuery) -> Result<Vec<Item>> {
        let QueryExpressions {
            key_condition,
            filter,
            names,
            values,
        } = query_expressions(query);
        let mut items = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(query.index.name())
                .key_condition_expression(&key_condition)
                .set_filter_expression(filter.clone())
                .set_expression_attribute_names(Some(names.clone()))
                .set_expression_attribute_values(Some(values.clone()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(map_query_error)?;

            for item in result.items() {
                items.push(sdk_to_item(item)?);
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        tracing::debug!(index = query.index.name(), count = items.len(), "Queried index");
        Ok(items)
    }

    async fn set_attributes(&self, key: &ItemKey, attributes: Item) -> Result<bool> {
        if attributes.is_empty() {
            return Ok(self.get_item(key).await?.is_some());
        }

        let mut names = HashMap::new();
        let mut values = HashMap::new();
        let mut assignments = Vec::new();
        for (i, (name, value)) in attributes.iter().enumerate() {
            names.insert(format!("#a{i}"), name.clone());
            values.insert(format!(":a{i}"), to_attribute_value(value));
            assignments.push(format!("#a{i} = :a{i}"));
        }
        names.insert("#pk".to_string(), attr::PK.to_string());

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_sdk(key)))
            .update_expression(format!("SET {}", assignments.join(", ")))
            .condition_expression("attribute_exists(#pk)")
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_conditional_failure(&err) => Ok(false),
            Err(err) => Err(map_update_item_error(err)),
        }
    }

    async fn increment(&self, key: &ItemKey, attribute: &str, delta: i64) -> Result<Option<i64>> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_sdk(key)))
            .update_expression("ADD #attr :delta")
            .condition_expression("attribute_exists(#pk)")
            .expression_attribute_names("#attr", attribute)
            .expression_attribute_names("#pk", attr::PK)
            .expression_attribute_values(":delta", AttributeValue::N(delta.to_string()))
            .return_values(aws_sdk_dynamodb::types::ReturnValue::UpdatedNew)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) if is_conditional_failure(&err) => return Ok(None),
            Err(err) => return Err(map_update_item_error(err)),
        };

        let value = output
            .attributes
            .as_ref()
            .and_then(|attributes| attributes.get(attribute))
            .and_then(|value| value.as_n().ok())
            .and_then(|n| n.parse::<i64>().ok())
            .ok_or_else(|| {
                RepositoryError::MalformedRecord(format!(
                    "UpdateItem returned no numeric {attribute}"
                ))
            })?;

        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planzoco_core::storage::Index;

    #[test]
    fn test_type_index_expressions() {
        let query = IndexQuery::new(Index::EntityType, "QUESTION").with_sort("QUESTION#q1");
        let QueryExpressions {
            key_condition,
            filter,
            names,
            values,
        } = query_expressions(&query);

        assert_eq!(key_condition, "#hk = :hk AND #rk = :rk");
        assert!(filter.is_none());
        assert_eq!(names.get("#hk").map(String::as_str), Some("entity_type"));
        assert_eq!(names.get("#rk").map(String::as_str), Some("pk"));
        assert_eq!(
            values.get(":rk"),
            Some(&AttributeValue::S("QUESTION#q1".to_string()))
        );
    }

    #[test]
    fn test_filtered_query_expressions() {
        let query = IndexQuery::new(Index::EventId, "ev1").filter(attr::ENTITY_TYPE, "QUESTION");
        let QueryExpressions {
            key_condition,
            filter,
            names,
            values,
        } = query_expressions(&query);

        assert_eq!(key_condition, "#hk = :hk");
        assert_eq!(filter.as_deref(), Some("#f0 = :f0"));
        assert_eq!(names.get("#f0").map(String::as_str), Some("entity_type"));
        assert_eq!(values.len(), 2);
    }
}
