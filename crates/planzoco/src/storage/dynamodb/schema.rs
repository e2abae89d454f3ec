//! Table provisioning.

use std::time::Duration;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, IndexStatus, KeySchemaElement,
    KeyType, Projection, ProjectionType, ScalarAttributeType, TableStatus,
};
use aws_sdk_dynamodb::Client;

use planzoco_core::storage::{attr, Index, RepositoryError, Result};

use super::error::transport_error;

const ACTIVATION_ATTEMPTS: u32 = 60;
const ACTIVATION_DELAY: Duration = Duration::from_secs(2);

/// Every attribute used as a table or index key, in definition order.
pub fn key_attributes() -> Vec<&'static str> {
    let mut names = vec![attr::PK, attr::SK];
    for index in Index::ALL {
        for name in std::iter::once(index.partition_attribute()).chain(index.sort_attribute()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn sdk_error(err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::QueryFailed(err.to_string())
}

fn key_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(sdk_error)
}

fn index_definition(index: Index) -> Result<GlobalSecondaryIndex> {
    let mut key_schema = vec![key_element(index.partition_attribute(), KeyType::Hash)?];
    if let Some(sort) = index.sort_attribute() {
        key_schema.push(key_element(sort, KeyType::Range)?);
    }

    GlobalSecondaryIndex::builder()
        .index_name(index.name())
        .set_key_schema(Some(key_schema))
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::All)
                .build(),
        )
        .build()
        .map_err(sdk_error)
}

/// Creates the table with its indexes unless it already exists.
///
/// Returns `true` when the table was created and is now active.
pub async fn ensure_table(client: &Client, table_name: &str) -> Result<bool> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(_) => {
            tracing::debug!(table = table_name, "Table already exists");
            return Ok(false);
        }
        Err(err)
            if err
                .as_service_error()
                .map(|e| e.is_resource_not_found_exception())
                .unwrap_or(false) => {}
        Err(err) => {
            return Err(transport_error(&err)
                .unwrap_or_else(|| sdk_error(format!("DescribeTable failed: {err:?}"))));
        }
    }

    create_table(client, table_name).await?;
    wait_for_table_active(client, table_name).await?;

    tracing::info!(table = table_name, "Created table");
    Ok(true)
}

async fn create_table(client: &Client, table_name: &str) -> Result<()> {
    let attribute_definitions = key_attributes()
        .into_iter()
        .map(|name| {
            AttributeDefinition::builder()
                .attribute_name(name)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(sdk_error)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut request = client
        .create_table()
        .table_name(table_name)
        .key_schema(key_element(attr::PK, KeyType::Hash)?)
        .key_schema(key_element(attr::SK, KeyType::Range)?)
        .set_attribute_definitions(Some(attribute_definitions))
        .billing_mode(BillingMode::PayPerRequest);

    for index in Index::ALL {
        request = request.global_secondary_indexes(index_definition(index)?);
    }

    request.send().await.map_err(|err| {
        transport_error(&err).unwrap_or_else(|| sdk_error(format!("CreateTable failed: {err:?}")))
    })?;
    Ok(())
}

async fn wait_for_table_active(client: &Client, table_name: &str) -> Result<()> {
    for _ in 0..ACTIVATION_ATTEMPTS {
        let response = client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(|err| {
                transport_error(&err)
                    .unwrap_or_else(|| sdk_error(format!("DescribeTable failed: {err:?}")))
            })?;

        if let Some(table) = response.table() {
            let table_active = table.table_status() == Some(&TableStatus::Active);
            let indexes_active = table
                .global_secondary_indexes()
                .iter()
                .all(|gsi| gsi.index_status() == Some(&IndexStatus::Active));
            if table_active && indexes_active {
                return Ok(());
            }
        }
        tokio::time::sleep(ACTIVATION_DELAY).await;
    }

    Err(RepositoryError::StoreUnavailable(format!(
        "Table {table_name} did not become active"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_attributes_cover_all_indexes() {
        assert_eq!(
            key_attributes(),
            vec!["pk", "sk", "entity_type", "event_id", "question_id"]
        );
    }

    #[test]
    fn test_type_index_has_range_key() {
        let gsi = index_definition(Index::EntityType).unwrap();
        assert_eq!(gsi.index_name(), "EntityTypeIndex");
        assert_eq!(gsi.key_schema().len(), 2);
        assert_eq!(gsi.key_schema()[1].attribute_name(), "pk");
    }

    #[test]
    fn test_id_indexes_are_hash_only() {
        let gsi = index_definition(Index::QuestionId).unwrap();
        assert_eq!(gsi.index_name(), "QuestionIDIndex");
        assert_eq!(gsi.key_schema().len(), 1);
        assert_eq!(gsi.key_schema()[0].key_type(), &KeyType::Hash);
    }
}
