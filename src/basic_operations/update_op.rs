//! Atomic counter update.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::backend::{DynamoApi, UpdateRequest};
use crate::errors::Result;
use crate::item::{key_map, Item, Key};

/// Atomically add 1 to a numeric attribute and return the updated item.
///
/// Uses an `ADD` update expression, so a missing counter starts from 0 and
/// the item is created if it does not exist yet.
pub async fn async_increment_counter<C: DynamoApi + ?Sized>(
    client: &C,
    primary_key: &Key,
    sort_key: &Key,
    counter_name: &str,
    table_name: &str,
) -> Result<Item> {
    debug!(table = table_name, counter = counter_name, "increment_counter");

    let mut names = HashMap::new();
    names.insert("#counter".to_string(), counter_name.to_string());
    let mut values = HashMap::new();
    values.insert(":one".to_string(), AttributeValue::N("1".to_string()));

    let attributes = client
        .update_item(UpdateRequest {
            table_name: table_name.to_string(),
            key: key_map(primary_key, Some(sort_key)),
            update_expression: "ADD #counter :one".to_string(),
            expression_attribute_names: Some(names),
            expression_attribute_values: Some(values),
        })
        .await?;
    Item::from_attribute_map(attributes)
}

/// Blocking form of [`async_increment_counter`].
pub fn increment_counter<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    primary_key: &Key,
    sort_key: &Key,
    counter_name: &str,
    table_name: &str,
) -> Result<Item> {
    runtime.block_on(async_increment_counter(
        client,
        primary_key,
        sort_key,
        counter_name,
        table_name,
    ))
}
