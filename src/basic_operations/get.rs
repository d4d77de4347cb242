//! Get item operation.

use tokio::runtime::Runtime;
use tracing::debug;

use crate::backend::DynamoApi;
use crate::errors::Result;
use crate::item::{key_map, Item, Key};

/// Get the item with the given partition (and optional sort) key.
///
/// Returns `Ok(None)` when no such item exists.
pub async fn async_get_item<C: DynamoApi + ?Sized>(
    client: &C,
    primary_key: &Key,
    table_name: &str,
    sort_key: Option<&Key>,
) -> Result<Option<Item>> {
    debug!(table = table_name, pk = %primary_key.name, "get_item");
    client
        .get_item(table_name, key_map(primary_key, sort_key))
        .await?
        .map(Item::from_attribute_map)
        .transpose()
}

/// Blocking form of [`async_get_item`].
pub fn get_item<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    primary_key: &Key,
    table_name: &str,
    sort_key: Option<&Key>,
) -> Result<Option<Item>> {
    runtime.block_on(async_get_item(client, primary_key, table_name, sort_key))
}
