//! Put item operation.

use tokio::runtime::Runtime;
use tracing::debug;

use crate::backend::DynamoApi;
use crate::errors::Result;
use crate::item::Item;

/// Insert an item, replacing any item with the same key.
pub async fn async_insert_item<C: DynamoApi + ?Sized>(
    client: &C,
    item: &Item,
    table_name: &str,
) -> Result<()> {
    debug!(table = table_name, attributes = item.len(), "put_item");
    client.put_item(table_name, item.to_attribute_map()).await
}

/// Blocking form of [`async_insert_item`].
pub fn insert_item<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    item: &Item,
    table_name: &str,
) -> Result<()> {
    runtime.block_on(async_insert_item(client, item, table_name))
}
