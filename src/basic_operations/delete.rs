//! Delete item operation.

use tokio::runtime::Runtime;
use tracing::debug;

use crate::backend::DynamoApi;
use crate::errors::Result;
use crate::item::{key_map, Key};

/// Delete the item with the given key. Deleting a missing item succeeds.
pub async fn async_delete_item<C: DynamoApi + ?Sized>(
    client: &C,
    table_name: &str,
    primary_key: &Key,
    sort_key: Option<&Key>,
) -> Result<()> {
    debug!(table = table_name, pk = %primary_key.name, "delete_item");
    client
        .delete_item(table_name, key_map(primary_key, sort_key))
        .await
}

/// Blocking form of [`async_delete_item`].
pub fn delete_item<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    table_name: &str,
    primary_key: &Key,
    sort_key: Option<&Key>,
) -> Result<()> {
    runtime.block_on(async_delete_item(client, table_name, primary_key, sort_key))
}
