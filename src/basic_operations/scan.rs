//! Full table scan.

use tokio::runtime::Runtime;
use tracing::debug;

use crate::backend::{DynamoApi, ScanRequest};
use crate::errors::Result;
use crate::item::Item;

/// Scan the whole table, following pagination until the last page.
///
/// Every item is held in memory, so this is only suitable for small tables.
pub async fn async_scan_table<C: DynamoApi + ?Sized>(
    client: &C,
    table_name: &str,
) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    let mut start_key = None;
    let mut pages = 0usize;

    loop {
        let page = client
            .scan(ScanRequest {
                table_name: table_name.to_string(),
                exclusive_start_key: start_key.take(),
                ..Default::default()
            })
            .await?;
        pages += 1;

        for raw in page.items {
            items.push(Item::from_attribute_map(raw)?);
        }

        match page.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => break,
        }
    }

    debug!(table = table_name, pages, items = items.len(), "scan complete");
    Ok(items)
}

/// Blocking form of [`async_scan_table`].
pub fn scan_table<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    table_name: &str,
) -> Result<Vec<Item>> {
    runtime.block_on(async_scan_table(client, table_name))
}
