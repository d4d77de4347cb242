//! Table-wide operations.

use std::collections::HashMap;

use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::backend::{DynamoApi, ScanRequest};
use crate::batch_writer::BatchWriter;
use crate::errors::{Error, Result};

/// Outcome of [`async_truncate_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncateReport {
    pub table_name: String,
    pub deleted: usize,
    pub pages: usize,
}

/// Delete every item of a table.
///
/// Reads the key schema, scans only the key attributes and deletes each page
/// of keys through a [`BatchWriter`] before fetching the next page. Nothing is
/// transactional: a failure part way through leaves the remaining items in
/// place and returns the error.
pub async fn async_truncate_table<C: DynamoApi + ?Sized>(
    client: &C,
    table_name: &str,
) -> Result<TruncateReport> {
    let key_names = client.key_schema(table_name).await?;
    if key_names.is_empty() {
        return Err(Error::Validation(format!(
            "Table '{}' reported an empty key schema",
            table_name
        )));
    }

    // Placeholders keep reserved words and odd characters out of the expression.
    let placeholders: Vec<String> = (0..key_names.len()).map(|i| format!("#k{}", i)).collect();
    let projection_expression = placeholders.join(", ");
    let expression_attribute_names: HashMap<String, String> = placeholders
        .into_iter()
        .zip(key_names.iter().cloned())
        .collect();

    let mut writer = BatchWriter::new(client, table_name);
    let mut start_key = None;
    let mut pages = 0usize;

    loop {
        let page = client
            .scan(ScanRequest {
                table_name: table_name.to_string(),
                projection_expression: Some(projection_expression.clone()),
                expression_attribute_names: Some(expression_attribute_names.clone()),
                exclusive_start_key: start_key.take(),
                limit: None,
            })
            .await?;
        pages += 1;
        debug!(table = table_name, page = pages, keys = page.items.len(), "truncate page");

        for key in page.items {
            writer.delete_item(key).await?;
        }

        match page.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => break,
        }
    }

    let deleted = writer.finish().await?;
    info!(table = table_name, deleted, pages, "Table successfully truncated");

    Ok(TruncateReport {
        table_name: table_name.to_string(),
        deleted,
        pages,
    })
}

/// Blocking form of [`async_truncate_table`].
pub fn truncate_table<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    table_name: &str,
) -> Result<TruncateReport> {
    runtime.block_on(async_truncate_table(client, table_name))
}
