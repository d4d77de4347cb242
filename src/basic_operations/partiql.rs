//! PartiQL statement execution.

use tokio::runtime::Runtime;
use tracing::debug;

use crate::backend::{DynamoApi, StatementResponse};
use crate::errors::{from_service_code, Result};
use crate::item::{Item, Key};
use crate::statement::{select_statement, Statement};

/// Result of one statement inside a batch: the returned item, if any, or
/// the error DynamoDB reported for that statement.
pub type StatementOutcome = Result<Option<Item>>;

/// Execute one statement and collect the items of every result page.
pub async fn async_execute_statement<C: DynamoApi + ?Sized>(
    client: &C,
    statement: &Statement,
) -> Result<Vec<Item>> {
    debug!(statement = statement.text(), "execute_statement");

    let mut items = Vec::new();
    let mut next_token = None;
    loop {
        let page = client.execute_statement(statement, next_token.take()).await?;
        for raw in page.items {
            items.push(Item::from_attribute_map(raw)?);
        }
        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }
    Ok(items)
}

/// Blocking form of [`async_execute_statement`].
pub fn execute_statement<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    statement: &Statement,
) -> Result<Vec<Item>> {
    runtime.block_on(async_execute_statement(client, statement))
}

/// Execute statements in one BatchExecuteStatement call.
///
/// The outer error is a failure of the whole call; each element of the
/// returned vector is the outcome of the statement at the same position.
pub async fn async_batch_execute_statements<C: DynamoApi + ?Sized>(
    client: &C,
    statements: &[Statement],
) -> Result<Vec<StatementOutcome>> {
    debug!(statements = statements.len(), "batch_execute_statement");

    let responses = client.batch_execute_statement(statements).await?;
    Ok(responses
        .into_iter()
        .map(|response| match response {
            StatementResponse::Ok(item) => item.map(Item::from_attribute_map).transpose(),
            StatementResponse::Failed { code, message } => {
                Err(from_service_code(&code, message, None))
            }
        })
        .collect())
}

/// Blocking form of [`async_batch_execute_statements`].
pub fn batch_execute_statements<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    statements: &[Statement],
) -> Result<Vec<StatementOutcome>> {
    runtime.block_on(async_batch_execute_statements(client, statements))
}

/// Select the items whose partition key equals `primary_key`.
///
/// An empty `columns` slice selects every attribute.
pub async fn async_select_items<C: DynamoApi + ?Sized>(
    client: &C,
    primary_key: &Key,
    table_name: &str,
    columns: &[&str],
) -> Result<Vec<Item>> {
    let statement = select_statement(primary_key, table_name, columns);
    async_execute_statement(client, &statement).await
}

/// Blocking form of [`async_select_items`].
pub fn select_items<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    primary_key: &Key,
    table_name: &str,
    columns: &[&str],
) -> Result<Vec<Item>> {
    runtime.block_on(async_select_items(client, primary_key, table_name, columns))
}
