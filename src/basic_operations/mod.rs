//! Basic DynamoDB operations module.
//!
//! This module provides the item-level helpers:
//! - `get` - Get a single item by key
//! - `put` - Put/create an item
//! - `delete` - Delete an item by key
//! - `update_op` - Atomic counter increment
//! - `query` - Query items by key condition
//! - `scan` - Scan a whole table
//! - `partiql` - PartiQL statement execution
//!
//! Every operation has an async form (`async_*`) and a blocking form that
//! runs it on a caller-supplied tokio runtime.

mod delete;
mod get;
mod partiql;
mod put;
mod query;
mod scan;
mod update_op;

// Re-export sync operations
pub use delete::delete_item;
pub use get::get_item;
pub use partiql::{batch_execute_statements, execute_statement, select_items};
pub use put::insert_item;
pub use query::query_table;
pub use scan::scan_table;
pub use update_op::increment_counter;

// Re-export async operations
pub use delete::async_delete_item;
pub use get::async_get_item;
pub use partiql::{async_batch_execute_statements, async_execute_statement, async_select_items};
pub use put::async_insert_item;
pub use query::async_query_table;
pub use scan::async_scan_table;
pub use update_op::async_increment_counter;

pub use partiql::StatementOutcome;
pub use query::{ContinuationToken, QueryPage, QueryParams, DEFAULT_QUERY_LIMIT};
