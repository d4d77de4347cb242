//! # dynohelp
//!
//! Helper functions over the DynamoDB API.
//!
//! This crate handles:
//! - Item put/get/delete, queries and full scans
//! - Atomic counter increments
//! - Table truncation through batched deletes
//! - Parameterized PartiQL statement building and execution
//! - Conversion between DynamoDB attribute values and plain values
//!
//! Every operation takes its client explicitly. [`DynamoClient`] builds one
//! from a [`ClientConfig`] and hands out [`DynamoTable`] handles whose
//! methods block on a tokio runtime; the `async_*` functions in
//! [`basic_operations`] and [`table_operations`] are there for callers that
//! already run inside one.

pub mod backend;
pub mod basic_operations;
pub mod batch_writer;
mod client;
mod config;
mod errors;
mod item;
pub mod logging;
pub mod statement;
mod table;
pub mod table_operations;
mod value;

pub use backend::DynamoApi;
pub use client::{shared_runtime, DynamoClient};
pub use config::{ClientConfig, DEFAULT_REGION};
pub use errors::{from_service_code, map_sdk_error, Error, Result};
pub use item::{key_map, AttributeMap, Item, Key, KeyValue};
pub use statement::Statement;
pub use table::DynamoTable;
pub use value::{Number, Value};
