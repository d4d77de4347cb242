//! Table handle.

use std::sync::Arc;

use aws_sdk_dynamodb::Client;
use tokio::runtime::Runtime;

use crate::backend::DynamoApi;
use crate::basic_operations::{self, QueryPage, QueryParams};
use crate::errors::Result;
use crate::item::{Item, Key};
use crate::table_operations::{self, TruncateReport};

/// A table name bound to a client and the runtime its calls block on.
///
/// Every method forwards to the free function of the same name with this
/// handle's table, client and runtime.
pub struct DynamoTable<C: DynamoApi = Client> {
    table_name: String,
    client: C,
    runtime: Arc<Runtime>,
}

impl<C: DynamoApi> DynamoTable<C> {
    pub fn new(table_name: impl Into<String>, client: C, runtime: Arc<Runtime>) -> Self {
        DynamoTable {
            table_name: table_name.into(),
            client,
            runtime,
        }
    }

    pub fn name(&self) -> &str {
        &self.table_name
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn insert_item(&self, item: &Item) -> Result<()> {
        basic_operations::insert_item(&self.client, &self.runtime, item, &self.table_name)
    }

    pub fn get_item(&self, primary_key: &Key, sort_key: Option<&Key>) -> Result<Option<Item>> {
        basic_operations::get_item(
            &self.client,
            &self.runtime,
            primary_key,
            &self.table_name,
            sort_key,
        )
    }

    pub fn scan(&self) -> Result<Vec<Item>> {
        basic_operations::scan_table(&self.client, &self.runtime, &self.table_name)
    }

    /// Run a query against this table. The table name in `params` is replaced.
    pub fn query(&self, mut params: QueryParams) -> Result<QueryPage> {
        params.table_name = self.table_name.clone();
        basic_operations::query_table(&self.client, &self.runtime, params)
    }

    pub fn select(&self, primary_key: &Key, columns: &[&str]) -> Result<Vec<Item>> {
        basic_operations::select_items(
            &self.client,
            &self.runtime,
            primary_key,
            &self.table_name,
            columns,
        )
    }

    pub fn delete_item(&self, primary_key: &Key, sort_key: Option<&Key>) -> Result<()> {
        basic_operations::delete_item(
            &self.client,
            &self.runtime,
            &self.table_name,
            primary_key,
            sort_key,
        )
    }

    pub fn increment_counter(
        &self,
        primary_key: &Key,
        sort_key: &Key,
        counter_name: &str,
    ) -> Result<Item> {
        basic_operations::increment_counter(
            &self.client,
            &self.runtime,
            primary_key,
            sort_key,
            counter_name,
            &self.table_name,
        )
    }

    pub fn truncate(&self) -> Result<TruncateReport> {
        table_operations::truncate_table(&self.client, &self.runtime, &self.table_name)
    }
}

impl<C: DynamoApi> std::fmt::Debug for DynamoTable<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoTable")
            .field("table_name", &self.table_name)
            .finish_non_exhaustive()
    }
}
