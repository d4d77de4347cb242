//! The store seam.
//!
//! [`DynamoApi`] lists the DynamoDB calls the helpers are built on. It is
//! implemented for [`aws_sdk_dynamodb::Client`]; every operation in the crate
//! takes the implementation explicitly.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{KeyType, ReturnValue, WriteRequest};
use aws_sdk_dynamodb::Client;

use crate::errors::{map_sdk_error, Error, Result};
use crate::item::AttributeMap;
use crate::statement::Statement;

/// Parameters of a single Scan call.
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    pub table_name: String,
    pub projection_expression: Option<String>,
    pub expression_attribute_names: Option<HashMap<String, String>>,
    pub exclusive_start_key: Option<AttributeMap>,
    pub limit: Option<i32>,
}

/// Parameters of a single Query call.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub table_name: String,
    pub key_condition_expression: String,
    pub expression_attribute_names: Option<HashMap<String, String>>,
    pub expression_attribute_values: Option<AttributeMap>,
    pub index_name: Option<String>,
    pub exclusive_start_key: Option<AttributeMap>,
    pub limit: Option<i32>,
}

/// Parameters of an UpdateItem call. The updated item is always returned.
#[derive(Debug, Clone, Default)]
pub struct UpdateRequest {
    pub table_name: String,
    pub key: AttributeMap,
    pub update_expression: String,
    pub expression_attribute_names: Option<HashMap<String, String>>,
    pub expression_attribute_values: Option<AttributeMap>,
}

/// One page of a Scan or Query.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<AttributeMap>,
    pub last_evaluated_key: Option<AttributeMap>,
}

/// One page of an ExecuteStatement call.
#[derive(Debug, Clone, Default)]
pub struct StatementPage {
    pub items: Vec<AttributeMap>,
    pub next_token: Option<String>,
}

/// Per-statement result of a BatchExecuteStatement call.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementResponse {
    Ok(Option<AttributeMap>),
    Failed {
        code: String,
        message: Option<String>,
    },
}

/// DynamoDB calls used by the helpers.
///
/// Errors are already mapped to [`Error`]; implementations must not retry.
#[async_trait]
pub trait DynamoApi: Send + Sync {
    async fn put_item(&self, table_name: &str, item: AttributeMap) -> Result<()>;

    async fn get_item(&self, table_name: &str, key: AttributeMap) -> Result<Option<AttributeMap>>;

    async fn delete_item(&self, table_name: &str, key: AttributeMap) -> Result<()>;

    async fn update_item(&self, request: UpdateRequest) -> Result<AttributeMap>;

    async fn query(&self, request: QueryRequest) -> Result<Page>;

    async fn scan(&self, request: ScanRequest) -> Result<Page>;

    /// Key attribute names of a table, partition key first.
    async fn key_schema(&self, table_name: &str) -> Result<Vec<String>>;

    /// Send up to 25 write requests. Returns the requests DynamoDB left
    /// unprocessed.
    async fn batch_write(
        &self,
        table_name: &str,
        requests: Vec<WriteRequest>,
    ) -> Result<Vec<WriteRequest>>;

    async fn execute_statement(
        &self,
        statement: &Statement,
        next_token: Option<String>,
    ) -> Result<StatementPage>;

    async fn batch_execute_statement(
        &self,
        statements: &[Statement],
    ) -> Result<Vec<StatementResponse>>;
}

#[async_trait]
impl DynamoApi for Client {
    async fn put_item(&self, table_name: &str, item: AttributeMap) -> Result<()> {
        Client::put_item(self)
            .table_name(table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(table_name)))?;
        Ok(())
    }

    async fn get_item(&self, table_name: &str, key: AttributeMap) -> Result<Option<AttributeMap>> {
        let output = Client::get_item(self)
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(table_name)))?;
        Ok(output.item)
    }

    async fn delete_item(&self, table_name: &str, key: AttributeMap) -> Result<()> {
        Client::delete_item(self)
            .table_name(table_name)
            .set_key(Some(key))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(table_name)))?;
        Ok(())
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<AttributeMap> {
        let output = Client::update_item(self)
            .table_name(&request.table_name)
            .set_key(Some(request.key))
            .update_expression(request.update_expression)
            .set_expression_attribute_names(request.expression_attribute_names)
            .set_expression_attribute_values(request.expression_attribute_values)
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(&request.table_name)))?;
        Ok(output.attributes.unwrap_or_default())
    }

    async fn query(&self, request: QueryRequest) -> Result<Page> {
        let output = Client::query(self)
            .table_name(&request.table_name)
            .key_condition_expression(request.key_condition_expression)
            .set_expression_attribute_names(request.expression_attribute_names)
            .set_expression_attribute_values(request.expression_attribute_values)
            .set_index_name(request.index_name)
            .set_exclusive_start_key(request.exclusive_start_key)
            .set_limit(request.limit)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(&request.table_name)))?;
        Ok(Page {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn scan(&self, request: ScanRequest) -> Result<Page> {
        let output = Client::scan(self)
            .table_name(&request.table_name)
            .set_projection_expression(request.projection_expression)
            .set_expression_attribute_names(request.expression_attribute_names)
            .set_exclusive_start_key(request.exclusive_start_key)
            .set_limit(request.limit)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(&request.table_name)))?;
        Ok(Page {
            items: output.items.unwrap_or_default(),
            last_evaluated_key: output.last_evaluated_key,
        })
    }

    async fn key_schema(&self, table_name: &str) -> Result<Vec<String>> {
        let output = Client::describe_table(self)
            .table_name(table_name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(table_name)))?;

        let table = output.table().ok_or_else(|| Error::TableNotFound {
            table: table_name.to_string(),
        })?;

        let mut schema: Vec<_> = table.key_schema().iter().collect();
        schema.sort_by_key(|k| *k.key_type() != KeyType::Hash);
        Ok(schema
            .into_iter()
            .map(|k| k.attribute_name().to_string())
            .collect())
    }

    async fn batch_write(
        &self,
        table_name: &str,
        requests: Vec<WriteRequest>,
    ) -> Result<Vec<WriteRequest>> {
        let output = Client::batch_write_item(self)
            .request_items(table_name, requests)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, Some(table_name)))?;

        Ok(output
            .unprocessed_items
            .and_then(|mut unprocessed| unprocessed.remove(table_name))
            .unwrap_or_default())
    }

    async fn execute_statement(
        &self,
        statement: &Statement,
        next_token: Option<String>,
    ) -> Result<StatementPage> {
        let output = Client::execute_statement(self)
            .statement(statement.text())
            .set_parameters(statement.attribute_parameters())
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, None))?;
        Ok(StatementPage {
            items: output.items.unwrap_or_default(),
            next_token: output.next_token,
        })
    }

    async fn batch_execute_statement(
        &self,
        statements: &[Statement],
    ) -> Result<Vec<StatementResponse>> {
        let requests = statements
            .iter()
            .map(Statement::to_batch_request)
            .collect::<Result<Vec<_>>>()?;

        let output = Client::batch_execute_statement(self)
            .set_statements(Some(requests))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, None))?;

        Ok(output
            .responses
            .unwrap_or_default()
            .into_iter()
            .map(|response| {
                if let Some(err) = response.error() {
                    return StatementResponse::Failed {
                        code: err
                            .code()
                            .map(|c| c.as_str().to_string())
                            .unwrap_or_else(|| "Unknown".to_string()),
                        message: err.message().map(str::to_string),
                    };
                }
                StatementResponse::Ok(response.item)
            })
            .collect())
    }
}
