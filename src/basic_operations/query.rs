//! Query operation.

use std::collections::HashMap;

use tokio::runtime::Runtime;
use tracing::{debug, error};

use crate::backend::{DynamoApi, QueryRequest};
use crate::errors::Result;
use crate::item::{AttributeMap, Item};
use crate::value::Value;

/// Page size used when the caller does not set one.
pub const DEFAULT_QUERY_LIMIT: i32 = 100;

/// Opaque marker for resuming a paginated read.
///
/// Wraps DynamoDB's `LastEvaluatedKey`; pass it back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationToken(pub(crate) AttributeMap);

impl ContinuationToken {
    /// Key attributes of the last item read, as plain values.
    pub fn to_item(&self) -> Result<Item> {
        Item::from_attribute_map(self.0.clone())
    }
}

/// Parameters for [`async_query_table`].
///
/// ```no_run
/// use dynohelp::basic_operations::QueryParams;
///
/// let params = QueryParams::new("orders", "#pk = :pk")
///     .name("#pk", "customer_id")
///     .value(":pk", "CUST#42")
///     .index("by_customer")
///     .limit(25);
/// ```
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub table_name: String,
    pub key_condition_expression: String,
    pub expression_attribute_values: Item,
    pub expression_attribute_names: HashMap<String, String>,
    pub secondary_index_name: Option<String>,
    pub next_token: Option<ContinuationToken>,
    pub limit: i32,
}

impl QueryParams {
    pub fn new(table_name: impl Into<String>, key_condition_expression: impl Into<String>) -> Self {
        QueryParams {
            table_name: table_name.into(),
            key_condition_expression: key_condition_expression.into(),
            expression_attribute_values: Item::new(),
            expression_attribute_names: HashMap::new(),
            secondary_index_name: None,
            next_token: None,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }

    /// Bind a `:placeholder` used in the key condition.
    pub fn value(mut self, placeholder: impl Into<String>, value: impl Into<Value>) -> Self {
        self.expression_attribute_values.insert(placeholder, value);
        self
    }

    /// Bind a `#placeholder` to an attribute name.
    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.expression_attribute_names
            .insert(placeholder.into(), attribute.into());
        self
    }

    /// Query a global or local secondary index instead of the table.
    pub fn index(mut self, index_name: impl Into<String>) -> Self {
        self.secondary_index_name = Some(index_name.into());
        self
    }

    /// Resume after the page that returned `token`.
    pub fn starting_after(mut self, token: ContinuationToken) -> Self {
        self.next_token = Some(token);
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = limit;
        self
    }

    fn into_request(self) -> QueryRequest {
        QueryRequest {
            table_name: self.table_name,
            key_condition_expression: self.key_condition_expression,
            expression_attribute_names: (!self.expression_attribute_names.is_empty())
                .then_some(self.expression_attribute_names),
            expression_attribute_values: (!self.expression_attribute_values.is_empty())
                .then(|| self.expression_attribute_values.to_attribute_map()),
            index_name: self.secondary_index_name,
            exclusive_start_key: self.next_token.map(|t| t.0),
            limit: Some(self.limit),
        }
    }
}

/// Query result containing items and pagination info.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Item>,
    /// Present when more items match; pass to [`QueryParams::starting_after`].
    pub next_token: Option<ContinuationToken>,
}

/// Run one Query call and convert the returned items.
///
/// Failures are logged and returned as is.
pub async fn async_query_table<C: DynamoApi + ?Sized>(
    client: &C,
    params: QueryParams,
) -> Result<QueryPage> {
    let table_name = params.table_name.clone();
    debug!(
        table = %table_name,
        index = ?params.secondary_index_name,
        limit = params.limit,
        "query"
    );

    let result = async {
        let page = client.query(params.into_request()).await?;
        let items = page
            .items
            .into_iter()
            .map(Item::from_attribute_map)
            .collect::<Result<Vec<_>>>()?;
        Ok(QueryPage {
            items,
            next_token: page.last_evaluated_key.map(ContinuationToken),
        })
    }
    .await;

    if let Err(e) = &result {
        error!(table = %table_name, error = %e, "Querying table failed");
    }
    result
}

/// Blocking form of [`async_query_table`].
pub fn query_table<C: DynamoApi + ?Sized>(
    client: &C,
    runtime: &Runtime,
    params: QueryParams,
) -> Result<QueryPage> {
    runtime.block_on(async_query_table(client, params))
}
