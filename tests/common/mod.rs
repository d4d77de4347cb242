//! In-memory `DynamoApi` used by the integration tests.
//!
//! Pages are cut at `page_size` items and carry a `LastEvaluatedKey` whenever
//! a page is full, like DynamoDB does, so a table whose size is a multiple of
//! the page size ends with an empty page. PartiQL support covers the
//! statements the crate's builder produces.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, WriteRequest};
use dynohelp::backend::{
    DynamoApi, Page, QueryRequest, ScanRequest, StatementPage, StatementResponse, UpdateRequest,
};
use dynohelp::batch_writer::MAX_BATCH_WRITE_ITEMS;
use dynohelp::{AttributeMap, Error, Item, Result, Statement};

struct TableState {
    key_names: Vec<String>,
    items: BTreeMap<String, AttributeMap>,
}

impl TableState {
    fn encode(&self, attributes: &AttributeMap) -> Result<String> {
        let mut parts = Vec::with_capacity(self.key_names.len());
        for name in &self.key_names {
            let value = attributes.get(name).ok_or_else(|| {
                Error::Validation(format!("missing key attribute {}", name))
            })?;
            parts.push(format!("{:?}", value));
        }
        Ok(parts.join("|"))
    }

    fn key_of(&self, item: &AttributeMap) -> AttributeMap {
        self.key_names
            .iter()
            .filter_map(|n| item.get(n).map(|v| (n.clone(), v.clone())))
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryDynamo {
    tables: Mutex<HashMap<String, TableState>>,
    page_size: usize,
    /// Number of upcoming batch writes that leave their last request unprocessed.
    drop_last_write: AtomicUsize,
    pub scans: Mutex<Vec<ScanRequest>>,
    pub queries: Mutex<Vec<QueryRequest>>,
    pub statements: Mutex<Vec<Statement>>,
    pub batch_sizes: Mutex<Vec<usize>>,
}

impl MemoryDynamo {
    pub fn new(page_size: usize) -> Self {
        MemoryDynamo {
            page_size,
            ..Default::default()
        }
    }

    pub fn with_table(self, name: &str, key_names: &[&str]) -> Self {
        self.tables.lock().unwrap().insert(
            name.to_string(),
            TableState {
                key_names: key_names.iter().map(|k| k.to_string()).collect(),
                items: BTreeMap::new(),
            },
        );
        self
    }

    pub fn drop_last_write_for(&self, batches: usize) {
        self.drop_last_write.store(batches, Ordering::SeqCst);
    }

    pub fn seed(&self, table: &str, items: impl IntoIterator<Item = Item>) {
        let mut tables = self.tables.lock().unwrap();
        let state = tables.get_mut(table).expect("unknown table");
        for item in items {
            let raw = item.to_attribute_map();
            let key = state.encode(&raw).unwrap();
            state.items.insert(key, raw);
        }
    }

    pub fn len(&self, table: &str) -> usize {
        self.tables.lock().unwrap()[table].items.len()
    }

    fn with_state<T>(&self, table: &str, f: impl FnOnce(&mut TableState) -> Result<T>) -> Result<T> {
        let mut tables = self.tables.lock().unwrap();
        let state = tables.get_mut(table).ok_or_else(|| Error::TableNotFound {
            table: table.to_string(),
        })?;
        f(state)
    }

    /// Cut one page out of `candidates`, which are in key order.
    fn page(
        &self,
        state: &TableState,
        candidates: Vec<(String, AttributeMap)>,
        start: Option<&AttributeMap>,
        limit: Option<i32>,
    ) -> Result<Page> {
        let start = start.map(|s| state.encode(s)).transpose()?;
        let mut size = self.page_size;
        if let Some(limit) = limit {
            size = size.min(limit as usize);
        }

        let items: Vec<AttributeMap> = candidates
            .into_iter()
            .filter(|(k, _)| start.as_ref().map_or(true, |s| k > s))
            .take(size)
            .map(|(_, v)| v)
            .collect();

        let last_evaluated_key = (items.len() == size)
            .then(|| items.last().map(|last| state.key_of(last)))
            .flatten();
        Ok(Page {
            items,
            last_evaluated_key,
        })
    }

    fn run_statement(&self, statement: &Statement) -> Result<Vec<AttributeMap>> {
        self.statements.lock().unwrap().push(statement.clone());
        let text = statement.text();
        let params: Vec<AttributeValue> = statement
            .parameters()
            .iter()
            .map(|v| v.to_attribute_value())
            .collect();

        if let Some(rest) = text.strip_prefix("SELECT ") {
            let (columns, rest) = rest.split_once(" FROM ").unwrap();
            let (table, condition) = rest.split_once(" WHERE ").unwrap();
            let (attr, _) = condition.split_once(" = ").unwrap();
            let attr = unquote(attr);
            let columns: Vec<String> = if columns == "*" {
                Vec::new()
            } else {
                columns.split(", ").map(unquote).collect()
            };
            return self.with_state(&unquote(table), |state| {
                Ok(state
                    .items
                    .values()
                    .filter(|item| item.get(&attr) == Some(&params[0]))
                    .map(|item| project(item, &columns))
                    .collect())
            });
        }

        if let Some(rest) = text.strip_prefix("INSERT INTO ") {
            let (table, body) = rest.split_once(" VALUE ").unwrap();
            let body = body.trim_start_matches('{').trim_end_matches('}');
            let item: AttributeMap = body
                .split(", ")
                .map(|field| unquote(field.split_once(": ").unwrap().0))
                .zip(params)
                .collect();
            return self.with_state(&unquote(table), |state| {
                let key = state.encode(&item)?;
                if state.items.contains_key(&key) {
                    return Err(Error::Service {
                        code: "DuplicateItemException".to_string(),
                        message: "Duplicate primary key exists in table".to_string(),
                    });
                }
                state.items.insert(key, item);
                Ok(Vec::new())
            });
        }

        if let Some(rest) = text.strip_prefix("UPDATE ") {
            let (head, condition) = rest.split_once(" WHERE ").unwrap();
            let mut sets = head.split(" SET ");
            let table = unquote(sets.next().unwrap());
            let mut params = params.into_iter();
            let assignments: Vec<(String, AttributeValue)> = sets
                .map(|s| (unquote(s.split_once(" = ").unwrap().0), params.next().unwrap()))
                .collect();
            let key: AttributeMap = condition
                .split(" AND ")
                .map(|c| (unquote(c.split_once(" = ").unwrap().0), params.next().unwrap()))
                .collect();
            return self.with_state(&table, |state| {
                let encoded = state.encode(&key)?;
                let item = state.items.get_mut(&encoded).ok_or_else(|| {
                    Error::Service {
                        code: "ConditionalCheckFailedException".to_string(),
                        message: "item does not exist".to_string(),
                    }
                })?;
                item.extend(assignments);
                Ok(Vec::new())
            });
        }

        Err(Error::Validation(format!("unsupported statement: {}", text)))
    }
}

/// Per-statement error codes as BatchExecuteStatement spells them.
fn batch_error_code(err: &Error) -> &str {
    match err {
        Error::ConditionCheckFailed => "ConditionalCheckFailed",
        Error::Validation(_) => "ValidationError",
        Error::TableNotFound { .. } => "ResourceNotFound",
        Error::Throttling(_) => "ThrottlingError",
        Error::AccessDenied(_) => "AccessDenied",
        Error::Service { code, .. } => match code.as_str() {
            "ConditionalCheckFailedException" => "ConditionalCheckFailed",
            "DuplicateItemException" => "DuplicateItem",
            other => other,
        },
        _ => "InternalServerError",
    }
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    let quote = s.chars().next().unwrap();
    assert!(quote == '"' || quote == '\'', "not quoted: {s}");
    let doubled: String = [quote, quote].iter().collect();
    s[1..s.len() - 1].replace(&doubled, &quote.to_string())
}

fn project(item: &AttributeMap, columns: &[String]) -> AttributeMap {
    if columns.is_empty() {
        return item.clone();
    }
    columns
        .iter()
        .filter_map(|c| item.get(c).map(|v| (c.clone(), v.clone())))
        .collect()
}

fn resolve(name: &str, names: Option<&HashMap<String, String>>) -> String {
    names
        .and_then(|n| n.get(name))
        .cloned()
        .unwrap_or_else(|| name.to_string())
}

#[async_trait]
impl DynamoApi for MemoryDynamo {
    async fn put_item(&self, table_name: &str, item: AttributeMap) -> Result<()> {
        self.with_state(table_name, |state| {
            let key = state.encode(&item)?;
            state.items.insert(key, item);
            Ok(())
        })
    }

    async fn get_item(&self, table_name: &str, key: AttributeMap) -> Result<Option<AttributeMap>> {
        self.with_state(table_name, |state| {
            if key.len() != state.key_names.len() {
                return Err(Error::Validation(
                    "The provided key element does not match the schema".to_string(),
                ));
            }
            Ok(state.items.get(&state.encode(&key)?).cloned())
        })
    }

    async fn delete_item(&self, table_name: &str, key: AttributeMap) -> Result<()> {
        self.with_state(table_name, |state| {
            let encoded = state.encode(&key)?;
            state.items.remove(&encoded);
            Ok(())
        })
    }

    async fn update_item(&self, request: UpdateRequest) -> Result<AttributeMap> {
        let parts: Vec<&str> = request.update_expression.split_whitespace().collect();
        assert_eq!(parts.len(), 3, "only `ADD name :value` is supported");
        assert_eq!(parts[0], "ADD");
        let attr = resolve(parts[1], request.expression_attribute_names.as_ref());
        let delta = match request
            .expression_attribute_values
            .as_ref()
            .and_then(|v| v.get(parts[2]))
        {
            Some(AttributeValue::N(n)) => n.parse::<i64>().unwrap(),
            other => panic!("unsupported ADD operand {other:?}"),
        };

        self.with_state(&request.table_name, |state| {
            let encoded = state.encode(&request.key)?;
            let item = state
                .items
                .entry(encoded)
                .or_insert_with(|| request.key.clone());
            let current = match item.get(&attr) {
                None => 0,
                Some(AttributeValue::N(n)) => n.parse::<i64>().unwrap(),
                Some(_) => {
                    return Err(Error::Validation(
                        "An operand in the update expression has an incorrect data type"
                            .to_string(),
                    ))
                }
            };
            item.insert(attr.clone(), AttributeValue::N((current + delta).to_string()));
            Ok(item.clone())
        })
    }

    async fn query(&self, request: QueryRequest) -> Result<Page> {
        self.queries.lock().unwrap().push(request.clone());
        let (lhs, rhs) = request
            .key_condition_expression
            .split_once(" = ")
            .expect("only equality key conditions are supported");
        let attr = resolve(lhs.trim(), request.expression_attribute_names.as_ref());
        let expected = request
            .expression_attribute_values
            .as_ref()
            .and_then(|v| v.get(rhs.trim()))
            .cloned()
            .ok_or_else(|| {
                Error::Validation(format!("unbound placeholder {}", rhs.trim()))
            })?;

        self.with_state(&request.table_name, |state| {
            let candidates = state
                .items
                .iter()
                .filter(|(_, item)| item.get(&attr) == Some(&expected))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            self.page(
                state,
                candidates,
                request.exclusive_start_key.as_ref(),
                request.limit,
            )
        })
    }

    async fn scan(&self, request: ScanRequest) -> Result<Page> {
        self.scans.lock().unwrap().push(request.clone());
        self.with_state(&request.table_name, |state| {
            let columns: Vec<String> = request
                .projection_expression
                .as_deref()
                .map(|p| {
                    p.split(", ")
                        .map(|c| resolve(c, request.expression_attribute_names.as_ref()))
                        .collect()
                })
                .unwrap_or_default();
            let candidates = state
                .items
                .iter()
                .map(|(k, v)| (k.clone(), project(v, &columns)))
                .collect();
            self.page(
                state,
                candidates,
                request.exclusive_start_key.as_ref(),
                request.limit,
            )
        })
    }

    async fn key_schema(&self, table_name: &str) -> Result<Vec<String>> {
        self.with_state(table_name, |state| Ok(state.key_names.clone()))
    }

    async fn batch_write(
        &self,
        table_name: &str,
        mut requests: Vec<WriteRequest>,
    ) -> Result<Vec<WriteRequest>> {
        if requests.len() > MAX_BATCH_WRITE_ITEMS {
            return Err(Error::Validation(
                "Too many items requested for the BatchWriteItem call".to_string(),
            ));
        }
        self.batch_sizes.lock().unwrap().push(requests.len());

        let mut unprocessed = Vec::new();
        let remaining = self.drop_last_write.load(Ordering::SeqCst);
        if remaining > 0 {
            self.drop_last_write.store(remaining - 1, Ordering::SeqCst);
            unprocessed.extend(requests.pop());
        }

        self.with_state(table_name, |state| {
            for request in &requests {
                if let Some(delete) = request.delete_request() {
                    let encoded = state.encode(delete.key())?;
                    state.items.remove(&encoded);
                }
                if let Some(put) = request.put_request() {
                    let item = put.item().clone();
                    let encoded = state.encode(&item)?;
                    state.items.insert(encoded, item);
                }
            }
            Ok(())
        })?;
        Ok(unprocessed)
    }

    async fn execute_statement(
        &self,
        statement: &Statement,
        next_token: Option<String>,
    ) -> Result<StatementPage> {
        let items = self.run_statement(statement)?;
        let offset: usize = next_token.map_or(0, |t| t.parse().unwrap());
        let end = (offset + self.page_size).min(items.len());
        Ok(StatementPage {
            items: items[offset..end].to_vec(),
            next_token: (end < items.len()).then(|| end.to_string()),
        })
    }

    async fn batch_execute_statement(
        &self,
        statements: &[Statement],
    ) -> Result<Vec<StatementResponse>> {
        Ok(statements
            .iter()
            .map(|s| match self.run_statement(s) {
                Ok(items) => StatementResponse::Ok(items.into_iter().next()),
                Err(e) => StatementResponse::Failed {
                    code: batch_error_code(&e).to_string(),
                    message: Some(e.to_string()),
                },
            })
            .collect())
    }
}
