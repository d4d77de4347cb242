//! PartiQL statement builder.
//!
//! Statements are parameterized: caller values never end up inside the
//! statement text. [`Statement::render_literal`] produces an inline form for
//! logging or for tools that cannot pass parameters.

use std::fmt::Write;

use aws_sdk_dynamodb::types::{AttributeValue, BatchStatementRequest};

use crate::errors::{Error, Result};
use crate::item::{Item, Key};
use crate::value::Value;

/// A PartiQL statement with `?` placeholders and their values in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: String,
    parameters: Vec<Value>,
}

impl Statement {
    /// A statement written by hand. The number of `?` placeholders in `text`
    /// must match `parameters`.
    pub fn new(text: impl Into<String>, parameters: Vec<Value>) -> Self {
        Statement {
            text: text.into(),
            parameters,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    pub(crate) fn attribute_parameters(&self) -> Option<Vec<AttributeValue>> {
        if self.parameters.is_empty() {
            return None;
        }
        Some(
            self.parameters
                .iter()
                .map(Value::to_attribute_value)
                .collect(),
        )
    }

    pub(crate) fn to_batch_request(&self) -> Result<BatchStatementRequest> {
        BatchStatementRequest::builder()
            .statement(&self.text)
            .set_parameters(self.attribute_parameters())
            .build()
            .map_err(|e| Error::Validation(format!("Invalid batch statement: {}", e)))
    }

    /// Inline every parameter as a PartiQL literal.
    ///
    /// Strings are single-quoted with embedded quotes doubled. Binary values
    /// have no literal form and are rejected.
    pub fn render_literal(&self) -> Result<String> {
        let mut out = String::with_capacity(self.text.len());
        let mut params = self.parameters.iter();
        let mut in_single = false;
        let mut in_double = false;

        for c in self.text.chars() {
            match c {
                '\'' if !in_double => in_single = !in_single,
                '"' if !in_single => in_double = !in_double,
                '?' if !in_single && !in_double => {
                    let value = params.next().ok_or_else(|| {
                        Error::Validation(format!(
                            "statement has more placeholders than the {} parameters given",
                            self.parameters.len()
                        ))
                    })?;
                    write_literal(&mut out, value)?;
                    continue;
                }
                _ => {}
            }
            out.push(c);
        }

        if params.next().is_some() {
            return Err(Error::Validation(format!(
                "statement has fewer placeholders than the {} parameters given",
                self.parameters.len()
            )));
        }
        Ok(out)
    }
}

/// Build `INSERT INTO "table" VALUE {'a': ?, 'b': ?}` for an item.
///
/// Fields follow the item's insertion order.
pub fn insert_statement(item: &Item, table_name: &str) -> Result<Statement> {
    if item.is_empty() {
        return Err(Error::Validation(
            "cannot build an INSERT statement for an empty item".to_string(),
        ));
    }

    let fields: Vec<String> = item
        .names()
        .map(|name| format!("{}: ?", quote_string(name)))
        .collect();
    let text = format!(
        "INSERT INTO {} VALUE {{{}}}",
        quote_identifier(table_name),
        fields.join(", ")
    );
    let parameters = item.iter().map(|(_, v)| v.clone()).collect();
    Ok(Statement::new(text, parameters))
}

/// Build `UPDATE "table" SET "a" = ? SET "b" = ? WHERE "pk" = ? [AND "sk" = ?]`.
///
/// DynamoDB's PartiQL takes one `SET` per assignment.
pub fn update_statement(
    primary_key: &Key,
    non_key_values: &Item,
    table_name: &str,
    sort_key: Option<&Key>,
) -> Result<Statement> {
    if non_key_values.is_empty() {
        return Err(Error::Validation(
            "an UPDATE statement needs at least one attribute to set".to_string(),
        ));
    }

    let mut text = format!("UPDATE {}", quote_identifier(table_name));
    let mut parameters = Vec::with_capacity(non_key_values.len() + 2);

    for (name, value) in non_key_values.iter() {
        let _ = write!(text, " SET {} = ?", quote_identifier(name));
        parameters.push(value.clone());
    }

    push_key_condition(&mut text, &mut parameters, primary_key, sort_key);
    Ok(Statement::new(text, parameters))
}

/// Build `SELECT cols FROM "table" WHERE "pk" = ?`.
///
/// An empty column list selects `*`.
pub fn select_statement(primary_key: &Key, table_name: &str, columns: &[&str]) -> Statement {
    let projection = if columns.is_empty() {
        "*".to_string()
    } else {
        columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut text = format!("SELECT {} FROM {}", projection, quote_identifier(table_name));
    let mut parameters = Vec::with_capacity(1);
    push_key_condition(&mut text, &mut parameters, primary_key, None);
    Statement::new(text, parameters)
}

fn push_key_condition(
    text: &mut String,
    parameters: &mut Vec<Value>,
    primary_key: &Key,
    sort_key: Option<&Key>,
) {
    let _ = write!(text, " WHERE {} = ?", quote_identifier(&primary_key.name));
    parameters.push(primary_key.value.clone().into());

    if let Some(sk) = sort_key {
        let _ = write!(text, " AND {} = ?", quote_identifier(&sk.name));
        parameters.push(sk.value.clone().into());
    }
}

/// Double-quote an identifier, doubling embedded double quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quote a string literal, doubling embedded single quotes.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn write_literal(out: &mut String, value: &Value) -> Result<()> {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(n.as_str()),
        Value::String(s) => out.push_str(&quote_string(s)),
        Value::Binary(_) | Value::BinarySet(_) => {
            return Err(Error::Validation(
                "binary values have no PartiQL literal form; execute with parameters".to_string(),
            ))
        }
        Value::List(list) => {
            out.push('[');
            for (i, v) in list.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(out, v)?;
            }
            out.push(']');
        }
        Value::Map(item) => {
            out.push('{');
            for (i, (name, v)) in item.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&quote_string(name));
                out.push_str(": ");
                write_literal(out, v)?;
            }
            out.push('}');
        }
        Value::StringSet(ss) => {
            let parts: Vec<String> = ss.iter().map(|s| quote_string(s)).collect();
            let _ = write!(out, "<<{}>>", parts.join(", "));
        }
        Value::NumberSet(ns) => {
            let parts: Vec<&str> = ns.iter().map(|n| n.as_str()).collect();
            let _ = write!(out, "<<{}>>", parts.join(", "));
        }
    }
    Ok(())
}
