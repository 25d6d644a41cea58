//! Scalar values and records exchanged with a store.
//!
//! Statement arguments and result rows travel as [`Value`]s so the mapping
//! layer never depends on a particular driver. A [`Record`] is one decoded
//! row, keyed by the column names the statement declared.

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Column type as far as decoding is concerned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Text,
}

/// A named, typed column of a resource table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn int(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Int,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }
}

/// A scalar bound to a statement or read from a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One decoded row: column values in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(&'static str, Value)>,
}

impl Record {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: &'static str, value: Value) {
        self.fields.push((column, value));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, v)| v)
    }

    /// Read a non-null integer column.
    pub fn int(&self, column: &str) -> DomainResult<i64> {
        match self.get(column) {
            Some(Value::Int(v)) => Ok(*v),
            Some(other) => Err(DomainError::decode(format!(
                "column `{column}`: expected integer, found {other:?}"
            ))),
            None => Err(DomainError::decode(format!("column `{column}` missing"))),
        }
    }

    /// Read a non-null text column.
    pub fn text(&self, column: &str) -> DomainResult<&str> {
        match self.get(column) {
            Some(Value::Text(v)) => Ok(v.as_str()),
            Some(other) => Err(DomainError::decode(format!(
                "column `{column}`: expected text, found {other:?}"
            ))),
            None => Err(DomainError::decode(format!("column `{column}` missing"))),
        }
    }
}

impl FromIterator<(&'static str, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (&'static str, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
