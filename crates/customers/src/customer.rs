use serde::{Deserialize, Serialize};

use crudline_core::{Column, DomainError, DomainResult, Record, Resource, Value, impl_record_id};

/// Customer identifier (store-assigned, immutable).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(i64);

impl_record_id!(CustomerId, "CustomerId");

/// A persisted customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
}

/// Fields a client may set on create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInput {
    pub name: String,
}

impl CustomerInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Where a create request took its name from.
///
/// `POST /customer/{name}` and `POST /customer` both end up here and converge
/// on the same insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateCustomer {
    FromPath { name: String },
    FromBody { name: String },
}

impl CreateCustomer {
    pub fn source(&self) -> &'static str {
        match self {
            Self::FromPath { .. } => "path",
            Self::FromBody { .. } => "body",
        }
    }

    pub fn into_input(self) -> CustomerInput {
        match self {
            Self::FromPath { name } | Self::FromBody { name } => CustomerInput { name },
        }
    }
}

const FIELDS: &[Column] = &[Column::text("name")];

impl Resource for Customer {
    type Id = CustomerId;
    type Input = CustomerInput;

    const NAME: &'static str = "Customer";
    const TABLE: &'static str = "customers";
    const ID_COLUMN: &'static str = "id";
    const FIELDS: &'static [Column] = FIELDS;

    fn validate(input: &CustomerInput) -> DomainResult<()> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("customer name must not be empty"));
        }
        Ok(())
    }

    fn field_values(input: &CustomerInput) -> Vec<Value> {
        vec![Value::from(input.name.as_str())]
    }

    fn from_record(record: &Record) -> DomainResult<Self> {
        Ok(Self {
            id: CustomerId::new(record.int(Self::ID_COLUMN)?),
            name: record.text("name")?.to_string(),
        })
    }
}
