//! Resource trait: a static declaration of how an entity maps onto a table.
//!
//! A resource is an entity with a store-assigned integer identity and a fixed
//! list of scalar fields. Everything the generic mapper needs to build
//! statements and decode rows comes from this declaration; no request data
//! ever reaches table or column names.

use core::fmt::{Debug, Display};
use core::str::FromStr;

use crate::error::{DomainError, DomainResult};
use crate::value::{Column, Record, Value};

pub trait Resource: Sized + Send + Sync + 'static {
    /// Strongly-typed identifier, assigned by the store.
    type Id: Copy
        + Debug
        + Display
        + FromStr<Err = DomainError>
        + From<i64>
        + Into<i64>
        + Send
        + Sync
        + 'static;

    /// Client-supplied field set (everything except the id).
    type Input: Send + Sync;

    /// Human-readable label used in messages and logs, e.g. `Customer`.
    const NAME: &'static str;
    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Non-id columns, in the order `field_values` produces them.
    const FIELDS: &'static [Column];

    /// Reject input that must never reach the store.
    fn validate(input: &Self::Input) -> DomainResult<()>;

    /// Argument values for `FIELDS`, positionally aligned.
    fn field_values(input: &Self::Input) -> Vec<Value>;

    /// Build the entity from a row holding the id column followed by `FIELDS`.
    fn from_record(record: &Record) -> DomainResult<Self>;

    /// Id column followed by the field columns.
    fn columns() -> Vec<Column> {
        let mut columns = Vec::with_capacity(Self::FIELDS.len() + 1);
        columns.push(Column::int(Self::ID_COLUMN));
        columns.extend_from_slice(Self::FIELDS);
        columns
    }
}
