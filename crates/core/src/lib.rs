//! `crudline-core`: store-agnostic building blocks.
//!
//! This crate contains the pieces every resource shares: scalar values and
//! records exchanged with a store, the `Resource` declaration trait and the
//! domain error model. No IO lives here.

pub mod entity;
pub mod error;
pub mod id;
pub mod value;

pub use entity::Resource;
pub use error::{DomainError, DomainResult};
pub use value::{Column, ColumnKind, Record, Value};
