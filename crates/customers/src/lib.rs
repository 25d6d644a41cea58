//! Customers resource module.
//!
//! Declares the customer entity, its identifier and its input variants,
//! implemented purely as data plus validation (no IO, no HTTP, no storage).

pub mod customer;

pub use customer::{CreateCustomer, Customer, CustomerId, CustomerInput};
