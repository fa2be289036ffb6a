//! Catalog module
//!
//! This module contains the relational store: databases, table schemas,
//! and data types.

pub mod catalog;
pub mod database;
pub mod schema;
pub mod types;

pub use catalog::Catalog;
pub use database::Database;
pub use schema::{Column, ColumnDefault, ConstraintKind, ForeignKeyRef, Table, TableConstraint};
pub use types::DataType;
