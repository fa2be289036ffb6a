//! Query execution module
//!
//! This module runs typed statements against the catalog: WHERE evaluation,
//! the SELECT pipeline, and per-statement executors.

pub mod condition;
pub mod executor;
pub mod query;

pub use condition::RowFilter;
pub use executor::{Executor, QueryResult, ResultRow};
