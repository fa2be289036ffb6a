//! Storage module
//!
//! This module contains the in-memory value representation and the
//! key-value persistence backends:
//! - Values and schema-bound rows
//! - Memory and file key-value stores

pub mod kv;
pub mod tuple;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use tuple::{Row, Value};
