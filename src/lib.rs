//! Tabula - an embeddable in-memory SQL-like query engine
//!
//! This library provides the components of a small relational engine:
//! - SQL front end (normalization, classification, lexer, parser, AST)
//! - Relational store (databases, tables, schema-bound rows)
//! - Query execution (WHERE evaluation, SELECT pipeline, DDL/DML executors)
//! - Engine dispatcher with history and key-value persistence
//!
//! ```
//! use tabula::{Engine, EngineConfig, MemoryStore};
//!
//! let mut engine = Engine::new(EngineConfig::default(), Box::new(MemoryStore::new()));
//! engine.execute("app", "CREATE TABLE t (id INT PRIMARY KEY AUTO_INCREMENT, v TEXT)");
//! engine.execute("app", "INSERT INTO t (v) VALUES ('x')");
//! let result = engine.execute("app", "SELECT * FROM t");
//! assert_eq!(result.row_count, Some(1));
//! ```

pub mod catalog;
pub mod engine;
pub mod error;
pub mod executor;
pub mod sql;
pub mod storage;

pub use engine::{Engine, EngineConfig, ExecutionResult, HistoryEntry};
pub use error::{Error, Result};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Value};
