//! Execution dispatcher
//!
//! `Engine` is the boundary of the crate: it takes raw statement text, runs it
//! through the SQL front end and the executor, persists mutations into a
//! `KeyValueStore`, records history, and always answers with an
//! `ExecutionResult`. Errors and panics inside execution become failed results.

pub mod config;
pub mod history;
pub mod result;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, warn};

pub use config::EngineConfig;
pub use history::{History, HistoryEntry};
pub use result::{ExecutionResult, UNKNOWN_QUERY_TYPE};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::executor::{Executor, QueryResult};
use crate::sql::{classify, normalize, parse, split_statements, StatementKind};
use crate::storage::KeyValueStore;

/// The query engine: catalog, history and the persistence store
pub struct Engine {
    config: EngineConfig,
    executor: Executor,
    history: History,
    store: Box<dyn KeyValueStore>,
}

impl Engine {
    /// Create an engine, loading any state previously saved in `store`.
    ///
    /// Unreadable state is logged and replaced with an empty catalog or history.
    pub fn new(config: EngineConfig, store: Box<dyn KeyValueStore>) -> Self {
        let catalog = Catalog::load(
            store.as_ref(),
            &config.databases_key,
            &config.current_database_key,
        )
        .unwrap_or_else(|e| {
            error!(error = %e, code = e.code(), "failed to load databases, starting empty");
            Catalog::new()
        });

        let history = load_history(store.as_ref(), &config).unwrap_or_else(|e| {
            error!(error = %e, code = e.code(), "failed to load history, starting empty");
            History::new(config.history_capacity)
        });

        debug!(
            databases = catalog.databases().count(),
            history = history.len(),
            "engine state loaded"
        );

        Self {
            config,
            executor: Executor::new(catalog),
            history,
            store,
        }
    }

    /// Execute one statement against `database`.
    ///
    /// An empty `database` falls back to the current database, then to the
    /// configured default.
    pub fn execute(&mut self, database: &str, sql: &str) -> ExecutionResult {
        let start = Instant::now();

        let (statement, kind) = match prepare(sql) {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!(error = %e, "statement rejected before execution");
                return ExecutionResult::from_error(UNKNOWN_QUERY_TYPE, &e, elapsed_ms(start));
            }
        };
        debug!(kind = %kind, "statement classified");

        let target = self.target_database(database);
        let databases_before = self.executor.catalog().databases().count();
        let executor = &mut self.executor;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<QueryResult> {
            let stmt = parse(&statement, kind)?;
            executor.execute(&target, &stmt)
        }))
        .unwrap_or_else(|payload| Err(Error::Internal(panic_message(payload.as_ref()))));

        let result = match outcome {
            Ok(query) => {
                self.after_success(kind, &target, &query, databases_before);
                ExecutionResult::from_query(kind.as_str(), &target, query, elapsed_ms(start))
            }
            Err(e) => {
                debug!(kind = %kind, error = %e, "statement failed");
                ExecutionResult::from_error(kind.as_str(), &e, elapsed_ms(start))
            }
        };

        self.record_history(&statement, &result);
        result
    }

    /// Execute `;`-separated statements in order, stopping at the first failure.
    ///
    /// A successful `USE` switches the target for the statements after it.
    /// Earlier statements are not undone when a later one fails.
    pub fn execute_batch(&mut self, database: &str, sql: &str) -> Vec<ExecutionResult> {
        let statements = split_statements(sql);
        if statements.is_empty() {
            return vec![self.execute(database, sql)];
        }

        let mut target = database.to_string();
        let mut results = Vec::with_capacity(statements.len());
        for statement in statements {
            let result = self.execute(&target, &statement);
            let success = result.success;
            if success && result.query_type == StatementKind::Use.as_str() {
                if let Some(db) = &result.database {
                    target = db.clone();
                }
            }
            results.push(result);
            if !success {
                break;
            }
        }
        results
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Drop every history entry and persist the empty log.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.save_history();
    }

    /// Name of the database selected with `USE`
    pub fn current_database(&self) -> Option<&str> {
        self.executor.catalog().current_database()
    }

    pub fn catalog(&self) -> &Catalog {
        self.executor.catalog()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    fn target_database(&self, requested: &str) -> String {
        let requested = requested.trim();
        if !requested.is_empty() {
            return requested.to_string();
        }
        self.current_database()
            .unwrap_or(&self.config.default_database)
            .to_string()
    }

    fn after_success(
        &mut self,
        kind: StatementKind,
        target: &str,
        query: &QueryResult,
        databases_before: usize,
    ) {
        if kind.is_mutation() {
            if !matches!(
                kind,
                StatementKind::CreateDatabase | StatementKind::DropDatabase
            ) {
                if let Ok(db) = self.executor.catalog_mut().get_database_mut(target) {
                    db.touch();
                }
            }
            self.save_databases();
            self.save_current();
        } else {
            // A read can still create its database on first access
            if self.executor.catalog().databases().count() != databases_before {
                self.save_databases();
            }
            if kind == StatementKind::Use && query.database.is_some() {
                self.save_current();
            }
        }
    }

    fn record_history(&mut self, statement: &str, result: &ExecutionResult) {
        let result_label = match &result.error_code {
            Some(code) if !result.success => code.clone(),
            _ => result.query_type.clone(),
        };
        self.history.record(HistoryEntry {
            id: 0,
            query: history::truncate_query(statement, self.config.history_query_chars),
            result_label,
            timestamp: Utc::now(),
            success: result.success,
            execution_time: result.execution_time,
            row_count: result.row_count,
            affected_rows: result.affected_rows,
        });
        self.save_history();
    }

    fn save_databases(&mut self) {
        let key = self.config.databases_key.clone();
        if let Err(e) = self
            .executor
            .catalog()
            .save_databases(self.store.as_mut(), &key)
        {
            error!(error = %e, code = e.code(), key = %key, "failed to persist databases");
        }
    }

    fn save_current(&mut self) {
        let key = self.config.current_database_key.clone();
        if let Err(e) = self
            .executor
            .catalog()
            .save_current(self.store.as_mut(), &key)
        {
            error!(error = %e, code = e.code(), key = %key, "failed to persist current database");
        }
    }

    fn save_history(&mut self) {
        let saved = self
            .history
            .to_json()
            .map_err(Error::from)
            .and_then(|json| self.store.set(&self.config.history_key, &json));
        if let Err(e) = saved {
            error!(error = %e, code = e.code(), "failed to persist history");
        }
    }
}

/// Normalize and classify raw statement text.
fn prepare(sql: &str) -> Result<(String, StatementKind)> {
    let statement = normalize(sql)?;
    let kind = classify(&statement)?;
    Ok((statement, kind))
}

fn load_history(store: &dyn KeyValueStore, config: &EngineConfig) -> Result<History> {
    match store.get(&config.history_key)? {
        Some(json) => {
            let entries: Vec<HistoryEntry> = serde_json::from_str(&json)?;
            Ok(History::from_entries(entries, config.history_capacity))
        }
        None => Ok(History::new(config.history_capacity)),
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    warn!(message = %message, "panic caught at the engine boundary");
    message
}
