//! Statement Executor for Tabula
//!
//! This module runs parsed statements against the catalog and returns results.

use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use super::condition::RowFilter;
use super::query;
use crate::catalog::{Catalog, Column, ColumnDefault, Database, Table};
use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::storage::tuple::TIMESTAMP_FORMAT;
use crate::storage::Value;

/// A result row: column name to value, in projection order
pub type ResultRow = IndexMap<String, Value>;

/// Query result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Column names
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<ResultRow>,
    /// Number of affected rows (for INSERT/UPDATE/DELETE/TRUNCATE)
    pub affected_rows: usize,
    /// Message
    pub message: Option<String>,
    /// Database selected by `USE`
    pub database: Option<String>,
}

impl QueryResult {
    /// Create a new empty result
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            affected_rows: 0,
            message: None,
            database: None,
        }
    }

    /// Create a result with a message
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// Create a result with affected rows count
    pub fn with_affected_rows(count: usize, message: impl Into<String>) -> Self {
        Self {
            affected_rows: count,
            message: Some(message.into()),
            ..Self::empty()
        }
    }

    /// Create a result set from column names and rows of values
    pub fn with_rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|values| columns.iter().cloned().zip(values).collect())
            .collect();
        Self {
            columns,
            rows,
            ..Self::empty()
        }
    }

    /// Number of result rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Statement executor. Owns the catalog.
#[derive(Debug, Default)]
pub struct Executor {
    catalog: Catalog,
}

impl Executor {
    /// Create an executor over an existing catalog
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Execute a statement against the named database.
    ///
    /// Statements that work on tables create the database on first access.
    pub fn execute(&mut self, database: &str, stmt: &Statement) -> Result<QueryResult> {
        debug!(database, kind = %stmt.kind(), "executing statement");

        match stmt {
            Statement::CreateDatabase {
                name,
                if_not_exists,
            } => self.execute_create_database(name, *if_not_exists),
            Statement::DropDatabase { name, if_exists } => {
                self.execute_drop_database(name, *if_exists)
            }
            Statement::ShowDatabases => Ok(self.execute_show_databases()),
            Statement::Use { database } => self.execute_use(database),
            Statement::BeginTransaction => Ok(QueryResult::with_message(
                "Transaction started (statements apply immediately)",
            )),
            Statement::Commit => Ok(QueryResult::with_message("Transaction committed")),
            Statement::Rollback => Ok(QueryResult::with_message(
                "Transaction rolled back (no changes were undone)",
            )),
            _ if database.trim().is_empty() => Err(Error::NoDatabaseSelected),
            other => {
                let (db, created) = self.catalog.database_or_create(database);
                if created {
                    info!(database = %db.name, "database created on first access");
                }
                execute_in_database(db, other)
            }
        }
    }

    fn execute_create_database(&mut self, name: &str, if_not_exists: bool) -> Result<QueryResult> {
        if if_not_exists && self.catalog.has_database(name) {
            return Ok(QueryResult::with_message(format!(
                "Database '{}' already exists",
                name
            )));
        }
        self.catalog.create_database(name)?;
        info!(database = name, "database created");
        Ok(QueryResult::with_message(format!(
            "Database '{}' created",
            name
        )))
    }

    fn execute_drop_database(&mut self, name: &str, if_exists: bool) -> Result<QueryResult> {
        if if_exists && !self.catalog.has_database(name) {
            return Ok(QueryResult::with_message(format!(
                "Database '{}' does not exist",
                name
            )));
        }
        let db = self.catalog.drop_database(name)?;
        info!(database = %db.name, tables = db.tables().len(), "database dropped");
        Ok(QueryResult::with_message(format!(
            "Database '{}' dropped",
            db.name
        )))
    }

    fn execute_show_databases(&self) -> QueryResult {
        let rows = self
            .catalog
            .databases()
            .map(|db| {
                vec![
                    Value::String(db.name.clone()),
                    Value::Integer(db.tables().len() as i64),
                ]
            })
            .collect();
        QueryResult::with_rows(&["Database", "Tables"], rows)
    }

    fn execute_use(&mut self, name: &str) -> Result<QueryResult> {
        self.catalog.use_database(name)?;
        let current = self.catalog.current_database().unwrap_or(name).to_string();
        Ok(QueryResult {
            message: Some(format!("Database changed to '{}'", current)),
            database: Some(current),
            ..QueryResult::empty()
        })
    }
}

/// Statements scoped to one database
fn execute_in_database(db: &mut Database, stmt: &Statement) -> Result<QueryResult> {
    match stmt {
        Statement::Select(select) => query::select(db.get_table(&select.table_name)?, select),
        Statement::Insert(insert) => execute_insert(db, insert),
        Statement::Update(update) => execute_update(db, update),
        Statement::Delete(delete) => execute_delete(db, delete),
        Statement::CreateTable(create) => execute_create_table(db, create),
        Statement::DropTable {
            table_name,
            if_exists,
        } => execute_drop_table(db, table_name, *if_exists),
        Statement::AlterTable { table_name } => Ok(QueryResult::with_message(format!(
            "ALTER TABLE '{}' accepted; schema changes are not applied",
            table_name
        ))),
        Statement::TruncateTable { table_name } => {
            let removed = db.get_table_mut(table_name)?.truncate();
            Ok(QueryResult::with_affected_rows(
                removed,
                format!("Table '{}' truncated, {} row(s) removed", table_name, removed),
            ))
        }
        Statement::CreateIndex(index) => execute_create_index(db, index),
        Statement::DropIndex {
            index_name,
            table_name,
        } => execute_drop_index(db, index_name, table_name.as_deref()),
        Statement::ShowTables => Ok(execute_show_tables(db)),
        Statement::Describe { table_name } => execute_describe(db.get_table(table_name)?),
        Statement::Explain(inner) => Ok(execute_explain(db, inner)),
        other => Err(Error::Internal(format!(
            "{} cannot run inside a database",
            other.kind()
        ))),
    }
}

// ========== DDL ==========

fn execute_create_table(db: &mut Database, stmt: &CreateTableStatement) -> Result<QueryResult> {
    if db.has_table(&stmt.table_name) {
        if stmt.if_not_exists {
            return Ok(QueryResult::with_message(format!(
                "Table '{}' already exists",
                stmt.table_name
            )));
        }
        return Err(Error::TableAlreadyExists(stmt.table_name.clone()));
    }

    let mut table = Table::new(stmt.table_name.clone(), stmt.columns.clone());
    table.constraints = stmt.constraints.clone();
    if let Some(engine) = &stmt.engine {
        table.engine = engine.clone();
    }
    if let Some(charset) = &stmt.charset {
        table.charset = charset.clone();
    }

    let column_count = table.columns().len();
    db.create_table(table)?;
    info!(database = %db.name, table = %stmt.table_name, columns = column_count, "table created");

    Ok(QueryResult::with_message(format!(
        "Table '{}' created with {} column(s)",
        stmt.table_name, column_count
    )))
}

fn execute_drop_table(db: &mut Database, table_name: &str, if_exists: bool) -> Result<QueryResult> {
    if if_exists && !db.has_table(table_name) {
        return Ok(QueryResult::with_message(format!(
            "Table '{}' does not exist",
            table_name
        )));
    }
    let table = db.drop_table(table_name)?;
    info!(database = %db.name, table = %table.name, rows = table.row_count(), "table dropped");
    Ok(QueryResult::with_message(format!(
        "Table '{}' dropped",
        table.name
    )))
}

/// Index names are recorded on the table; no index structure is built.
fn execute_create_index(db: &mut Database, stmt: &CreateIndexStatement) -> Result<QueryResult> {
    let table = db.get_table_mut(&stmt.table_name)?;
    for column in &stmt.columns {
        if table.column_index(column).is_none() {
            return Err(table.invalid_column(column));
        }
    }
    if !table
        .indexes
        .iter()
        .any(|i| i.eq_ignore_ascii_case(&stmt.index_name))
    {
        table.indexes.push(stmt.index_name.clone());
    }
    Ok(QueryResult::with_message(format!(
        "Index '{}' created on '{}'",
        stmt.index_name, stmt.table_name
    )))
}

fn execute_drop_index(
    db: &mut Database,
    index_name: &str,
    table_name: Option<&str>,
) -> Result<QueryResult> {
    let names: Vec<String> = match table_name {
        Some(name) => vec![db.get_table(name)?.name.clone()],
        None => db.tables().iter().map(|t| t.name.clone()).collect(),
    };
    for name in names {
        let table = db.get_table_mut(&name)?;
        table.indexes.retain(|i| !i.eq_ignore_ascii_case(index_name));
    }
    Ok(QueryResult::with_message(format!(
        "Index '{}' dropped",
        index_name
    )))
}

// ========== DML ==========

fn execute_insert(db: &mut Database, stmt: &InsertStatement) -> Result<QueryResult> {
    let table = db.get_table_mut(&stmt.table_name)?;

    let targets: Vec<usize> = match &stmt.columns {
        Some(names) => names
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| table.invalid_column(name))
            })
            .collect::<Result<_>>()?,
        None => (0..table.columns().len()).collect(),
    };

    // Reject the whole statement before any row is written
    if let Some(tuple) = stmt.values.iter().find(|t| t.len() != targets.len()) {
        return Err(Error::ColumnCountMismatch {
            columns: targets.len(),
            values: tuple.len(),
        });
    }

    for tuple in &stmt.values {
        let values = build_row(table, &targets, tuple)?;
        table.push_row(values)?;
    }

    let inserted = stmt.values.len();
    Ok(QueryResult::with_affected_rows(
        inserted,
        format!("{} row(s) inserted", inserted),
    ))
}

/// Fill one row: explicit values first, then back-fill the rest.
fn build_row(table: &Table, targets: &[usize], tuple: &[Literal]) -> Result<Vec<Value>> {
    let columns = table.columns();
    let mut slots: Vec<Option<Value>> = vec![None; columns.len()];

    for (&idx, literal) in targets.iter().zip(tuple) {
        let column = &columns[idx];
        let value = if column.is_identity() {
            Value::Integer(table.next_auto_increment(idx)?)
        } else {
            literal_value(column, literal)
        };
        slots[idx] = Some(value);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| match slot {
            Some(value) => Ok(value),
            None if columns[idx].is_identity() => {
                Ok(Value::Integer(table.next_auto_increment(idx)?))
            }
            None => Ok(fill_value(&columns[idx])),
        })
        .collect()
}

/// Default if declared, else NULL when nullable, else the type's zero.
fn fill_value(column: &Column) -> Value {
    column.resolve_default().unwrap_or_else(|| {
        if column.nullable {
            Value::Null
        } else {
            Value::zero(column.data_type)
        }
    })
}

/// Typed value of a VALUES / SET literal for `column`
fn literal_value(column: &Column, literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Default => fill_value(column),
        Literal::CurrentTimestamp => {
            let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();
            if column.data_type.is_temporal() {
                Value::coerce(&now, column.data_type)
            } else {
                Value::String(now)
            }
        }
        Literal::String(raw) | Literal::Number(raw) | Literal::Word(raw) => {
            Value::coerce(raw, column.data_type)
        }
    }
}

fn execute_update(db: &mut Database, stmt: &UpdateStatement) -> Result<QueryResult> {
    let table = db.get_table_mut(&stmt.table_name)?;

    let assignments: Vec<(usize, Value)> = stmt
        .assignments
        .iter()
        .map(|a| {
            let idx = table
                .column_index(&a.column)
                .ok_or_else(|| table.invalid_column(&a.column))?;
            Ok((idx, literal_value(&table.columns()[idx], &a.value)))
        })
        .collect::<Result<_>>()?;

    let filter = RowFilter::for_clause(stmt.where_clause.as_ref(), table)?;
    let updated = table.update_where(
        |row| filter.as_ref().map_or(true, |f| f.matches(row)),
        |row| {
            for (idx, value) in &assignments {
                row.set(*idx, value.clone());
            }
            Ok(())
        },
    )?;

    Ok(QueryResult::with_affected_rows(
        updated,
        format!("{} row(s) updated", updated),
    ))
}

fn execute_delete(db: &mut Database, stmt: &DeleteStatement) -> Result<QueryResult> {
    let table = db.get_table_mut(&stmt.table_name)?;
    let filter = RowFilter::for_clause(stmt.where_clause.as_ref(), table)?;
    let deleted = table.delete_where(|row| filter.as_ref().map_or(true, |f| f.matches(row)));

    Ok(QueryResult::with_affected_rows(
        deleted,
        format!("{} row(s) deleted", deleted),
    ))
}

// ========== Introspection ==========

fn execute_show_tables(db: &Database) -> QueryResult {
    let label = format!("Tables_in_{}", db.name);
    let rows = db
        .tables()
        .iter()
        .map(|t| {
            vec![
                Value::String(t.name.clone()),
                Value::Integer(t.row_count() as i64),
            ]
        })
        .collect();
    QueryResult::with_rows(&[label.as_str(), "Rows"], rows)
}

fn execute_describe(table: &Table) -> Result<QueryResult> {
    let rows = table
        .columns()
        .iter()
        .map(|c| {
            let key = if c.primary_key {
                "PRI"
            } else if c.unique {
                "UNI"
            } else if c.foreign_key.is_some() {
                "MUL"
            } else {
                ""
            };
            let default = match &c.default_value {
                None | Some(ColumnDefault::Null) => Value::Null,
                Some(ColumnDefault::CurrentTimestamp) => Value::String("CURRENT_TIMESTAMP".into()),
                Some(ColumnDefault::Literal(raw)) => Value::String(raw.clone()),
            };
            let extra = if c.auto_increment { "auto_increment" } else { "" };
            vec![
                Value::String(c.name.clone()),
                Value::String(c.type_label()),
                Value::String(if c.nullable { "YES" } else { "NO" }.into()),
                Value::String(key.into()),
                default,
                Value::String(extra.into()),
            ]
        })
        .collect();
    Ok(QueryResult::with_rows(
        &["Field", "Type", "Null", "Key", "Default", "Extra"],
        rows,
    ))
}

/// A single canned plan row. The inner statement is not run.
fn execute_explain(db: &Database, inner: &Statement) -> QueryResult {
    let table = inner.table_name().and_then(|name| db.get_table(name).ok());
    let select_type = match inner {
        Statement::Select(_) => "SIMPLE".to_string(),
        other => other.kind().to_string(),
    };
    let has_where = match inner {
        Statement::Select(s) => s.where_clause.is_some(),
        Statement::Update(u) => u.where_clause.is_some(),
        Statement::Delete(d) => d.where_clause.is_some(),
        _ => false,
    };

    let row = vec![
        Value::Integer(1),
        Value::String(select_type),
        inner
            .table_name()
            .map_or(Value::Null, |name| Value::String(name.to_string())),
        Value::String("ALL".into()),
        Value::Null,
        Value::Null,
        table.map_or(Value::Null, |t| Value::Integer(t.row_count() as i64)),
        Value::String(if has_where { "Using where" } else { "" }.into()),
    ];
    QueryResult::with_rows(
        &[
            "id",
            "select_type",
            "table",
            "type",
            "possible_keys",
            "key",
            "rows",
            "Extra",
        ],
        vec![row],
    )
}
