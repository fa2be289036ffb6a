//! SQL Abstract Syntax Tree (AST)
//!
//! This module defines the AST nodes for SQL statements. Each statement kind
//! carries only the fields its executor needs.

use super::classifier::StatementKind;
use crate::catalog::{Column, TableConstraint};
use crate::storage::Value;

/// A SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// SELECT statement
    Select(SelectStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement
    DropTable { table_name: String, if_exists: bool },
    /// ALTER TABLE, accepted without effect
    AlterTable { table_name: String },
    /// TRUNCATE TABLE statement
    TruncateTable { table_name: String },
    /// CREATE DATABASE / CREATE SCHEMA
    CreateDatabase { name: String, if_not_exists: bool },
    /// DROP DATABASE / DROP SCHEMA
    DropDatabase { name: String, if_exists: bool },
    /// CREATE [UNIQUE] INDEX
    CreateIndex(CreateIndexStatement),
    /// DROP INDEX name [ON table]
    DropIndex {
        index_name: String,
        table_name: Option<String>,
    },
    /// SHOW TABLES
    ShowTables,
    /// SHOW DATABASES
    ShowDatabases,
    /// DESCRIBE table
    Describe { table_name: String },
    /// USE database
    Use { database: String },
    /// EXPLAIN <statement>
    Explain(Box<Statement>),
    /// BEGIN / START TRANSACTION
    BeginTransaction,
    /// COMMIT
    Commit,
    /// ROLLBACK
    Rollback,
}

impl Statement {
    /// The statement kind this node was parsed as
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::Select(_) => StatementKind::Select,
            Statement::Insert(_) => StatementKind::Insert,
            Statement::Update(_) => StatementKind::Update,
            Statement::Delete(_) => StatementKind::Delete,
            Statement::CreateTable(_) => StatementKind::CreateTable,
            Statement::DropTable { .. } => StatementKind::DropTable,
            Statement::AlterTable { .. } => StatementKind::AlterTable,
            Statement::TruncateTable { .. } => StatementKind::TruncateTable,
            Statement::CreateDatabase { .. } => StatementKind::CreateDatabase,
            Statement::DropDatabase { .. } => StatementKind::DropDatabase,
            Statement::CreateIndex(_) => StatementKind::CreateIndex,
            Statement::DropIndex { .. } => StatementKind::DropIndex,
            Statement::ShowTables => StatementKind::ShowTables,
            Statement::ShowDatabases => StatementKind::ShowDatabases,
            Statement::Describe { .. } => StatementKind::Describe,
            Statement::Use { .. } => StatementKind::Use,
            Statement::Explain(_) => StatementKind::Explain,
            Statement::BeginTransaction => StatementKind::Begin,
            Statement::Commit => StatementKind::Commit,
            Statement::Rollback => StatementKind::Rollback,
        }
    }

    /// The table a statement targets, if any
    pub fn table_name(&self) -> Option<&str> {
        match self {
            Statement::Select(s) => Some(&s.table_name),
            Statement::Insert(s) => Some(&s.table_name),
            Statement::Update(s) => Some(&s.table_name),
            Statement::Delete(s) => Some(&s.table_name),
            Statement::CreateTable(s) => Some(&s.table_name),
            Statement::CreateIndex(s) => Some(&s.table_name),
            Statement::DropTable { table_name, .. }
            | Statement::AlterTable { table_name }
            | Statement::TruncateTable { table_name }
            | Statement::Describe { table_name } => Some(table_name),
            Statement::DropIndex { table_name, .. } => table_name.as_deref(),
            _ => None,
        }
    }
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Projection
    pub columns: Projection,
    /// Source table
    pub table_name: String,
    /// WHERE clause
    pub where_clause: Option<Condition>,
    /// GROUP BY columns
    pub group_by: Vec<String>,
    /// ORDER BY clause
    pub order_by: Vec<OrderByItem>,
    /// LIMIT clause
    pub limit: Option<Limit>,
}

/// Requested SELECT columns
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// `*`
    All,
    /// Explicit names, as written
    Columns(Vec<String>),
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub column: String,
    /// Ascending (true) or descending (false)
    pub ascending: bool,
}

/// `LIMIT count`, `LIMIT offset, count` or `LIMIT count OFFSET offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub offset: usize,
    pub count: usize,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table_name: String,
    /// Column names (optional)
    pub columns: Option<Vec<String>>,
    /// Value tuples
    pub values: Vec<Vec<Literal>>,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table_name: String,
    /// SET clause (column = value pairs)
    pub assignments: Vec<Assignment>,
    /// WHERE clause
    pub where_clause: Option<Condition>,
}

/// Column assignment (for UPDATE)
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name
    pub column: String,
    /// New value
    pub value: Literal,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table name
    pub table_name: String,
    /// WHERE clause
    pub where_clause: Option<Condition>,
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<Column>,
    /// Table constraints, recorded as written
    pub constraints: Vec<TableConstraint>,
    /// IF NOT EXISTS flag
    pub if_not_exists: bool,
    pub engine: Option<String>,
    pub charset: Option<String>,
}

/// CREATE INDEX statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    /// Index name
    pub index_name: String,
    /// Table name
    pub table_name: String,
    /// Column names
    pub columns: Vec<String>,
    /// UNIQUE flag
    pub unique: bool,
}

/// A literal as written in VALUES, SET or a WHERE predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// NULL
    Null,
    /// DEFAULT
    Default,
    /// CURRENT_TIMESTAMP or NOW()
    CurrentTimestamp,
    /// Quoted string, de-quoted
    String(String),
    /// Numeric literal, as written
    Number(String),
    /// Any other bare word, e.g. TRUE
    Word(String),
}

impl Literal {
    /// Raw text to coerce by column type. NULL, DEFAULT and
    /// CURRENT_TIMESTAMP have none.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Literal::String(s) | Literal::Number(s) | Literal::Word(s) => Some(s),
            Literal::Null | Literal::Default | Literal::CurrentTimestamp => None,
        }
    }

    /// Untyped value used on the right-hand side of comparisons
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null | Literal::Default => Value::Null,
            Literal::CurrentTimestamp => Value::current_timestamp(),
            Literal::String(s) | Literal::Number(s) | Literal::Word(s) => Value::String(s.clone()),
        }
    }
}

/// WHERE clause: simple predicates joined by AND/OR.
///
/// There is no precedence and no grouping. Connectives fold strictly left to
/// right, so `a OR b AND c` means `(a OR b) AND c`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub first: Predicate,
    pub rest: Vec<(LogicalOperator, Predicate)>,
}

/// AND / OR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// A single simple condition
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `col <op> value`
    Compare {
        column: String,
        op: CompareOperator,
        value: Literal,
    },
    /// `col [NOT] IN (v1, v2, ...)`
    InList {
        column: String,
        values: Vec<Literal>,
        negated: bool,
    },
    /// `col [NOT] LIKE 'pattern'`
    Like {
        column: String,
        pattern: String,
        negated: bool,
    },
    /// `col IS [NOT] NULL`
    IsNull { column: String, negated: bool },
    /// Text that matched no predicate form. Evaluates to true.
    Unrecognized(String),
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOperator {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}
