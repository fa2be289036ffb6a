//! Schema definitions for Tabula
//!
//! This module defines columns, table-level constraints and the table itself,
//! which owns its rows.

use serde::{Deserialize, Serialize};

use super::types::DataType;
use crate::error::{Error, Result};
use crate::storage::{Row, Value};

/// Default value attached to a column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ColumnDefault {
    /// `DEFAULT NULL`
    Null,
    /// `DEFAULT CURRENT_TIMESTAMP`, evaluated when the row is written
    CurrentTimestamp,
    /// A de-quoted literal, coerced by column type when used
    Literal(String),
}

/// Column-level `REFERENCES table(column)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: Option<String>,
}

/// Column definition in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    #[serde(rename = "type")]
    pub data_type: DataType,
    /// Declared length or precision, e.g. the 100 of `VARCHAR(100)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    /// Declared scale, e.g. the 2 of `DECIMAL(10,2)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Is this column nullable?
    pub nullable: bool,
    /// Is this the primary key?
    pub primary_key: bool,
    pub auto_increment: bool,
    /// Is this column unique?
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ColumnDefault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKeyRef>,
    /// Members of an ENUM or SET type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

impl Column {
    /// Create a new nullable column with no constraints
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            length: None,
            scale: None,
            nullable: true,
            primary_key: false,
            auto_increment: false,
            unique: false,
            default_value: None,
            foreign_key: None,
            members: Vec::new(),
        }
    }

    /// Set nullable flag
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set primary key flag
    pub fn primary_key(mut self, pk: bool) -> Self {
        self.primary_key = pk;
        self
    }

    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    /// Set unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Set default value
    pub fn default_value(mut self, default: ColumnDefault) -> Self {
        self.default_value = Some(default);
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Whether inserts generate this column's value as `max + 1`.
    pub fn is_identity(&self) -> bool {
        self.auto_increment && self.primary_key
    }

    /// The declared default resolved to a value, `None` if there is none.
    pub fn resolve_default(&self) -> Option<Value> {
        self.default_value.as_ref().map(|d| match d {
            ColumnDefault::Null => Value::Null,
            ColumnDefault::CurrentTimestamp => Value::current_timestamp(),
            ColumnDefault::Literal(raw) => Value::coerce(raw, self.data_type),
        })
    }

    /// Type as it would be written in DDL, e.g. `VARCHAR(50)`
    pub fn type_label(&self) -> String {
        if !self.members.is_empty() {
            let members: Vec<String> = self.members.iter().map(|m| format!("'{}'", m)).collect();
            return format!("{}({})", self.data_type, members.join(","));
        }
        match (self.length, self.scale) {
            (Some(len), Some(scale)) => format!("{}({},{})", self.data_type, len, scale),
            (Some(len), None) => format!("{}({})", self.data_type, len),
            _ => self.data_type.to_string(),
        }
    }
}

/// Kind of a table-level constraint clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    UniqueKey,
    Check,
    Index,
}

/// Table-level constraint, recorded as written but not enforced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConstraint {
    pub kind: ConstraintKind,
    pub definition: String,
}

fn default_engine() -> String {
    "InnoDB".to_string()
}

fn default_charset() -> String {
    "utf8mb4".to_string()
}

/// A table: ordered columns plus the rows stored under them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Table name
    pub name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,
    /// Index names. Indexes have no structural effect.
    #[serde(default)]
    pub indexes: Vec<String>,
    #[serde(default)]
    pub constraints: Vec<TableConstraint>,
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_charset")]
    pub charset: String,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
            engine: default_engine(),
            charset: default_charset(),
        }
    }

    /// Get all columns
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get column names in declaration order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Get column index by name (case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Get column by name (case-insensitive)
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|idx| &self.columns[idx])
    }

    /// Error for a column name this table doesn't have
    pub fn invalid_column(&self, name: &str) -> Error {
        Error::InvalidColumn {
            column: name.to_string(),
            valid: self.column_names().join(", "),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append a row. The value count must match the column count.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::Internal(format!(
                "row for '{}' has {} value(s) but the table has {} column(s)",
                self.name,
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(Row::new(values));
        Ok(())
    }

    /// Apply `f` to every row matching `predicate`, returning how many matched.
    pub fn update_where<P, F>(&mut self, mut predicate: P, mut f: F) -> Result<usize>
    where
        P: FnMut(&Row) -> bool,
        F: FnMut(&mut Row) -> Result<()>,
    {
        let mut updated = 0;
        for row in self.rows.iter_mut() {
            if predicate(row) {
                f(row)?;
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Remove every row matching `predicate`, returning how many were removed.
    pub fn delete_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&Row) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| !predicate(row));
        before - self.rows.len()
    }

    /// Remove all rows, keeping the schema. Returns the prior row count.
    pub fn truncate(&mut self) -> usize {
        let count = self.rows.len();
        self.rows.clear();
        count
    }

    /// `max(existing) + 1` over the integer values of a column, starting at 1.
    ///
    /// Integers are read exactly; strings count only when they parse as `i64`.
    pub fn next_auto_increment(&self, column_index: usize) -> Result<i64> {
        let max = self
            .rows
            .iter()
            .filter_map(|row| match row.get(column_index)? {
                Value::Integer(n) => Some(*n),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            })
            .max();

        match max {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or_else(|| Error::AutoIncrementOverflow {
                table: self.name.clone(),
                column: self.columns[column_index].name.clone(),
            }),
        }
    }

    /// Verify every row still matches the column list (after loading).
    pub fn validate(&self) -> Result<()> {
        match self.rows.iter().position(|r| r.len() != self.columns.len()) {
            Some(idx) => Err(Error::Serialization(format!(
                "row {} of table '{}' has {} value(s), expected {}",
                idx,
                self.name,
                self.rows[idx].len(),
                self.columns.len()
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Column::new("id", DataType::Int)
                    .primary_key(true)
                    .auto_increment(true),
                Column::new("name", DataType::Varchar).length(50).nullable(false),
            ],
        )
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let table = users();
        assert_eq!(table.column_index("NAME"), Some(1));
        assert!(table.column("Id").unwrap().is_identity());
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_push_row_checks_arity() {
        let mut table = users();
        table
            .push_row(vec![Value::Integer(1), Value::String("a".into())])
            .unwrap();
        let err = table.push_row(vec![Value::Integer(2)]).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_next_auto_increment() {
        let mut table = users();
        assert_eq!(table.next_auto_increment(0).unwrap(), 1);
        table
            .push_row(vec![Value::Integer(7), Value::String("a".into())])
            .unwrap();
        table
            .push_row(vec![Value::Integer(3), Value::String("b".into())])
            .unwrap();
        assert_eq!(table.next_auto_increment(0).unwrap(), 8);
    }

    #[test]
    fn test_next_auto_increment_is_exact() {
        let mut table = users();
        table
            .push_row(vec![Value::Integer(-9), Value::String("a".into())])
            .unwrap();
        table
            .push_row(vec![Value::Integer(-4), Value::String("b".into())])
            .unwrap();
        assert_eq!(table.next_auto_increment(0).unwrap(), -3);

        // Above 2^53 a float round-trip would collide
        let big = (1_i64 << 53) + 1;
        table
            .push_row(vec![Value::Integer(big), Value::String("c".into())])
            .unwrap();
        table
            .push_row(vec![Value::String(" 12 ".into()), Value::String("d".into())])
            .unwrap();
        assert_eq!(table.next_auto_increment(0).unwrap(), big + 1);
    }

    #[test]
    fn test_next_auto_increment_overflow() {
        let mut table = users();
        table
            .push_row(vec![Value::Integer(i64::MAX), Value::String("a".into())])
            .unwrap();
        let err = table.next_auto_increment(0).unwrap_err();
        assert!(matches!(err, Error::AutoIncrementOverflow { .. }));
        assert_eq!(err.code(), "AUTO_INCREMENT_OVERFLOW");
    }

    #[test]
    fn test_type_label() {
        let mut col = Column::new("price", DataType::Decimal).length(10);
        col.scale = Some(2);
        assert_eq!(col.type_label(), "DECIMAL(10,2)");

        let mut status = Column::new("status", DataType::Enum);
        status.members = vec!["on".into(), "off".into()];
        assert_eq!(status.type_label(), "ENUM('on','off')");
    }

    #[test]
    fn test_delete_and_truncate() {
        let mut table = users();
        for (id, name) in [(1, "a"), (2, "b"), (3, "c")] {
            table
                .push_row(vec![Value::Integer(id), Value::String(name.into())])
                .unwrap();
        }
        let removed = table.delete_where(|row| row.get(0) == Some(&Value::Integer(2)));
        assert_eq!(removed, 1);
        assert_eq!(table.truncate(), 2);
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.columns().len(), 2);
    }
}
