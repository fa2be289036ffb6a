//! Database definitions for Tabula

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::schema::Table;
use crate::error::{Error, Result};

/// A named collection of tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    /// Database name
    pub name: String,
    tables: Vec<Table>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    /// Bumped on every successful schema or row mutation
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Database {
    /// Create a new empty database
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            tables: Vec::new(),
            created_at: now,
            last_modified: now,
            version: 1,
            description: None,
        }
    }

    /// Get all tables
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Check if a table exists (case-insensitive)
    pub fn has_table(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Result<&Table> {
        self.position(name)
            .map(|idx| &self.tables[idx])
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Get a table by name for mutation
    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table> {
        match self.position(name) {
            Some(idx) => Ok(&mut self.tables[idx]),
            None => Err(Error::TableNotFound(name.to_string())),
        }
    }

    /// Add a table
    pub fn create_table(&mut self, table: Table) -> Result<()> {
        if self.has_table(&table.name) {
            return Err(Error::TableAlreadyExists(table.name));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Drop a table, returning it
    pub fn drop_table(&mut self, name: &str) -> Result<Table> {
        match self.position(name) {
            Some(idx) => Ok(self.tables.remove(idx)),
            None => Err(Error::TableNotFound(name.to_string())),
        }
    }

    /// Record a successful mutation.
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
        self.version += 1;
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.tables.iter().try_for_each(Table::validate)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
    }
}
