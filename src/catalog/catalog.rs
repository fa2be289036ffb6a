//! System Catalog for Tabula
//!
//! The catalog is the relational store: every database, its tables and rows,
//! plus the "current database" pointer. It serialises itself into a
//! `KeyValueStore` as whole values.

use indexmap::IndexMap;

use super::database::Database;
use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// System Catalog - owns all databases
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    /// Databases keyed by lower-cased name, in creation order
    databases: IndexMap<String, Database>,
    /// Name of the database selected with `USE`
    current: Option<String>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a database
    pub fn create_database(&mut self, name: &str) -> Result<&mut Database> {
        let key = name.to_lowercase();
        if self.databases.contains_key(&key) {
            return Err(Error::DatabaseAlreadyExists(name.to_string()));
        }
        Ok(self
            .databases
            .entry(key)
            .or_insert_with(|| Database::new(name)))
    }

    /// Drop a database. Dropping the current database clears the pointer.
    pub fn drop_database(&mut self, name: &str) -> Result<Database> {
        let key = name.to_lowercase();
        let db = self
            .databases
            .shift_remove(&key)
            .ok_or_else(|| Error::DatabaseNotFound(name.to_string()))?;

        if self
            .current
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(name))
        {
            self.current = None;
        }
        Ok(db)
    }

    /// Check if a database exists
    pub fn has_database(&self, name: &str) -> bool {
        self.databases.contains_key(&name.to_lowercase())
    }

    /// Get a database by name
    pub fn get_database(&self, name: &str) -> Result<&Database> {
        self.databases
            .get(&name.to_lowercase())
            .ok_or_else(|| Error::DatabaseNotFound(name.to_string()))
    }

    /// Get a database by name for mutation
    pub fn get_database_mut(&mut self, name: &str) -> Result<&mut Database> {
        self.databases
            .get_mut(&name.to_lowercase())
            .ok_or_else(|| Error::DatabaseNotFound(name.to_string()))
    }

    /// Get a database, creating it on first access. The flag reports creation.
    pub fn database_or_create(&mut self, name: &str) -> (&mut Database, bool) {
        let key = name.to_lowercase();
        let created = !self.databases.contains_key(&key);
        let db = self
            .databases
            .entry(key)
            .or_insert_with(|| Database::new(name));
        (db, created)
    }

    /// All databases in creation order
    pub fn databases(&self) -> impl Iterator<Item = &Database> {
        self.databases.values()
    }

    /// Select the current database
    pub fn use_database(&mut self, name: &str) -> Result<()> {
        let db = self.get_database(name)?;
        self.current = Some(db.name.clone());
        Ok(())
    }

    /// Name of the current database, if one is selected
    pub fn current_database(&self) -> Option<&str> {
        self.current.as_deref()
    }

    // ========== Persistence ==========

    /// Write the database collection under `key`
    pub fn save_databases(&self, store: &mut dyn KeyValueStore, key: &str) -> Result<()> {
        let databases: Vec<&Database> = self.databases.values().collect();
        let json = serde_json::to_string(&databases)?;
        store.set(key, &json)
    }

    /// Write the current database pointer under `key`
    pub fn save_current(&self, store: &mut dyn KeyValueStore, key: &str) -> Result<()> {
        let json = serde_json::to_string(&self.current)?;
        store.set(key, &json)
    }

    /// Load a catalog. Missing keys yield an empty catalog.
    pub fn load(store: &dyn KeyValueStore, databases_key: &str, current_key: &str) -> Result<Self> {
        let mut catalog = Self::new();

        if let Some(json) = store.get(databases_key)? {
            let databases: Vec<Database> = serde_json::from_str(&json)?;
            for db in databases {
                db.validate()?;
                catalog.databases.insert(db.name.to_lowercase(), db);
            }
        }

        if let Some(json) = store.get(current_key)? {
            let current: Option<String> = serde_json::from_str(&json)?;
            catalog.current = current.filter(|name| catalog.has_database(name));
        }

        Ok(catalog)
    }
}
