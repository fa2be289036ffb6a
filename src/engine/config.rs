//! Engine configuration

/// Default bound on the history log
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Characters of statement text kept per history entry
pub const DEFAULT_HISTORY_QUERY_CHARS: usize = 200;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of history entries kept, newest first
    pub history_capacity: usize,
    /// Statement text is truncated to this many characters in history
    pub history_query_chars: usize,
    /// Database used when the caller names none and nothing is selected
    pub default_database: String,
    /// Store key holding the database collection
    pub databases_key: String,
    /// Store key holding the current database name
    pub current_database_key: String,
    /// Store key holding the history log
    pub history_key: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            history_query_chars: DEFAULT_HISTORY_QUERY_CHARS,
            default_database: "default".to_string(),
            databases_key: "tabula.databases".to_string(),
            current_database_key: "tabula.current_database".to_string(),
            history_key: "tabula.history".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create a new engine config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the history capacity
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn history_query_chars(mut self, chars: usize) -> Self {
        self.history_query_chars = chars;
        self
    }

    /// Set the fallback database name
    pub fn default_database(mut self, name: impl Into<String>) -> Self {
        self.default_database = name.into();
        self
    }

    /// Prefix all three persistence keys, e.g. `app` gives `app.databases`.
    pub fn key_prefix(mut self, prefix: &str) -> Self {
        self.databases_key = format!("{}.databases", prefix);
        self.current_database_key = format!("{}.current_database", prefix);
        self.history_key = format!("{}.history", prefix);
        self
    }
}
