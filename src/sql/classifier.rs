//! Statement normalization and classification
//!
//! Raw statement text is cleaned (comments stripped, whitespace collapsed,
//! trailing semicolons dropped) and then classified by its leading words.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of statement, decided from the leading words of the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    Select,
    CreateTable,
    Insert,
    Update,
    Delete,
    DropTable,
    ShowTables,
    Describe,
    AlterTable,
    TruncateTable,
    CreateDatabase,
    DropDatabase,
    Use,
    ShowDatabases,
    Explain,
    CreateIndex,
    DropIndex,
    Begin,
    Commit,
    Rollback,
}

use StatementKind::*;

/// Leading-word patterns, most specific first within each verb.
const PATTERNS: &[(&[&str], StatementKind)] = &[
    (&["SELECT"], Select),
    (&["CREATE", "TABLE"], CreateTable),
    (&["INSERT", "INTO"], Insert),
    (&["UPDATE"], Update),
    (&["DELETE", "FROM"], Delete),
    (&["DROP", "TABLE"], DropTable),
    (&["SHOW", "TABLES"], ShowTables),
    (&["DESCRIBE"], Describe),
    (&["DESC"], Describe),
    (&["ALTER", "TABLE"], AlterTable),
    (&["TRUNCATE", "TABLE"], TruncateTable),
    (&["CREATE", "DATABASE"], CreateDatabase),
    (&["CREATE", "SCHEMA"], CreateDatabase),
    (&["DROP", "DATABASE"], DropDatabase),
    (&["DROP", "SCHEMA"], DropDatabase),
    (&["USE"], Use),
    (&["SHOW", "DATABASES"], ShowDatabases),
    (&["SHOW", "SCHEMAS"], ShowDatabases),
    (&["EXPLAIN"], Explain),
    (&["CREATE", "UNIQUE", "INDEX"], CreateIndex),
    (&["CREATE", "INDEX"], CreateIndex),
    (&["DROP", "INDEX"], DropIndex),
    (&["BEGIN"], Begin),
    (&["START", "TRANSACTION"], Begin),
    (&["COMMIT"], Commit),
    (&["ROLLBACK"], Rollback),
];

/// Verbs listed in `UnsupportedStatementType` errors
pub const SUPPORTED_STATEMENTS: &str = "SELECT, CREATE TABLE, INSERT INTO, UPDATE, DELETE FROM, \
DROP TABLE, SHOW TABLES, DESCRIBE, ALTER TABLE, TRUNCATE TABLE, CREATE DATABASE, DROP DATABASE, \
USE, SHOW DATABASES, EXPLAIN, CREATE INDEX, DROP INDEX, BEGIN, COMMIT, ROLLBACK";

impl StatementKind {
    /// The verb reported as `queryType`
    pub fn as_str(&self) -> &'static str {
        match self {
            Select => "SELECT",
            CreateTable => "CREATE TABLE",
            Insert => "INSERT",
            Update => "UPDATE",
            Delete => "DELETE",
            DropTable => "DROP TABLE",
            ShowTables => "SHOW TABLES",
            Describe => "DESCRIBE",
            AlterTable => "ALTER TABLE",
            TruncateTable => "TRUNCATE TABLE",
            CreateDatabase => "CREATE DATABASE",
            DropDatabase => "DROP DATABASE",
            Use => "USE",
            ShowDatabases => "SHOW DATABASES",
            Explain => "EXPLAIN",
            CreateIndex => "CREATE INDEX",
            DropIndex => "DROP INDEX",
            Begin => "BEGIN",
            Commit => "COMMIT",
            Rollback => "ROLLBACK",
        }
    }

    /// Whether a successful statement of this kind changes persisted state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            CreateTable
                | DropTable
                | AlterTable
                | TruncateTable
                | Insert
                | Update
                | Delete
                | CreateDatabase
                | DropDatabase
                | CreateIndex
                | DropIndex
        )
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip comments, collapse whitespace and drop trailing semicolons.
///
/// Quoted text is preserved verbatim.
pub fn normalize(input: &str) -> Result<String> {
    let statement = clean(input, false).pop().unwrap_or_default();
    if statement.is_empty() {
        return Err(Error::EmptyStatement);
    }
    Ok(statement)
}

/// Split a batch on top-level semicolons into normalized, non-empty statements.
pub fn split_statements(input: &str) -> Vec<String> {
    clean(input, true)
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
}

/// Classify a normalized statement by its leading words.
pub fn classify(statement: &str) -> Result<StatementKind> {
    if statement.trim().is_empty() {
        return Err(Error::EmptyStatement);
    }

    let upper = statement.to_uppercase();
    let words: Vec<&str> = upper
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .take(3)
        .collect();

    PATTERNS
        .iter()
        .find(|(prefix, _)| words.len() >= prefix.len() && words.iter().zip(prefix.iter()).all(|(w, p)| w == p))
        .map(|(_, kind)| *kind)
        .ok_or_else(|| Error::UnsupportedStatementType(SUPPORTED_STATEMENTS.to_string()))
}

/// Single pass over the input that removes comments and collapses
/// whitespace outside quotes, optionally splitting on `;`.
fn clean(input: &str, split: bool) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' && q != '`' {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
                push_space(&mut current);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    prev = next;
                }
                push_space(&mut current);
            }
            ';' if split => {
                statements.push(finish(&current));
                current.clear();
            }
            c if c.is_whitespace() => push_space(&mut current),
            c => current.push(c),
        }
    }

    statements.push(finish(&current));
    statements
}

fn push_space(s: &mut String) {
    if !s.is_empty() && !s.ends_with(' ') {
        s.push(' ');
    }
}

fn finish(s: &str) -> String {
    let mut trimmed = s.trim();
    while let Some(stripped) = trimmed.strip_suffix(';') {
        trimmed = stripped.trim_end();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let sql = "  SELECT *\n\tFROM users -- all of them\n WHERE /* note */ name = 'a  -- b' ;; ";
        assert_eq!(
            normalize(sql).unwrap(),
            "SELECT * FROM users WHERE name = 'a  -- b'"
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert!(matches!(normalize("  -- nothing\n ;"), Err(Error::EmptyStatement)));
        assert!(matches!(normalize("/* */"), Err(Error::EmptyStatement)));
    }

    #[test]
    fn test_split_statements() {
        let batch = "INSERT INTO t VALUES ('a;b'); SELECT * FROM t;\n-- done\n";
        assert_eq!(
            split_statements(batch),
            vec!["INSERT INTO t VALUES ('a;b')", "SELECT * FROM t"]
        );
    }

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(classify("select * from t").unwrap(), Select);
        assert_eq!(classify("CREATE TABLE t (id INT)").unwrap(), CreateTable);
        assert_eq!(classify("CREATE DATABASE shop").unwrap(), CreateDatabase);
        assert_eq!(classify("CREATE INDEX i ON t (a)").unwrap(), CreateIndex);
        assert_eq!(classify("CREATE UNIQUE INDEX i ON t (a)").unwrap(), CreateIndex);
        assert_eq!(classify("DESC users").unwrap(), Describe);
        assert_eq!(classify("DESCRIBE users").unwrap(), Describe);
        assert_eq!(classify("START TRANSACTION").unwrap(), Begin);
        assert_eq!(classify("SHOW DATABASES").unwrap(), ShowDatabases);
        assert_eq!(classify("USE shop").unwrap(), Use);
        assert_eq!(classify("UPDATE t SET a = 1").unwrap(), Update);
    }

    #[test]
    fn test_classify_needs_whole_words() {
        assert!(matches!(
            classify("USER foo"),
            Err(Error::UnsupportedStatementType(_))
        ));
        assert!(matches!(
            classify("SELECTED x"),
            Err(Error::UnsupportedStatementType(_))
        ));
    }

    #[test]
    fn test_classify_unknown() {
        let err = classify("FOOBAR x").unwrap_err();
        assert!(err.to_string().contains("CREATE TABLE"));
    }

    #[test]
    fn test_mutating_kinds() {
        assert!(Insert.is_mutation());
        assert!(TruncateTable.is_mutation());
        assert!(!Select.is_mutation());
        assert!(!Use.is_mutation());
    }
}
