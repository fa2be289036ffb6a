//! Data types for Tabula
//!
//! This module defines the column types accepted by `CREATE TABLE`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL Data Types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Int,
    BigInt,
    Varchar,
    Text,
    LongText,
    Date,
    DateTime,
    Timestamp,
    Time,
    Year,
    Decimal,
    Float,
    Double,
    Boolean,
    Blob,
    Json,
    Enum,
    Set,
}

impl DataType {
    /// Resolve a type name as written in a column definition.
    ///
    /// Common aliases (`INTEGER`, `CHAR`, `BOOL`, `NUMERIC`, ...) fold onto the
    /// nearest supported type.
    pub fn from_name(name: &str) -> Option<DataType> {
        let dt = match name.to_uppercase().as_str() {
            "INT" | "INTEGER" | "SMALLINT" | "TINYINT" | "MEDIUMINT" => DataType::Int,
            "BIGINT" => DataType::BigInt,
            "VARCHAR" | "CHAR" | "NVARCHAR" | "NCHAR" => DataType::Varchar,
            "TEXT" | "TINYTEXT" | "MEDIUMTEXT" => DataType::Text,
            "LONGTEXT" => DataType::LongText,
            "DATE" => DataType::Date,
            "DATETIME" => DataType::DateTime,
            "TIMESTAMP" => DataType::Timestamp,
            "TIME" => DataType::Time,
            "YEAR" => DataType::Year,
            "DECIMAL" | "NUMERIC" | "DEC" => DataType::Decimal,
            "FLOAT" | "REAL" => DataType::Float,
            "DOUBLE" => DataType::Double,
            "BOOLEAN" | "BOOL" => DataType::Boolean,
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => {
                DataType::Blob
            }
            "JSON" => DataType::Json,
            "ENUM" => DataType::Enum,
            "SET" => DataType::Set,
            _ => return None,
        };
        Some(dt)
    }

    /// INT and BIGINT
    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Int | DataType::BigInt)
    }

    /// DECIMAL, FLOAT and DOUBLE
    pub fn is_fractional(&self) -> bool {
        matches!(self, DataType::Decimal | DataType::Float | DataType::Double)
    }

    /// Check if this type is numeric
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_fractional()
    }

    /// Date and time types
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DataType::Date | DataType::DateTime | DataType::Timestamp | DataType::Time
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Varchar => "VARCHAR",
            DataType::Text => "TEXT",
            DataType::LongText => "LONGTEXT",
            DataType::Date => "DATE",
            DataType::DateTime => "DATETIME",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Time => "TIME",
            DataType::Year => "YEAR",
            DataType::Decimal => "DECIMAL",
            DataType::Float => "FLOAT",
            DataType::Double => "DOUBLE",
            DataType::Boolean => "BOOLEAN",
            DataType::Blob => "BLOB",
            DataType::Json => "JSON",
            DataType::Enum => "ENUM",
            DataType::Set => "SET",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(DataType::from_name("integer"), Some(DataType::Int));
        assert_eq!(DataType::from_name("Bool"), Some(DataType::Boolean));
        assert_eq!(DataType::from_name("numeric"), Some(DataType::Decimal));
        assert_eq!(DataType::from_name("geometry"), None);
    }

    #[test]
    fn test_type_classes() {
        assert!(DataType::BigInt.is_numeric());
        assert!(DataType::Double.is_fractional());
        assert!(!DataType::Varchar.is_numeric());
        assert!(DataType::Timestamp.is_temporal());
    }
}
