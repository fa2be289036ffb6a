//! The uniform outcome of one `Engine::execute` call

use serde::Serialize;

use crate::error::Error;
use crate::executor::{QueryResult, ResultRow};

/// `queryType` of statements the classifier did not recognize
pub const UNKNOWN_QUERY_TYPE: &str = "UNKNOWN";

/// Outcome of one statement. Failures are values, never panics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    /// Human-readable summary
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable code of the error, e.g. `TABLE_NOT_FOUND`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Milliseconds
    pub execution_time: f64,
    /// Rough size of the result set in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_set: Option<Vec<ResultRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    pub query_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl ExecutionResult {
    /// Shape a successful executor result.
    pub fn from_query(
        query_type: &str,
        database: &str,
        result: QueryResult,
        execution_time: f64,
    ) -> Self {
        let has_result_set = !result.columns.is_empty();
        let row_count = result.rows.len();
        let memory = result
            .rows
            .iter()
            .flat_map(|row| row.iter())
            .map(|(name, value)| name.len() + value.size_hint())
            .sum();

        let output = match &result.message {
            Some(message) => message.clone(),
            None if has_result_set => format!("{} row(s) returned", row_count),
            None => format!("{} row(s) affected", result.affected_rows),
        };

        Self {
            success: true,
            output,
            error: None,
            error_code: None,
            execution_time,
            memory: has_result_set.then_some(memory),
            affected_rows: (!has_result_set).then_some(result.affected_rows),
            row_count: has_result_set.then_some(row_count),
            columns: has_result_set.then_some(result.columns),
            result_set: has_result_set.then_some(result.rows),
            query_type: query_type.to_string(),
            database: Some(result.database.unwrap_or_else(|| database.to_string())),
        }
    }

    /// Shape a failure.
    pub fn from_error(query_type: &str, error: &Error, execution_time: f64) -> Self {
        let message = error.to_string();
        Self {
            success: false,
            output: format!("Error: {}", message),
            error: Some(message),
            error_code: Some(error.code().to_string()),
            execution_time,
            memory: None,
            result_set: None,
            affected_rows: None,
            columns: None,
            query_type: query_type.to_string(),
            row_count: None,
            database: None,
        }
    }

    /// Result rows, empty for statements without a result set
    pub fn rows(&self) -> &[ResultRow] {
        self.result_set.as_deref().unwrap_or_default()
    }
}
