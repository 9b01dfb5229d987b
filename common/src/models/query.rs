//! SQL query models.
//!
//! Contains the outcome of executing one generated statement.

use serde_json::Value;

/// Number of rows kept from a SELECT result for display.
pub const MAX_DISPLAY_ROWS: usize = 5;

/// Outcome of executing a single statement.
///
/// Lives for one prompt/response cycle only.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A read query: column names in result order and the (already limited) rows.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// A write query or a failed statement: a human-readable status line.
    Status(String),
}

impl QueryOutcome {
    /// Builds a read outcome, keeping only the last [`MAX_DISPLAY_ROWS`] rows.
    pub fn rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self::Rows {
            columns,
            rows: keep_last(rows, MAX_DISPLAY_ROWS),
        }
    }

    /// Status line reported after a committed write.
    pub fn affected(rows_affected: u64) -> Self {
        Self::Status(format!(
            "Query executed successfully. Rows affected: {}",
            rows_affected
        ))
    }

    /// Status line carrying the driver's error text.
    pub fn database_error(err: impl std::fmt::Display) -> Self {
        Self::Status(format!("Database error: {}", err))
    }

    pub fn row_count(&self) -> usize {
        match self {
            Self::Rows { rows, .. } => rows.len(),
            Self::Status(_) => 0,
        }
    }
}

/// Keeps the final `limit` items, preserving their relative order.
pub fn keep_last<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    if items.len() > limit {
        let excess = items.len() - limit;
        items.drain(..excess);
    }
    items
}

/// Generic textual form of a cell value.
///
/// Strings are shown without quotes and NULL as `NULL`; everything else
/// uses its JSON rendering.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
