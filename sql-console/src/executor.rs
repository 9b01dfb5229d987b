//! Execution of generated statements against MySQL.
//!
//! Holds exactly one session for the lifetime of the console. Statements are
//! run as returned by the model; destructive ones are only logged.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::{MySqlConnectOptions, MySqlRow};
use sqlx::{
    Column, ConnectOptions, Connection, Executor, MySqlConnection, Row, Statement, TypeInfo,
    ValueRef,
};

use common::config::DatabaseConfig;
use common::errors::{AppError, AppResult};
use common::models::query::QueryOutcome;
use common::utils::SqlValidator;

/// Runs one statement and reports its outcome.
///
/// Database failures are folded into [`QueryOutcome::Status`], never returned
/// as errors, so the session survives a bad statement.
#[async_trait]
pub trait QueryRunner: Send {
    async fn execute(&mut self, sql: &str) -> QueryOutcome;
}

/// Single MySQL session.
pub struct MySqlExecutor {
    conn: MySqlConnection,
}

impl MySqlExecutor {
    /// Opens the session.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let conn = options
            .connect()
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;

        tracing::info!(host = %config.host, port = config.port, database = %config.name, "database session opened");
        Ok(Self { conn })
    }

    /// Closes the session.
    pub async fn close(self) -> AppResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;
        tracing::info!("database session closed");
        Ok(())
    }

    /// Runs a row-returning statement and returns every row.
    ///
    /// Column names come from the prepared statement, so an empty result
    /// still carries its headers.
    pub async fn fetch_all(&mut self, sql: &str) -> AppResult<(Vec<String>, Vec<Vec<Value>>)> {
        let statement = (&mut self.conn)
            .prepare(sql)
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        let columns = statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect();

        let rows = statement
            .query()
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        Ok((columns, rows.iter().map(row_values).collect()))
    }

    /// Runs a write statement in a transaction and commits it.
    async fn execute_write(&mut self, sql: &str) -> AppResult<u64> {
        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        let result = tx
            .execute(sqlx::raw_sql(sql))
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl QueryRunner for MySqlExecutor {
    async fn execute(&mut self, sql: &str) -> QueryOutcome {
        if let Some(keyword) = SqlValidator::destructive_keyword(sql) {
            tracing::warn!(keyword, "executing destructive statement from the model");
        }

        let start = Instant::now();
        let outcome = if SqlValidator::is_select(sql) {
            self.fetch_all(sql)
                .await
                .map(|(columns, rows)| QueryOutcome::rows(columns, rows))
        } else {
            self.execute_write(sql).await.map(QueryOutcome::affected)
        };
        let execution_time_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(outcome) => {
                tracing::info!(rows = outcome.row_count(), execution_time_ms, "statement executed");
                outcome
            }
            Err(AppError::DatabaseQuery(message)) => {
                tracing::warn!(error = %message, execution_time_ms, "statement failed");
                QueryOutcome::database_error(message)
            }
            Err(other) => QueryOutcome::database_error(other),
        }
    }
}

fn row_values(row: &MySqlRow) -> Vec<Value> {
    (0..row.len()).map(|index| cell_value(row, index)).collect()
}

/// Decodes one cell by its MySQL type.
///
/// Text-encoded types without a dedicated decoder fall back to their textual
/// form. Binary-encoded ones that fail to decode show as `<TYPE>`.
fn cell_value(row: &MySqlRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(e) => return Value::String(format!("<{}>", e)),
    };

    let decoded = match type_name.as_str() {
        // TINYINT(1): keep the stored integer
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(index).ok().map(Value::from)
        }
        name if name == "YEAR" || name.ends_with(" UNSIGNED") => row
            .try_get::<u64, _>(index)
            .or_else(|_| row.try_get_unchecked::<u64, _>(index))
            .ok()
            .map(Value::from),
        "FLOAT" => row
            .try_get::<f32, _>(index)
            .ok()
            .map(|v| Value::String(v.to_string())),
        "DOUBLE" => row.try_get::<f64, _>(index).ok().map(Value::from),
        "DATETIME" | "TIMESTAMP" => row
            .try_get::<NaiveDateTime, _>(index)
            .ok()
            .map(|v| Value::String(v.to_string())),
        "DATE" => row
            .try_get::<NaiveDate, _>(index)
            .ok()
            .map(|v| Value::String(v.to_string())),
        // MySqlTime covers negative and multi-day intervals
        "TIME" => row
            .try_get::<MySqlTime, _>(index)
            .ok()
            .map(|v| Value::String(v.to_string())),
        "JSON" => row.try_get::<Value, _>(index).ok(),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT" => row
            .try_get::<Vec<u8>, _>(index)
            .ok()
            .map(|bytes| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
        _ => None,
    };

    decoded
        .or_else(|| {
            if is_binary_encoded(&type_name) {
                return None;
            }
            row.try_get_unchecked::<String, _>(index).ok().map(Value::String)
        })
        .unwrap_or_else(|| Value::String(format!("<{}>", type_name)))
}

/// Types whose prepared-statement encoding is not text.
fn is_binary_encoded(type_name: &str) -> bool {
    let base = type_name.strip_suffix(" UNSIGNED").unwrap_or(type_name);
    matches!(
        base,
        "BOOLEAN"
            | "TINYINT"
            | "SMALLINT"
            | "MEDIUMINT"
            | "INT"
            | "BIGINT"
            | "YEAR"
            | "FLOAT"
            | "DOUBLE"
            | "DATE"
            | "TIME"
            | "DATETIME"
            | "TIMESTAMP"
            | "BIT"
            | "GEOMETRY"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // Needs a reachable MySQL with the articles table; run with
    // `DB_HOST=... cargo test -- --ignored`.
    fn live_config() -> Option<DatabaseConfig> {
        common::config::load_dotenv();
        DatabaseConfig::from_lookup(common::config::env_lookup).ok()
    }

    #[test]
    fn test_text_fallback_only_for_text_encoded_types() {
        for name in ["TIME", "YEAR", "DATETIME", "DATE", "BIGINT UNSIGNED", "BOOLEAN", "DOUBLE"] {
            assert!(is_binary_encoded(name), "{}", name);
        }
        for name in ["VARCHAR", "TEXT", "DECIMAL", "ENUM", "SET", "CHAR"] {
            assert!(!is_binary_encoded(name), "{}", name);
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_select_returns_at_most_five_rows() {
        let Some(config) = live_config() else { return };
        let mut executor = MySqlExecutor::connect(&config).await.unwrap();

        let sql = format!("SELECT id, title, url FROM {}", config.table_name());
        match executor.execute(&sql).await {
            QueryOutcome::Rows { columns, rows } => {
                assert_eq!(columns, vec!["id", "title", "url"]);
                assert!(rows.len() <= 5);
            }
            QueryOutcome::Status(message) => panic!("unexpected status: {}", message),
        }
        executor.close().await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_database_error_keeps_session_usable() {
        let Some(config) = live_config() else { return };
        let mut executor = MySqlExecutor::connect(&config).await.unwrap();

        let outcome = executor.execute("SELECT * FROM no_such_table_here").await;
        assert!(matches!(outcome, QueryOutcome::Status(ref m) if m.starts_with("Database error: ")));

        let outcome = executor.execute("SELECT 1 AS one").await;
        assert_eq!(
            outcome,
            QueryOutcome::Rows {
                columns: vec!["one".to_string()],
                rows: vec![vec![Value::from(1)]],
            }
        );
        executor.close().await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_time_interval_and_year_cells() {
        let Some(config) = live_config() else { return };
        let mut executor = MySqlExecutor::connect(&config).await.unwrap();

        let outcome = executor
            .execute(
                "SELECT CAST('30:00:00' AS TIME) AS t, CAST('-01:02:03' AS TIME) AS n, \
                 CAST(2024 AS YEAR) AS y",
            )
            .await;
        match outcome {
            QueryOutcome::Rows { rows, .. } => {
                assert_eq!(rows[0][0], Value::from("30:00:00"));
                assert_eq!(rows[0][1], Value::from("-01:02:03"));
                assert_eq!(rows[0][2], Value::from(2024));
            }
            QueryOutcome::Status(message) => panic!("unexpected status: {}", message),
        }
        executor.close().await.unwrap();
    }

    #[tokio::test]
    #[ignore]
    async fn test_tinyint_one_keeps_stored_integer() {
        let Some(config) = live_config() else { return };
        let mut executor = MySqlExecutor::connect(&config).await.unwrap();

        executor
            .execute("CREATE TEMPORARY TABLE flag_cells (flag TINYINT(1))")
            .await;
        executor
            .execute("INSERT INTO flag_cells VALUES (2), (0)")
            .await;
        let outcome = executor.execute("SELECT flag FROM flag_cells").await;
        assert_eq!(
            outcome,
            QueryOutcome::Rows {
                columns: vec!["flag".to_string()],
                rows: vec![vec![Value::from(2)], vec![Value::from(0)]],
            }
        );
        executor.close().await.unwrap();
    }
}
