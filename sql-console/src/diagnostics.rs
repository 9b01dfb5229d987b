//! Connectivity checks run as subcommands.
//!
//! Each check returns the report text instead of printing it.

use common::config::{DatabaseConfig, LlmConfig};
use common::errors::AppResult;
use common::models::chat::ChatMessage;

use crate::chat_client::ChatClient;
use crate::executor::MySqlExecutor;
use crate::formatter;

/// Opens and closes one database session.
pub async fn check_db(config: &DatabaseConfig) -> String {
    let mut report = format!(
        "Database connection test\nHost: {}\nUser: {}\nDatabase: {}\n",
        config.host, config.user, config.name
    );

    match MySqlExecutor::connect(config).await {
        Ok(executor) => {
            if let Err(e) = executor.close().await {
                tracing::warn!(error = %e, "closing test session failed");
            }
            report.push_str("Connection successful!\n");
        }
        Err(e) => report.push_str(&format!("Connection failed: {}\n", e)),
    }
    report
}

/// Sends a one-message conversation to the chat-completion endpoint.
///
/// Key presence is reported on its own so that a set key with otherwise
/// invalid settings is not shown as missing.
pub async fn check_api(
    api_key_present: bool,
    config: AppResult<LlmConfig>,
    http_client: reqwest::Client,
) -> String {
    let mut report = format!(
        "Testing DeepSeek API connection\nAPI Key exists: {}\n",
        api_key_present
    );

    if !api_key_present {
        report.push_str("No API key found in environment variables\n");
        return report;
    }
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            report.push_str(&format!("API configuration invalid: {}\n", e));
            return report;
        }
    };

    let client = ChatClient::new(http_client, config);
    match client.complete(vec![ChatMessage::user("Say hello world")]).await {
        Ok(reply) => report.push_str(&format!("API connection successful!\nResponse: {}\n", reply)),
        Err(e) => report.push_str(&format!("API connection failed: {}\n", e)),
    }
    report
}

/// Lists the columns of the articles table.
pub async fn describe_table(config: &DatabaseConfig) -> AppResult<String> {
    let table = config.table_name();
    let mut executor = MySqlExecutor::connect(config).await?;
    let fetched = executor.fetch_all(&format!("SHOW COLUMNS FROM {}", table)).await;
    executor.close().await?;

    let (columns, rows) = fetched?;
    Ok(format!(
        "Table structure for {}:\n{}\n",
        table,
        formatter::render_table(&columns, &rows)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{llm_config, MockCompletions};
    use common::errors::AppError;
    use axum::http::StatusCode;

    fn unreachable_db() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".into(),
            port: 1,
            user: "reader".into(),
            password: "secret".into(),
            name: "telegram".into(),
            table_schema: "telegram".into(),
        }
    }

    #[tokio::test]
    async fn test_check_db_reports_failure() {
        let report = check_db(&unreachable_db()).await;
        assert!(report.starts_with("Database connection test\nHost: 127.0.0.1\nUser: reader\nDatabase: telegram\n"));
        assert!(report.contains("Connection failed: "));
        assert!(!report.contains("secret"));
    }

    #[tokio::test]
    async fn test_describe_table_fails_without_database() {
        assert!(describe_table(&unreachable_db()).await.is_err());
    }

    #[tokio::test]
    async fn test_check_api_without_key() {
        let report = check_api(
            false,
            Err(AppError::Config("DEEPSEEK_API_KEY is not set".into())),
            reqwest::Client::new(),
        )
        .await;
        assert_eq!(
            report,
            "Testing DeepSeek API connection\nAPI Key exists: false\nNo API key found in environment variables\n"
        );
    }

    #[tokio::test]
    async fn test_check_api_success() {
        let mock = MockCompletions::spawn(StatusCode::OK, "Hello, world!").await;
        let config = llm_config(&mock.base_url);

        let report = check_api(true, Ok(config), reqwest::Client::new()).await;
        assert!(report.ends_with("API connection successful!\nResponse: Hello, world!\n"));

        let seen = mock.requests();
        assert_eq!(seen[0].body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(seen[0].body["messages"][0]["content"], "Say hello world");
    }

    #[tokio::test]
    async fn test_check_api_failure() {
        let mock = MockCompletions::spawn(StatusCode::UNAUTHORIZED, "").await;
        let config = llm_config(&mock.base_url);

        let report = check_api(true, Ok(config), reqwest::Client::new()).await;
        assert!(report.contains("API connection failed: "));
    }

    #[tokio::test]
    async fn test_check_api_present_key_with_bad_base_url() {
        let lookup = |key: &str| match key {
            "DEEPSEEK_API_KEY" => Some("sk-test".to_string()),
            "DEEPSEEK_BASE_URL" => Some("not a url".to_string()),
            _ => None,
        };
        let report = check_api(true, LlmConfig::from_lookup(lookup), reqwest::Client::new()).await;

        assert!(report.starts_with("Testing DeepSeek API connection\nAPI Key exists: true\n"));
        assert!(report.contains("API configuration invalid: "));
        assert!(!report.contains("No API key found"));
        assert!(!report.contains("sk-test"));
    }
}
