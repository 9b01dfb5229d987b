//! Application state for the console.

use common::config::AppConfig;

use crate::chat_client::ChatClient;
use crate::generator::ChatSqlGenerator;

/// Configuration and clients shared by one console run.
pub struct AppState {
    pub config: AppConfig,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Generator for the configured model and table.
    pub fn sql_generator(&self) -> ChatSqlGenerator {
        let client = ChatClient::new(self.http_client.clone(), self.config.llm.clone());
        ChatSqlGenerator::new(client, &self.config.database.table_name())
    }
}
