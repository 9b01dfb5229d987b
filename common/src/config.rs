//! Configuration loaded from the process environment.
//!
//! Settings are read once at startup and passed by reference afterwards.
//! An optional `.env` file in the working directory is loaded first;
//! variables already set in the environment take precedence.

use std::fmt;

use validator::Validate;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_TABLE_SCHEMA: &str = "telegram";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_LLM_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Name of the table every generated statement targets, without schema.
pub const ARTICLES_TABLE: &str = "articles";

/// MySQL session settings.
#[derive(Clone, Validate)]
pub struct DatabaseConfig {
    #[validate(length(min = 1, message = "DB_HOST must not be empty"))]
    pub host: String,
    pub port: u16,
    #[validate(length(min = 1, message = "DB_USER must not be empty"))]
    pub user: String,
    pub password: String,
    #[validate(length(min = 1, message = "DB_NAME must not be empty"))]
    pub name: String,
    /// Schema qualifying the `articles` table.
    #[validate(length(min = 1, message = "DB_TABLE_SCHEMA must not be empty"))]
    pub table_schema: String,
}

impl DatabaseConfig {
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("DB_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("DB_PORT is not a valid port: {raw}")))?,
            None => DEFAULT_DB_PORT,
        };

        let config = Self {
            host: required(&lookup, "DB_HOST")?,
            port,
            user: required(&lookup, "DB_USER")?,
            password: required(&lookup, "DB_PASSWORD")?,
            name: required(&lookup, "DB_NAME")?,
            table_schema: lookup("DB_TABLE_SCHEMA")
                .unwrap_or_else(|| DEFAULT_TABLE_SCHEMA.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Fully qualified `<schema>.articles`.
    pub fn table_name(&self) -> String {
        format!("{}.{}", self.table_schema, ARTICLES_TABLE)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("table_schema", &self.table_schema)
            .finish()
    }
}

/// Chat-completion endpoint settings.
#[derive(Clone, Validate)]
pub struct LlmConfig {
    #[validate(length(min = 1, message = "DEEPSEEK_API_KEY must not be empty"))]
    pub api_key: String,
    #[validate(url(message = "DEEPSEEK_BASE_URL must be a URL"))]
    pub base_url: String,
    #[validate(length(min = 1, message = "DEEPSEEK_MODEL must not be empty"))]
    pub model: String,
    pub temperature: f32,
}

impl LlmConfig {
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            api_key: required(&lookup, "DEEPSEEK_API_KEY")?,
            base_url: lookup("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: lookup("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            temperature: DEFAULT_TEMPERATURE,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Complete console configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> AppResult<Self> {
        load_dotenv();
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database: DatabaseConfig::from_lookup(&lookup)?,
            llm: LlmConfig::from_lookup(&lookup)?,
        })
    }
}

/// Reads a variable from the process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Loads `.env` from the working directory (best-effort, no error if missing).
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, ".env could not be loaded"),
    }
}

fn required<F>(lookup: &F, key: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| AppError::Config(format!("{key} is not set")))
}
