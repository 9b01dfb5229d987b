//! Natural-language to SQL generation.

use async_trait::async_trait;

use common::errors::AppResult;
use common::models::chat::ChatMessage;
use common::utils::SqlValidator;

use crate::chat_client::ChatClient;

/// Columns of the `articles` table, in table order, with their SQL types.
pub const ARTICLE_COLUMNS: [(&str, &str); 13] = [
    ("id", "int"),
    ("title", "varchar"),
    ("description", "text"),
    ("url", "text"),
    ("created_at", "timestamp"),
    ("category", "varchar"),
    ("embedding", "text"),
    ("user_id", "bigint"),
    ("summary", "text"),
    ("notion_page_id", "varchar"),
    ("modified_at", "timestamp"),
    ("source", "varchar"),
    ("image_url", "text"),
];

/// Turns a natural-language request into one SQL statement.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate_sql(&self, text: &str) -> AppResult<String>;
}

/// Generator backed by a chat-completion model.
pub struct ChatSqlGenerator {
    client: ChatClient,
    system_prompt: String,
}

impl ChatSqlGenerator {
    pub fn new(client: ChatClient, table_name: &str) -> Self {
        Self {
            client,
            system_prompt: build_system_prompt(table_name),
        }
    }
}

#[async_trait]
impl SqlGenerator for ChatSqlGenerator {
    async fn generate_sql(&self, text: &str) -> AppResult<String> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(text),
        ];
        let raw = self.client.complete(messages).await?;
        let sql = SqlValidator::sanitize_generated_sql(&raw);
        tracing::debug!(raw = %raw, sql = %sql, "model reply sanitized");
        Ok(sql)
    }
}

/// System message describing the single queryable table and the reply format.
pub fn build_system_prompt(table_name: &str) -> String {
    let columns = ARTICLE_COLUMNS
        .iter()
        .map(|(name, ty)| format!("{} ({})", name, ty))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a SQL expert. Generate a valid MySQL query for the {table} table \
         based on the user's natural language request. Only return the SQL query, nothing else. \
         The table structure is: {columns}. \
         Make sure to only query the {table} table and not any other tables. \
         Do not include any markdown formatting like ```sql or ```. \
         Only use columns that actually exist in the table. \
         Do not include any placeholder text, comments, or explanations. \
         Return only a single valid SQL statement that can be executed directly. \
         Example: For 'give me some descriptions of my articles of deepseek', return: \
         SELECT description FROM {table} WHERE title LIKE '%deepseek%' \
         OR description LIKE '%deepseek%' OR category LIKE '%deepseek%';",
        table = table_name,
        columns = columns,
    )
}
