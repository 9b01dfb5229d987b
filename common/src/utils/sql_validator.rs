//! SQL statement helpers.
//!
//! Classification and clean-up of statements produced by the language model.

/// Helpers for generated SQL text.
pub struct SqlValidator;

/// Keywords that mark a statement as destructive. Only used for warnings.
const DESTRUCTIVE_KEYWORDS: [&str; 4] = ["DROP ", "TRUNCATE ", "DELETE FROM", "ALTER "];

/// Lines containing any of these markers are dropped from a model reply.
const DISCARDED_LINE_MARKERS: [&str; 2] = ["--", "YOUR_"];

impl SqlValidator {
    /// Checks if the SQL is a SELECT query.
    pub fn is_select(sql: &str) -> bool {
        sql.trim().to_uppercase().starts_with("SELECT")
    }

    /// Returns the first destructive keyword found in the statement, if any.
    ///
    /// Statements are executed regardless; callers use this to log a warning.
    pub fn destructive_keyword(sql: &str) -> Option<&'static str> {
        let sql_upper = sql.to_uppercase();
        DESTRUCTIVE_KEYWORDS
            .into_iter()
            .find(|keyword| sql_upper.contains(keyword))
            .map(str::trim)
    }

    /// Recovers a bare SQL statement from a model reply.
    ///
    /// Strips one leading ```` ```sql ```` and/or ```` ``` ```` fence and one
    /// trailing ```` ``` ````, drops every line containing `--` or `YOUR_`,
    /// and trims the result. Nothing else is checked.
    pub fn sanitize_generated_sql(raw: &str) -> String {
        let mut sql = raw.trim();
        if let Some(rest) = sql.strip_prefix("```sql") {
            sql = rest;
        }
        if let Some(rest) = sql.strip_prefix("```") {
            sql = rest;
        }
        if let Some(rest) = sql.strip_suffix("```") {
            sql = rest;
        }

        sql.split('\n')
            .filter(|line| !DISCARDED_LINE_MARKERS.iter().any(|m| line.contains(m)))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }
}
