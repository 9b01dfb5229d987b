//! Unique ID generator.
//!
//! Tags each prompt cycle so its log lines can be correlated.

use uuid::Uuid;

/// Generates unique identifiers.
pub struct IdGenerator;

impl IdGenerator {
    /// Generates a short unique ID (first 8 characters of UUID).
    ///
    /// # Returns
    /// An 8-character unique string.
    pub fn short_id() -> String {
        Uuid::new_v4().to_string()[..8].to_string()
    }
}
