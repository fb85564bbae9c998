//! User type entity

use chrono::{DateTime, Utc};

/// A category of users, identified by its unique name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserType {
    /// Store-assigned identity; zero until persisted
    pub id: i64,
    pub name: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
