//! User entity

use chrono::{DateTime, Utc};

use super::UserType;

/// A user account, identified by its unique username
#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    /// Store-assigned identity; zero until persisted
    pub id: i64,
    pub username: String,
    /// Owning user type; default when the reference is dangling
    pub user_type: UserType,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
