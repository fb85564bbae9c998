//! Repositories for database operations
//!
//! Repositories are the only place SQL text exists. Every query runs through
//! [`RequestContext::guard`](crate::context::RequestContext::guard), and every
//! failure comes back as a database [`AppError`](crate::error::AppError)
//! without being logged here.

use sqlx::{Decode, Row, Sqlite, Type, sqlite::SqliteRow};

pub mod user;
pub mod user_type;

pub use user::{UserFindFilters, UserRepository, UserSortField};
pub use user_type::{UserTypeFindFilters, UserTypeRepository, UserTypeSortField};

/// Read a column that may be NULL, falling back to the type's default
pub(crate) fn nullable<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: Default + Decode<'r, Sqlite> + Type<Sqlite>,
{
    Ok(row.try_get::<Option<T>, _>(column)?.unwrap_or_default())
}
