//! User repository for database operations

use std::str::FromStr;

use sqlx::{QueryBuilder, Sqlite, SqlitePool, sqlite::SqliteRow};

use super::nullable;
use super::user_type::map_user_type;
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::query::{FindOptions, SortField, UnknownValue, push_eq};

const SOURCE: &str = "UserRepository";

const COLUMNS: &str = "u.id AS id, u.username AS username, u.disabled AS disabled, \
                       u.created_at AS created_at, u.updated_at AS updated_at, \
                       ut.id AS user_type_id, ut.name AS user_type_name, \
                       ut.disabled AS user_type_disabled, \
                       ut.created_at AS user_type_created_at, \
                       ut.updated_at AS user_type_updated_at";

/// Optional equality predicates for user lookups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFindFilters {
    pub username: Option<String>,
    /// Name of the owning user type
    pub user_type: Option<String>,
}

impl UserFindFilters {
    pub fn by_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Id,
    Username,
    UserType,
    Disabled,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for UserSortField {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "username" => Ok(Self::Username),
            "user_type" => Ok(Self::UserType),
            "disabled" => Ok(Self::Disabled),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

impl SortField for UserSortField {
    const ALLOWED: &'static [&'static str] = &[
        "id",
        "username",
        "user_type",
        "disabled",
        "created_at",
        "updated_at",
    ];
    const ID_COLUMN: &'static str = "u.id";

    fn column(self) -> &'static str {
        match self {
            Self::Id => "u.id",
            Self::Username => "u.username",
            Self::UserType => "ut.name",
            Self::Disabled => "u.disabled",
            Self::CreatedAt => "u.created_at",
            Self::UpdatedAt => "u.updated_at",
        }
    }
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn select(
        filters: &UserFindFilters,
        options: &FindOptions<UserSortField>,
    ) -> QueryBuilder<'static, Sqlite> {
        let projection = if options.is_count() {
            "COUNT(u.id)"
        } else {
            COLUMNS
        };

        let mut qb = QueryBuilder::new(format!(
            "SELECT {projection} FROM users u \
             LEFT JOIN user_types ut ON ut.id = u.user_type_id WHERE 1 = 1"
        ));
        push_eq(&mut qb, "u.username", filters.username.as_deref());
        push_eq(&mut qb, "ut.name", filters.user_type.as_deref());
        options.push_tail(&mut qb);
        qb
    }

    /// Count the users matching `filters`, ignoring sort and paging
    pub async fn count(
        &self,
        ctx: &RequestContext,
        filters: &UserFindFilters,
        options: &FindOptions<UserSortField>,
    ) -> AppResult<i64> {
        let mut qb = Self::select(filters, &options.counting());
        ctx.guard(SOURCE, qb.build_query_scalar::<i64>().fetch_one(&self.pool))
            .await
    }

    /// Find the users matching `filters`, each with its user type
    pub async fn find(
        &self,
        ctx: &RequestContext,
        filters: &UserFindFilters,
        options: &FindOptions<UserSortField>,
    ) -> AppResult<Vec<User>> {
        let mut qb = Self::select(filters, options);
        let rows = ctx.guard(SOURCE, qb.build().fetch_all(&self.pool)).await?;

        rows.iter()
            .map(map_user)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::database(SOURCE, e))
    }

    /// Find a user by username
    ///
    /// An empty username never matches.
    pub async fn find_one_by_username(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> AppResult<Option<User>> {
        if username.is_empty() {
            return Ok(None);
        }

        let found = self
            .find(ctx, &UserFindFilters::by_username(username), &FindOptions::first())
            .await?;
        Ok(found.into_iter().next())
    }

    /// Whether any user other than `except` is named `username`
    pub async fn username_taken(
        &self,
        ctx: &RequestContext,
        username: &str,
        except: Option<i64>,
    ) -> AppResult<bool> {
        let mut qb = Self::select(
            &UserFindFilters::by_username(username),
            &FindOptions::unbounded().counting(),
        );
        if let Some(id) = except {
            qb.push(" AND u.id <> ").push_bind(id);
        }

        let taken = ctx
            .guard(SOURCE, qb.build_query_scalar::<i64>().fetch_one(&self.pool))
            .await?;
        Ok(taken > 0)
    }

    /// Insert `user` and write the assigned identity back onto it
    pub async fn create(&self, ctx: &RequestContext, user: &mut User) -> AppResult<()> {
        let result = ctx
            .guard(
                SOURCE,
                sqlx::query(
                    r#"
                    INSERT INTO users (username, user_type_id, disabled, created_at, updated_at)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(user.username.as_str())
                .bind(user.user_type.id)
                .bind(user.disabled)
                .bind(user.created_at)
                .bind(user.updated_at)
                .execute(&self.pool),
            )
            .await?;

        user.id = result.last_insert_rowid();
        Ok(())
    }

    /// Overwrite the mutable fields of `user` by identity
    pub async fn update(&self, ctx: &RequestContext, user: &User) -> AppResult<()> {
        ctx.guard(
            SOURCE,
            sqlx::query(
                r#"
                UPDATE users
                SET username = ?, user_type_id = ?, disabled = ?, created_at = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(user.username.as_str())
            .bind(user.user_type.id)
            .bind(user.disabled)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(user.id)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// Delete `user` by identity; a missing row is not an error
    pub async fn delete(&self, ctx: &RequestContext, user: &User) -> AppResult<()> {
        ctx.guard(
            SOURCE,
            sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(user.id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}

fn map_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: nullable(row, "id")?,
        username: nullable(row, "username")?,
        user_type: map_user_type(row, "user_type_")?,
        disabled: nullable(row, "disabled")?,
        created_at: nullable(row, "created_at")?,
        updated_at: nullable(row, "updated_at")?,
    })
}
