//! User type repository for database operations

use std::str::FromStr;

use sqlx::{QueryBuilder, Sqlite, SqlitePool, sqlite::SqliteRow};

use super::nullable;
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::models::UserType;
use crate::query::{FindOptions, SortField, UnknownValue, push_eq};

const SOURCE: &str = "UserTypeRepository";

const COLUMNS: &str = "ut.id AS id, ut.name AS name, ut.disabled AS disabled, \
                       ut.created_at AS created_at, ut.updated_at AS updated_at";

/// Optional equality predicates for user type lookups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserTypeFindFilters {
    pub name: Option<String>,
}

impl UserTypeFindFilters {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserTypeSortField {
    Id,
    Name,
    Disabled,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for UserTypeSortField {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "disabled" => Ok(Self::Disabled),
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            _ => Err(UnknownValue(s.to_string())),
        }
    }
}

impl SortField for UserTypeSortField {
    const ALLOWED: &'static [&'static str] = &["id", "name", "disabled", "created_at", "updated_at"];
    const ID_COLUMN: &'static str = "ut.id";

    fn column(self) -> &'static str {
        match self {
            Self::Id => "ut.id",
            Self::Name => "ut.name",
            Self::Disabled => "ut.disabled",
            Self::CreatedAt => "ut.created_at",
            Self::UpdatedAt => "ut.updated_at",
        }
    }
}

/// User type repository for database operations
#[derive(Clone)]
pub struct UserTypeRepository {
    pool: SqlitePool,
}

impl UserTypeRepository {
    /// Create a new user type repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn select(
        filters: &UserTypeFindFilters,
        options: &FindOptions<UserTypeSortField>,
    ) -> QueryBuilder<'static, Sqlite> {
        let projection = if options.is_count() {
            "COUNT(ut.id)"
        } else {
            COLUMNS
        };

        let mut qb = QueryBuilder::new(format!(
            "SELECT {projection} FROM user_types ut WHERE 1 = 1"
        ));
        push_eq(&mut qb, "ut.name", filters.name.as_deref());
        options.push_tail(&mut qb);
        qb
    }

    /// Count the user types matching `filters`, ignoring sort and paging
    pub async fn count(
        &self,
        ctx: &RequestContext,
        filters: &UserTypeFindFilters,
        options: &FindOptions<UserTypeSortField>,
    ) -> AppResult<i64> {
        let mut qb = Self::select(filters, &options.counting());
        ctx.guard(SOURCE, qb.build_query_scalar::<i64>().fetch_one(&self.pool))
            .await
    }

    /// Find the user types matching `filters`
    pub async fn find(
        &self,
        ctx: &RequestContext,
        filters: &UserTypeFindFilters,
        options: &FindOptions<UserTypeSortField>,
    ) -> AppResult<Vec<UserType>> {
        let mut qb = Self::select(filters, options);
        let rows = ctx.guard(SOURCE, qb.build().fetch_all(&self.pool)).await?;

        rows.iter()
            .map(|row| map_user_type(row, ""))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::database(SOURCE, e))
    }

    /// Find a user type by its name
    ///
    /// An empty name never matches.
    pub async fn find_one_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> AppResult<Option<UserType>> {
        if name.is_empty() {
            return Ok(None);
        }

        let found = self
            .find(ctx, &UserTypeFindFilters::by_name(name), &FindOptions::first())
            .await?;
        Ok(found.into_iter().next())
    }

    /// Whether any user type other than `except` is named `name`
    pub async fn name_taken(
        &self,
        ctx: &RequestContext,
        name: &str,
        except: Option<i64>,
    ) -> AppResult<bool> {
        let mut qb = Self::select(
            &UserTypeFindFilters::by_name(name),
            &FindOptions::unbounded().counting(),
        );
        if let Some(id) = except {
            qb.push(" AND ut.id <> ").push_bind(id);
        }

        let taken = ctx
            .guard(SOURCE, qb.build_query_scalar::<i64>().fetch_one(&self.pool))
            .await?;
        Ok(taken > 0)
    }

    /// Insert `user_type` and write the assigned identity back onto it
    pub async fn create(&self, ctx: &RequestContext, user_type: &mut UserType) -> AppResult<()> {
        let result = ctx
            .guard(
                SOURCE,
                sqlx::query(
                    r#"
                    INSERT INTO user_types (name, disabled, created_at, updated_at)
                    VALUES (?, ?, ?, ?)
                    "#,
                )
                .bind(user_type.name.as_str())
                .bind(user_type.disabled)
                .bind(user_type.created_at)
                .bind(user_type.updated_at)
                .execute(&self.pool),
            )
            .await?;

        user_type.id = result.last_insert_rowid();
        Ok(())
    }

    /// Overwrite the mutable fields of `user_type` by identity
    pub async fn update(&self, ctx: &RequestContext, user_type: &UserType) -> AppResult<()> {
        ctx.guard(
            SOURCE,
            sqlx::query(
                r#"
                UPDATE user_types
                SET name = ?, disabled = ?, created_at = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(user_type.name.as_str())
            .bind(user_type.disabled)
            .bind(user_type.created_at)
            .bind(user_type.updated_at)
            .bind(user_type.id)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    /// Delete `user_type` by identity; a missing row is not an error
    pub async fn delete(&self, ctx: &RequestContext, user_type: &UserType) -> AppResult<()> {
        ctx.guard(
            SOURCE,
            sqlx::query("DELETE FROM user_types WHERE id = ?")
                .bind(user_type.id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }
}

/// Map a row onto a [`UserType`], reading columns named `<prefix><column>`
pub(crate) fn map_user_type(row: &SqliteRow, prefix: &str) -> Result<UserType, sqlx::Error> {
    Ok(UserType {
        id: nullable(row, &format!("{prefix}id"))?,
        name: nullable(row, &format!("{prefix}name"))?,
        disabled: nullable(row, &format!("{prefix}disabled"))?,
        created_at: nullable(row, &format!("{prefix}created_at"))?,
        updated_at: nullable(row, &format!("{prefix}updated_at"))?,
    })
}
