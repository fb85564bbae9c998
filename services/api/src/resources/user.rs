//! User resources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::User;
use crate::query::{FindOptions, SortField};
use crate::repositories::{UserFindFilters, UserSortField};
use crate::validation::{Resource, validate_one_of, validate_required, validate_sort_dir};

fn validate_sort_by(value: &str) -> Result<(), ValidationError> {
    validate_one_of(value, UserSortField::ALLOWED)
}

/// Query parameters of a user listing
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserFindResource {
    #[validate(length(max = 50))]
    pub username: Option<String>,
    /// Only users of the user type with this name
    #[validate(length(max = 50))]
    pub user_type: Option<String>,
    #[validate(custom(function = "validate_sort_by"))]
    pub sort_by: Option<String>,
    #[validate(custom(function = "validate_sort_dir"))]
    pub sort_dir: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl Resource for UserFindResource {
    const NAME: &'static str = "UserFindResource";
    const FIELDS: &'static [&'static str] = &[
        "username",
        "user_type",
        "sort_by",
        "sort_dir",
        "offset",
        "limit",
    ];
}

impl UserFindResource {
    pub fn filters(&self) -> UserFindFilters {
        UserFindFilters {
            username: self.username.clone(),
            user_type: self.user_type.clone(),
        }
    }

    /// Options for an already validated listing
    pub fn options(&self, default_limit: u32) -> FindOptions<UserSortField> {
        FindOptions::from_request(
            self.sort_by.as_deref().and_then(|s| s.parse().ok()),
            self.sort_dir.as_deref().and_then(|s| s.parse().ok()),
            self.offset,
            self.limit,
            default_limit,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserCreateResource {
    #[serde(default)]
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub username: String,
    /// Name of an existing user type
    #[serde(default, alias = "userType")]
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub user_type: String,
    #[serde(default)]
    pub disabled: bool,
}

impl Resource for UserCreateResource {
    const NAME: &'static str = "UserCreateResource";
    const FIELDS: &'static [&'static str] = &["username", "user_type", "disabled"];
}

/// New values for the user addressed by the request path
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserUpdateResource {
    #[serde(default)]
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub username: String,
    #[serde(default, alias = "userType")]
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub user_type: String,
    #[serde(default)]
    pub disabled: bool,
}

impl Resource for UserUpdateResource {
    const NAME: &'static str = "UserUpdateResource";
    const FIELDS: &'static [&'static str] = &["username", "user_type", "disabled"];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserDeleteResource {
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub username: String,
}

impl Resource for UserDeleteResource {
    const NAME: &'static str = "UserDeleteResource";
    const FIELDS: &'static [&'static str] = &["username"];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserFindOneResource {
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub username: String,
}

impl Resource for UserFindOneResource {
    const NAME: &'static str = "UserFindOneResource";
    const FIELDS: &'static [&'static str] = &["username"];
}

/// User as returned to clients, with its user type by name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResource {
    pub username: String,
    pub user_type: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResource {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            user_type: user.user_type.name.clone(),
            disabled: user.disabled,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
