//! User type resources

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::UserType;
use crate::query::{FindOptions, SortField};
use crate::repositories::{UserTypeFindFilters, UserTypeSortField};
use crate::validation::{Resource, validate_one_of, validate_required, validate_sort_dir};

fn validate_sort_by(value: &str) -> Result<(), ValidationError> {
    validate_one_of(value, UserTypeSortField::ALLOWED)
}

/// Query parameters of a user type listing
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserTypeFindResource {
    #[validate(length(max = 50))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_sort_by"))]
    pub sort_by: Option<String>,
    #[validate(custom(function = "validate_sort_dir"))]
    pub sort_dir: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl Resource for UserTypeFindResource {
    const NAME: &'static str = "UserTypeFindResource";
    const FIELDS: &'static [&'static str] = &["name", "sort_by", "sort_dir", "offset", "limit"];
}

impl UserTypeFindResource {
    pub fn filters(&self) -> UserTypeFindFilters {
        UserTypeFindFilters {
            name: self.name.clone(),
        }
    }

    /// Options for an already validated listing
    pub fn options(&self, default_limit: u32) -> FindOptions<UserTypeSortField> {
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
pub struct UserTypeCreateResource {
    #[serde(default)]
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
}

impl Resource for UserTypeCreateResource {
    const NAME: &'static str = "UserTypeCreateResource";
    const FIELDS: &'static [&'static str] = &["name", "disabled"];
}

/// New values for the user type addressed by the request path
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserTypeUpdateResource {
    #[serde(default)]
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub name: String,
    #[serde(default)]
    pub disabled: bool,
}

impl Resource for UserTypeUpdateResource {
    const NAME: &'static str = "UserTypeUpdateResource";
    const FIELDS: &'static [&'static str] = &["name", "disabled"];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserTypeDeleteResource {
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub name: String,
}

impl Resource for UserTypeDeleteResource {
    const NAME: &'static str = "UserTypeDeleteResource";
    const FIELDS: &'static [&'static str] = &["name"];
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserTypeFindOneResource {
    #[validate(custom(function = "validate_required"), length(max = 50))]
    pub name: String,
}

impl Resource for UserTypeFindOneResource {
    const NAME: &'static str = "UserTypeFindOneResource";
    const FIELDS: &'static [&'static str] = &["name"];
}

/// User type as returned to clients
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypeResource {
    pub name: String,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserType> for UserTypeResource {
    fn from(user_type: &UserType) -> Self {
        Self {
            name: user_type.name.clone(),
            disabled: user_type.disabled,
            created_at: user_type.created_at,
            updated_at: user_type.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Page, SortDirection};
    use crate::validation::{check, violations};

    #[test]
    fn test_missing_name_is_required() {
        let resource: UserTypeCreateResource = serde_json::from_str("{}").unwrap();
        let violations = violations::<UserTypeCreateResource>(&check(&resource));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "UserTypeCreateResource.Name");
        assert_eq!(violations[0].rule, "required");
    }

    #[test]
    fn test_long_name_fails_length() {
        let resource = UserTypeUpdateResource {
            name: "x".repeat(51),
            disabled: false,
        };
        let violations = violations::<UserTypeUpdateResource>(&check(&resource));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].rule, "length");
    }

    #[test]
    fn test_find_resource_rejects_unknown_sort() {
        let resource = UserTypeFindResource {
            sort_by: Some("password".into()),
            sort_dir: Some("sideways".into()),
            ..Default::default()
        };
        let violations = violations::<UserTypeFindResource>(&check(&resource));
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();

        assert_eq!(
            fields,
            vec!["UserTypeFindResource.SortBy", "UserTypeFindResource.SortDir"]
        );
        assert!(violations.iter().all(|v| v.rule == "oneof"));
    }

    #[test]
    fn test_find_resource_options() {
        let resource = UserTypeFindResource {
            sort_by: Some("created_at".into()),
            sort_dir: Some("desc".into()),
            offset: Some(5),
            limit: Some(5),
            ..Default::default()
        };
        let options = resource.options(50);
        let sort = options.sort().unwrap();

        assert_eq!(sort.field, UserTypeSortField::CreatedAt);
        assert_eq!(sort.direction, SortDirection::Desc);
        assert_eq!(options.page(), Some(Page { offset: 5, limit: 5 }));
    }
}
