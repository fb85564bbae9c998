//! Field validation helpers
//!
//! Resources declare their static rules with `validator` derives. Rules that
//! need the database (`unique`, `user_type`) are added by the services on top
//! of the derived result. Everything funnels through [`finish`], which turns
//! the collected errors into ordered, namespaced [`FieldViolation`]s.

use std::borrow::Cow;
use std::collections::BTreeMap;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, AppResult, FieldViolation};
use crate::query::{MAX_LIMIT, SortDirection};

/// Rule names surfaced to clients
pub mod rules {
    pub const REQUIRED: &str = "required";
    pub const LENGTH: &str = "length";
    pub const RANGE: &str = "range";
    pub const ONE_OF: &str = "oneof";
    pub const UNIQUE: &str = "unique";
    pub const USER_TYPE: &str = "user_type";
}

/// A validated input resource
pub trait Resource: Validate {
    /// Type name used as the field namespace
    const NAME: &'static str;
    /// Field names in declaration order
    const FIELDS: &'static [&'static str];
}

/// Run the derived rules of `resource`
pub fn check<R: Resource>(resource: &R) -> ValidationErrors {
    match resource.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    }
}

/// Whether `field` already failed a rule
pub fn has_errors(errors: &ValidationErrors, field: &str) -> bool {
    errors.field_errors().contains_key(field)
}

/// Flag `field` as `unique` when another entity already owns the value
pub fn check_unique(errors: &mut ValidationErrors, field: &'static str, taken: bool) {
    if taken {
        errors.add(field, ValidationError::new(rules::UNIQUE));
    }
}

/// Flag `limit` unless it is within `1..=MAX_LIMIT`
pub fn check_limit(errors: &mut ValidationErrors, field: &'static str, limit: Option<u32>) {
    if let Some(limit) = limit {
        if !(1..=MAX_LIMIT).contains(&limit) {
            let mut err = ValidationError::new(rules::RANGE);
            err.add_param(Cow::from("min"), &1);
            err.add_param(Cow::from("max"), &MAX_LIMIT);
            err.add_param(Cow::from("value"), &limit);
            errors.add(field, err);
        }
    }
}

/// Fail with a validation error if anything was collected
pub fn finish<R: Resource>(errors: ValidationErrors, component: &'static str) -> AppResult<()> {
    if errors.errors().is_empty() {
        return Ok(());
    }
    Err(AppError::validation(component, violations::<R>(&errors)))
}

/// Flatten collected errors into violations ordered by field declaration
pub fn violations<R: Resource>(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut ordered: Vec<(usize, FieldViolation)> = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        let field = field.to_string();
        let position = R::FIELDS
            .iter()
            .position(|known| *known == field)
            .unwrap_or(R::FIELDS.len());

        for err in field_errors.iter() {
            let params: BTreeMap<String, serde_json::Value> = err
                .params
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect();

            ordered.push((
                position,
                FieldViolation {
                    field: namespace(R::NAME, &field),
                    rule: err.code.to_string(),
                    params,
                },
            ));
        }
    }

    ordered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.field.cmp(&b.1.field)));
    ordered.into_iter().map(|(_, violation)| violation).collect()
}

/// `("UserCreateResource", "user_type")` becomes `UserCreateResource.UserType`
pub fn namespace(resource: &str, field: &str) -> String {
    let pascal: String = field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect();
    format!("{resource}.{pascal}")
}

/// Custom rule: the string must not be empty
pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(rules::REQUIRED));
    }
    Ok(())
}

/// Custom rule: the string must be one of `allowed`
pub fn validate_one_of(value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    let mut err = ValidationError::new(rules::ONE_OF);
    err.add_param(Cow::from("values"), &allowed.join(" "));
    Err(err)
}

/// Custom rule: the string must be a sort direction, in any case
pub fn validate_sort_dir(value: &str) -> Result<(), ValidationError> {
    validate_one_of(&value.to_ascii_lowercase(), SortDirection::ALLOWED)
}
