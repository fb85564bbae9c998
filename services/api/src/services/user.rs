//! User service

use std::sync::Arc;

use tracing::debug;
use validator::{ValidationError, ValidationErrors};

use super::{Clock, UserTypeService};
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserType};
use crate::repositories::UserRepository;
use crate::resources::{
    ResourceList, UserCreateResource, UserDeleteResource, UserFindOneResource, UserFindResource,
    UserResource, UserUpdateResource,
};
use crate::validation::{self, rules};

const SOURCE: &str = "UserService";

/// Validated operations on users
#[derive(Clone)]
pub struct UserService {
    repository: UserRepository,
    user_types: UserTypeService,
    clock: Arc<dyn Clock>,
    default_limit: u32,
}

impl UserService {
    /// Create a new user service
    pub fn new(
        repository: UserRepository,
        user_types: UserTypeService,
        clock: Arc<dyn Clock>,
        default_limit: u32,
    ) -> Self {
        Self {
            repository,
            user_types,
            clock,
            default_limit,
        }
    }

    pub async fn find(
        &self,
        ctx: &RequestContext,
        resource: &UserFindResource,
    ) -> AppResult<ResourceList<UserResource>> {
        let mut errors = validation::check(resource);
        validation::check_limit(&mut errors, "limit", resource.limit);
        validation::finish::<UserFindResource>(errors, SOURCE)?;

        let filters = resource.filters();
        let options = resource.options(self.default_limit);

        let total = self.repository.count(ctx, &filters, &options).await?;
        if total == 0 {
            return Ok(ResourceList::empty());
        }

        let users = self.repository.find(ctx, &filters, &options).await?;
        debug!(total, returned = users.len(), "Listed users");

        Ok(ResourceList::new(
            users.iter().map(UserResource::from).collect(),
            total,
        ))
    }

    pub async fn find_one(
        &self,
        ctx: &RequestContext,
        resource: &UserFindOneResource,
    ) -> AppResult<UserResource> {
        validation::finish::<UserFindOneResource>(validation::check(resource), SOURCE)?;

        self.repository
            .find_one_by_username(ctx, &resource.username)
            .await?
            .map(|user| UserResource::from(&user))
            .ok_or_else(|| AppError::not_found(SOURCE))
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        resource: UserCreateResource,
    ) -> AppResult<UserResource> {
        let mut errors = validation::check(&resource);
        self.check_username(ctx, &mut errors, &resource.username, None)
            .await?;
        let user_type = self
            .resolve_user_type(ctx, &mut errors, &resource.user_type)
            .await?;
        validation::finish::<UserCreateResource>(errors, SOURCE)?;
        let user_type = user_type.ok_or_else(|| unresolved(&resource.user_type))?;

        let now = self.clock.now();
        let mut user = User {
            id: 0,
            username: resource.username,
            user_type,
            disabled: resource.disabled,
            created_at: now,
            updated_at: now,
        };
        self.repository.create(ctx, &mut user).await?;
        debug!(id = user.id, username = %user.username, "Created user");

        Ok(UserResource::from(&user))
    }

    /// Update the user currently named `username`
    ///
    /// The user type is resolved again on every update, even when unchanged.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        username: &str,
        resource: UserUpdateResource,
    ) -> AppResult<UserResource> {
        let mut user = self
            .repository
            .find_one_by_username(ctx, username)
            .await?
            .ok_or_else(|| AppError::not_found(SOURCE))?;

        let mut errors = validation::check(&resource);
        self.check_username(ctx, &mut errors, &resource.username, Some(user.id))
            .await?;
        let user_type = self
            .resolve_user_type(ctx, &mut errors, &resource.user_type)
            .await?;
        validation::finish::<UserUpdateResource>(errors, SOURCE)?;
        let user_type = user_type.ok_or_else(|| unresolved(&resource.user_type))?;

        user.username = resource.username;
        user.user_type = user_type;
        user.disabled = resource.disabled;
        user.updated_at = self.clock.now();
        self.repository.update(ctx, &user).await?;
        debug!(id = user.id, username = %user.username, "Updated user");

        Ok(UserResource::from(&user))
    }

    /// Delete a user; an unknown username yields an empty resource
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        resource: &UserDeleteResource,
    ) -> AppResult<UserResource> {
        validation::finish::<UserDeleteResource>(validation::check(resource), SOURCE)?;

        let Some(user) = self
            .repository
            .find_one_by_username(ctx, &resource.username)
            .await?
        else {
            return Ok(UserResource::default());
        };

        self.repository.delete(ctx, &user).await?;
        debug!(id = user.id, username = %user.username, "Deleted user");

        Ok(UserResource::from(&user))
    }

    async fn check_username(
        &self,
        ctx: &RequestContext,
        errors: &mut ValidationErrors,
        username: &str,
        own_id: Option<i64>,
    ) -> AppResult<()> {
        if validation::has_errors(errors, "username") {
            return Ok(());
        }
        let taken = self.repository.username_taken(ctx, username, own_id).await?;
        validation::check_unique(errors, "username", taken);
        Ok(())
    }

    /// Resolve the named user type, recording a `user_type` violation if it
    /// cannot be found
    ///
    /// A failed lookup is a violation too, except for cancellation, which is
    /// passed on.
    async fn resolve_user_type(
        &self,
        ctx: &RequestContext,
        errors: &mut ValidationErrors,
        name: &str,
    ) -> AppResult<Option<UserType>> {
        if validation::has_errors(errors, "user_type") {
            return Ok(None);
        }

        let resolved = match self.user_types.resolve_by_name(ctx, name).await {
            Ok(resolved) => resolved,
            Err(err) if err.is_cancelled() => return Err(err),
            Err(err) => {
                debug!(error = %err, "User type lookup failed");
                None
            }
        };

        if resolved.is_none() {
            errors.add("user_type", ValidationError::new(rules::USER_TYPE));
        }
        Ok(resolved)
    }
}

fn unresolved(name: &str) -> AppError {
    AppError::internal(SOURCE, format!("user type `{name}` was not resolved"))
}
