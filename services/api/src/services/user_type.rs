//! User type service

use std::sync::Arc;

use tracing::debug;

use super::Clock;
use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::models::UserType;
use crate::repositories::UserTypeRepository;
use crate::resources::{
    ResourceList, UserTypeCreateResource, UserTypeDeleteResource, UserTypeFindOneResource,
    UserTypeFindResource, UserTypeResource, UserTypeUpdateResource,
};
use crate::validation;

const SOURCE: &str = "UserTypeService";

/// Validated operations on user types
#[derive(Clone)]
pub struct UserTypeService {
    repository: UserTypeRepository,
    clock: Arc<dyn Clock>,
    default_limit: u32,
}

impl UserTypeService {
    /// Create a new user type service
    ///
    /// `default_limit` caps listings that do not specify paging.
    pub fn new(repository: UserTypeRepository, clock: Arc<dyn Clock>, default_limit: u32) -> Self {
        Self {
            repository,
            clock,
            default_limit,
        }
    }

    /// List user types, counting first so an empty result costs one query
    pub async fn find(
        &self,
        ctx: &RequestContext,
        resource: &UserTypeFindResource,
    ) -> AppResult<ResourceList<UserTypeResource>> {
        let mut errors = validation::check(resource);
        validation::check_limit(&mut errors, "limit", resource.limit);
        validation::finish::<UserTypeFindResource>(errors, SOURCE)?;

        let filters = resource.filters();
        let options = resource.options(self.default_limit);

        let total = self.repository.count(ctx, &filters, &options).await?;
        if total == 0 {
            return Ok(ResourceList::empty());
        }

        let user_types = self.repository.find(ctx, &filters, &options).await?;
        debug!(total, returned = user_types.len(), "Listed user types");

        Ok(ResourceList::new(
            user_types.iter().map(UserTypeResource::from).collect(),
            total,
        ))
    }

    pub async fn find_one(
        &self,
        ctx: &RequestContext,
        resource: &UserTypeFindOneResource,
    ) -> AppResult<UserTypeResource> {
        validation::finish::<UserTypeFindOneResource>(validation::check(resource), SOURCE)?;

        self.repository
            .find_one_by_name(ctx, &resource.name)
            .await?
            .map(|user_type| UserTypeResource::from(&user_type))
            .ok_or_else(|| AppError::not_found(SOURCE))
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        resource: UserTypeCreateResource,
    ) -> AppResult<UserTypeResource> {
        let mut errors = validation::check(&resource);
        if !validation::has_errors(&errors, "name") {
            let taken = self.repository.name_taken(ctx, &resource.name, None).await?;
            validation::check_unique(&mut errors, "name", taken);
        }
        validation::finish::<UserTypeCreateResource>(errors, SOURCE)?;

        let now = self.clock.now();
        let mut user_type = UserType {
            id: 0,
            name: resource.name,
            disabled: resource.disabled,
            created_at: now,
            updated_at: now,
        };
        self.repository.create(ctx, &mut user_type).await?;
        debug!(id = user_type.id, name = %user_type.name, "Created user type");

        Ok(UserTypeResource::from(&user_type))
    }

    /// Update the user type currently named `name`
    ///
    /// The target is resolved before validation so that keeping its own name
    /// does not count as a collision.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        name: &str,
        resource: UserTypeUpdateResource,
    ) -> AppResult<UserTypeResource> {
        let mut user_type = self
            .repository
            .find_one_by_name(ctx, name)
            .await?
            .ok_or_else(|| AppError::not_found(SOURCE))?;

        let mut errors = validation::check(&resource);
        if !validation::has_errors(&errors, "name") {
            let taken = self
                .repository
                .name_taken(ctx, &resource.name, Some(user_type.id))
                .await?;
            validation::check_unique(&mut errors, "name", taken);
        }
        validation::finish::<UserTypeUpdateResource>(errors, SOURCE)?;

        user_type.name = resource.name;
        user_type.disabled = resource.disabled;
        user_type.updated_at = self.clock.now();
        self.repository.update(ctx, &user_type).await?;
        debug!(id = user_type.id, name = %user_type.name, "Updated user type");

        Ok(UserTypeResource::from(&user_type))
    }

    /// Delete a user type; an unknown name yields an empty resource
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        resource: &UserTypeDeleteResource,
    ) -> AppResult<UserTypeResource> {
        validation::finish::<UserTypeDeleteResource>(validation::check(resource), SOURCE)?;

        let Some(user_type) = self.repository.find_one_by_name(ctx, &resource.name).await? else {
            return Ok(UserTypeResource::default());
        };

        self.repository.delete(ctx, &user_type).await?;
        debug!(id = user_type.id, name = %user_type.name, "Deleted user type");

        Ok(UserTypeResource::from(&user_type))
    }

    /// Look up the user type a user refers to
    pub async fn resolve_by_name(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> AppResult<Option<UserType>> {
        self.repository.find_one_by_name(ctx, name).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::error::ErrorKind;
    use crate::test_support::{self, StepClock};

    async fn service() -> UserTypeService {
        UserTypeService::new(
            UserTypeRepository::new(test_support::pool().await),
            Arc::new(StepClock::new()),
            50,
        )
    }

    fn create(name: &str) -> UserTypeCreateResource {
        UserTypeCreateResource {
            name: name.to_string(),
            disabled: false,
        }
    }

    #[tokio::test]
    async fn test_find_on_empty_store() {
        let service = service().await;
        let list = service
            .find(&RequestContext::default(), &UserTypeFindResource::default())
            .await
            .unwrap();

        assert!(list.data.is_empty());
        assert_eq!(list.total_count, 0);
        assert_eq!(list.page_count, 0);
    }

    #[tokio::test]
    async fn test_create_then_find_one_round_trips() {
        let service = service().await;
        let ctx = RequestContext::default();

        let created = service.create(&ctx, create("x")).await.unwrap();
        let found = service
            .find_one(&ctx, &UserTypeFindOneResource { name: "x".into() })
            .await
            .unwrap();

        assert_eq!(found, created);
        assert_eq!(found.name, "x");
        assert!(!found.disabled);
        assert_ne!(found.created_at, DateTime::<Utc>::default());
        assert_eq!(found.created_at, found.updated_at);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_unique_violation() {
        let service = service().await;
        let ctx = RequestContext::default();
        service.create(&ctx, create("test-user-type-1")).await.unwrap();

        let err = service.create(&ctx, create("test-user-type-1")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "UserTypeCreateResource.Name");
        assert_eq!(err.violations[0].rule, "unique");
    }

    #[tokio::test]
    async fn test_update_unknown_name_is_not_found() {
        let service = service().await;
        let err = service
            .update(&RequestContext::default(), "ghost", UserTypeUpdateResource {
                name: "ghost".into(),
                disabled: false,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_keeps_own_name_and_refreshes_updated_at() {
        let service = service().await;
        let ctx = RequestContext::default();
        let before = service.create(&ctx, create("admin")).await.unwrap();

        let after = service
            .update(&ctx, "admin", UserTypeUpdateResource {
                name: "admin".into(),
                disabled: true,
            })
            .await
            .unwrap();

        assert!(after.disabled);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn test_update_to_taken_name_is_unique_violation() {
        let service = service().await;
        let ctx = RequestContext::default();
        service.create(&ctx, create("admin")).await.unwrap();
        service.create(&ctx, create("guest")).await.unwrap();

        let err = service
            .update(&ctx, "guest", UserTypeUpdateResource {
                name: "admin".into(),
                disabled: false,
            })
            .await
            .unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "UserTypeUpdateResource.Name");
        assert_eq!(err.violations[0].rule, "unique");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = service().await;
        let ctx = RequestContext::default();
        service.create(&ctx, create("admin")).await.unwrap();
        let resource = UserTypeDeleteResource {
            name: "admin".into(),
        };

        let deleted = service.delete(&ctx, &resource).await.unwrap();
        assert_eq!(deleted.name, "admin");

        let again = service.delete(&ctx, &resource).await.unwrap();
        assert_eq!(again, UserTypeResource::default());
    }

    #[tokio::test]
    async fn test_pages_walk_rows_in_order() {
        let service = service().await;
        let ctx = RequestContext::default();
        for name in ["row1", "row2", "row3"] {
            service.create(&ctx, create(name)).await.unwrap();
        }

        let mut seen = Vec::new();
        for offset in 0..3 {
            let page = service
                .find(&ctx, &UserTypeFindResource {
                    sort_by: Some("id".into()),
                    sort_dir: Some("asc".into()),
                    offset: Some(offset),
                    limit: Some(1),
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(page.total_count, 3);
            assert_eq!(page.page_count, 1);
            seen.push(page.data[0].name.clone());
        }
        assert_eq!(seen, vec!["row1", "row2", "row3"]);
    }

    #[tokio::test]
    async fn test_find_rejects_out_of_range_limit() {
        let service = service().await;
        let err = service
            .find(&RequestContext::default(), &UserTypeFindResource {
                offset: Some(0),
                limit: Some(501),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.violations[0].field, "UserTypeFindResource.Limit");
        assert_eq!(err.violations[0].rule, "range");
    }

    #[tokio::test]
    async fn test_find_one_unknown_is_not_found() {
        let service = service().await;
        let err = service
            .find_one(&RequestContext::default(), &UserTypeFindOneResource {
                name: "ghost".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
