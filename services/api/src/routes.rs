//! API service routes
//!
//! Handlers only bind input, call a service and render the outcome. Every
//! failure leaves through [`handle_error`].

use axum::{
    Extension, Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use common::database::health_check as database_health;
use serde_json::json;

use crate::{
    AppState,
    context::RequestContext,
    error::{AppError, BoxError, HttpError, handle_error},
    middleware::request_context,
    resources::{
        ResourceList, UserCreateResource, UserDeleteResource, UserFindOneResource,
        UserFindResource, UserResource, UserTypeCreateResource, UserTypeDeleteResource,
        UserTypeFindOneResource, UserTypeFindResource, UserTypeResource, UserTypeUpdateResource,
        UserUpdateResource,
    },
};

const SOURCE: &str = "Router";

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/user_type", get(find_user_types).post(create_user_type))
        .route(
            "/user_type/:name",
            get(find_user_type)
                .put(update_user_type)
                .delete(delete_user_type),
        )
        .route("/user", get(find_users).post(create_user))
        .route(
            "/user/:username",
            get(find_user).put(update_user).delete(delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            request_context,
        ))
        .route("/health", get(health_check))
        .with_state(state)
}

fn binding_error(ctx: &RequestContext, rejection: impl Into<BoxError>) -> HttpError {
    handle_error(ctx, AppError::binding(SOURCE, rejection))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let healthy = matches!(database_health(&state.db_pool).await, Ok(true));
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if healthy { "ok" } else { "degraded" },
            "service": "roster-api"
        })),
    )
}

/// List user types
pub async fn find_user_types(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<UserTypeFindResource>, QueryRejection>,
) -> Result<Json<ResourceList<UserTypeResource>>, HttpError> {
    let Query(resource) = query.map_err(|e| binding_error(&ctx, e))?;

    let list = state
        .user_type_service
        .find(&ctx, &resource)
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok(Json(list))
}

/// Get a user type by name
pub async fn find_user_type(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UserTypeResource>, HttpError> {
    let Path(name) = path.map_err(|e| binding_error(&ctx, e))?;

    let user_type = state
        .user_type_service
        .find_one(&ctx, &UserTypeFindOneResource { name })
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok(Json(user_type))
}

/// Create a new user type
pub async fn create_user_type(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<UserTypeCreateResource>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(resource) = payload.map_err(|e| binding_error(&ctx, e))?;

    let user_type = state
        .user_type_service
        .create(&ctx, resource)
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok((StatusCode::CREATED, Json(user_type)))
}

/// Update the user type named in the path
pub async fn update_user_type(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UserTypeUpdateResource>, JsonRejection>,
) -> Result<Json<UserTypeResource>, HttpError> {
    let Path(name) = path.map_err(|e| binding_error(&ctx, e))?;
    let Json(resource) = payload.map_err(|e| binding_error(&ctx, e))?;

    let user_type = state
        .user_type_service
        .update(&ctx, &name, resource)
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok(Json(user_type))
}

/// Delete the user type named in the path
pub async fn delete_user_type(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UserTypeResource>, HttpError> {
    let Path(name) = path.map_err(|e| binding_error(&ctx, e))?;

    let user_type = state
        .user_type_service
        .delete(&ctx, &UserTypeDeleteResource { name })
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok(Json(user_type))
}

/// List users
pub async fn find_users(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<UserFindResource>, QueryRejection>,
) -> Result<Json<ResourceList<UserResource>>, HttpError> {
    let Query(resource) = query.map_err(|e| binding_error(&ctx, e))?;

    let list = state
        .user_service
        .find(&ctx, &resource)
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok(Json(list))
}

/// Get a user by username
pub async fn find_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UserResource>, HttpError> {
    let Path(username) = path.map_err(|e| binding_error(&ctx, e))?;

    let user = state
        .user_service
        .find_one(&ctx, &UserFindOneResource { username })
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok(Json(user))
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<UserCreateResource>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(resource) = payload.map_err(|e| binding_error(&ctx, e))?;

    let user = state
        .user_service
        .create(&ctx, resource)
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Update the user named in the path
pub async fn update_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UserUpdateResource>, JsonRejection>,
) -> Result<Json<UserResource>, HttpError> {
    let Path(username) = path.map_err(|e| binding_error(&ctx, e))?;
    let Json(resource) = payload.map_err(|e| binding_error(&ctx, e))?;

    let user = state
        .user_service
        .update(&ctx, &username, resource)
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok(Json(user))
}

/// Delete the user named in the path
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<UserResource>, HttpError> {
    let Path(username) = path.map_err(|e| binding_error(&ctx, e))?;

    let user = state
        .user_service
        .delete(&ctx, &UserDeleteResource { username })
        .await
        .map_err(|e| handle_error(&ctx, e))?;

    Ok(Json(user))
}
