//! HTTP tests for the user endpoints

mod support;

use axum::{
    Router,
    http::{Method, StatusCode},
};
use serde_json::json;
use support::{app, field_errors, send};

async fn app_with_user_types() -> Router {
    let app = app().await;
    for name in ["admin", "guest"] {
        let (status, _) = send(&app, Method::POST, "/user_type", Some(json!({ "name": name }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app
}

#[tokio::test]
async fn test_user_creation() {
    let app = app_with_user_types().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/user",
        Some(json!({ "username": "ada", "user_type": "admin" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "ada");
    assert_eq!(body["userType"], "admin");
    assert_eq!(body["disabled"], false);
}

#[tokio::test]
async fn test_user_creation_unknown_user_type() {
    let app = app_with_user_types().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/user",
        Some(json!({ "username": "ada", "user_type": "wizard" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        field_errors(&body),
        vec![("UserCreateResource.UserType".to_string(), "user_type".to_string())]
    );
    assert_eq!(
        body["data"]["errors"][0]["message"],
        "UserType must be an existing user type"
    );
}

#[tokio::test]
async fn test_user_creation_reports_every_field() {
    let app = app_with_user_types().await;
    let (status, body) = send(&app, Method::POST, "/user", Some(json!({ "disabled": true }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        field_errors(&body),
        vec![
            ("UserCreateResource.Username".to_string(), "required".to_string()),
            ("UserCreateResource.UserType".to_string(), "required".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_user_update_and_find() {
    let app = app_with_user_types().await;
    send(
        &app,
        Method::POST,
        "/user",
        Some(json!({ "username": "ada", "user_type": "admin" })),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/user",
        Some(json!({ "username": "bob", "user_type": "guest" })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/user/ada",
        Some(json!({ "username": "ada", "userType": "guest", "disabled": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userType"], "guest");

    let (status, body) = send(
        &app,
        Method::GET,
        "/user?user_type=guest&sort_by=username&sort_dir=desc",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 2);
    assert_eq!(body["data"][0]["username"], "bob");
    assert_eq!(body["data"][1]["username"], "ada");

    let (status, body) = send(&app, Method::GET, "/user/ada", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disabled"], true);
}

#[tokio::test]
async fn test_user_update_not_found() {
    let app = app_with_user_types().await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/user/ghost",
        Some(json!({ "username": "ghost", "user_type": "admin" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "model_not_found");
}

#[tokio::test]
async fn test_user_delete_is_idempotent() {
    let app = app_with_user_types().await;
    send(
        &app,
        Method::POST,
        "/user",
        Some(json!({ "username": "ada", "user_type": "admin" })),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, "/user/ada", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ada");

    let (status, body) = send(&app, Method::DELETE, "/user/ada", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "");

    let (status, _) = send(&app, Method::GET, "/user/ada", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
