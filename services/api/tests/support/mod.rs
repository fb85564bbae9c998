//! Helpers for driving the router in-process

#![allow(dead_code)]

use api::{AppState, config::AppConfig, db, routes::create_router};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::database::{DatabaseConfig, init_pool};
use serde_json::Value;
use tower::ServiceExt;

/// Router over a fresh in-memory database
pub async fn app() -> Router {
    let pool = init_pool(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory pool");
    db::migrate(&pool).await.expect("migrations");
    create_router(AppState::new(pool, AppConfig::default()))
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_with_language(app, method, uri, body, None).await
}

pub async fn send_with_language(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    language: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(language) = language {
        request = request.header(header::ACCEPT_LANGUAGE, language);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    send_raw(app, request).await
}

pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// `(field, rule)` pairs of a validation error body
pub fn field_errors(body: &Value) -> Vec<(String, String)> {
    body["data"]["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .map(|e| {
                    (
                        e["field"].as_str().unwrap_or_default().to_string(),
                        e["rule"].as_str().unwrap_or_default().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}
