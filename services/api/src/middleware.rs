//! Request context middleware

use axum::{
    extract::State,
    http::{Request, header::ACCEPT_LANGUAGE},
    middleware::Next,
    response::Response,
};
use tokio_util::sync::CancellationToken;

use crate::{context::RequestContext, i18n::Locale, state::AppState};

/// Attach a [`RequestContext`] to the request extensions
///
/// The context's token is cancelled if the request future is dropped before
/// a response is produced, e.g. when the client goes away.
pub async fn request_context(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|header| header.to_str().ok());
    let locale = Locale::negotiate(header, state.config.default_locale);

    let token = CancellationToken::new();
    let ctx = RequestContext::new(locale)
        .with_cancellation(token.clone())
        .with_timeout(state.config.request_timeout());
    req.extensions_mut().insert(ctx);

    let guard = token.drop_guard();
    let response = next.run(req).await;
    guard.disarm();

    response
}
