//! Error taxonomy for the API service
//!
//! Services and repositories fail with an [`AppError`], a domain error that
//! knows nothing about HTTP. The routes turn it into an [`HttpError`] through
//! [`handle_error`], which is the single place a request error gets logged.

use std::collections::BTreeMap;
use std::error::Error as StdError;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::context::RequestContext;
use crate::i18n::{self, Locale};

/// Boxed cause carried by an [`AppError`]
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Type alias for results of the core layers
pub type AppResult<T> = Result<T, AppError>;

/// Classification of a domain error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input could not be deserialized into a resource
    Binding,
    /// A resource failed one or more field rules
    Validation,
    /// The database rejected or failed a query
    Database,
    /// The addressed entity does not exist
    NotFound,
    /// The request was cancelled or ran past its deadline
    Cancelled,
    /// Anything else
    Internal,
}

impl ErrorKind {
    /// Stable machine code exposed to clients
    pub fn code(self) -> &'static str {
        match self {
            Self::Binding => "binding_error",
            Self::Validation => "validation_error",
            Self::Database => "db_error",
            Self::NotFound => "model_not_found",
            Self::Cancelled => "request_cancelled",
            Self::Internal => "internal_error",
        }
    }

    /// Message exposed to clients for this kind
    pub fn public_message(self) -> &'static str {
        match self {
            Self::Binding => "The request could not be read",
            Self::Validation => "The request contains invalid data",
            Self::Database => "Database error",
            Self::NotFound => "Model not found",
            Self::Cancelled => "The request was cancelled before it completed",
            Self::Internal => "Internal server error",
        }
    }

    /// HTTP status for this kind
    pub fn status(self) -> StatusCode {
        match self {
            Self::Binding | Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Cancelled => StatusCode::REQUEST_TIMEOUT,
            Self::Database | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A single failed rule on a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// Namespaced field, e.g. `UserTypeCreateResource.Name`
    pub field: String,
    /// Rule that failed, e.g. `required` or `unique`
    pub rule: String,
    /// Rule parameters used to render messages (`max`, `values`, ...)
    pub params: BTreeMap<String, serde_json::Value>,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            params: BTreeMap::new(),
        }
    }
}

/// Domain error produced by services and repositories
#[derive(Debug, Error)]
#[error("[{component}] Code: {} - Message: {message}", .kind.code())]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    /// Name of the component that raised the error
    pub component: &'static str,
    /// Per-field failures, in field declaration order
    pub violations: Vec<FieldViolation>,
    #[source]
    pub cause: Option<BoxError>,
}

impl AppError {
    pub fn new(kind: ErrorKind, component: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            component,
            violations: Vec::new(),
            cause: None,
        }
    }

    /// Attach the underlying cause
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn binding(component: &'static str, cause: impl Into<BoxError>) -> Self {
        let cause = cause.into();
        Self::new(ErrorKind::Binding, component, cause.to_string()).with_cause(cause)
    }

    pub fn validation(component: &'static str, violations: Vec<FieldViolation>) -> Self {
        let mut err = Self::new(
            ErrorKind::Validation,
            component,
            format!("{} field(s) failed validation", violations.len()),
        );
        err.violations = violations;
        err
    }

    pub fn database(component: &'static str, cause: sqlx::Error) -> Self {
        Self::new(ErrorKind::Database, component, cause.to_string()).with_cause(cause)
    }

    pub fn not_found(component: &'static str) -> Self {
        Self::new(ErrorKind::NotFound, component, ErrorKind::NotFound.public_message())
    }

    pub fn cancelled(component: &'static str, reason: &str) -> Self {
        Self::new(ErrorKind::Cancelled, component, reason)
    }

    pub fn internal(component: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, component, message)
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }
}

/// Field error as sent to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub rule: String,
    /// Message localized for the request
    pub message: String,
}

/// Payload of an [`HttpError`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HttpErrorData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// Transport error: the HTTP rendition of an [`AppError`]
#[derive(Debug, Clone, Serialize)]
pub struct HttpError {
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(skip)]
    pub component: &'static str,
    pub code: &'static str,
    pub message: String,
    pub data: HttpErrorData,
}

impl HttpError {
    /// Map a domain error onto its HTTP status and code
    ///
    /// Field violations are rendered in `locale`. Only validation errors
    /// carry field errors.
    pub fn from_app_error(err: &AppError, locale: Locale) -> Self {
        let errors = match err.kind {
            ErrorKind::Validation => err
                .violations
                .iter()
                .map(|violation| FieldError {
                    field: violation.field.clone(),
                    rule: violation.rule.clone(),
                    message: i18n::translate(locale, violation),
                })
                .collect(),
            _ => Vec::new(),
        };

        let message = match err.kind {
            ErrorKind::Binding => format!("{}: {}", err.kind.public_message(), err.message),
            kind => kind.public_message().to_string(),
        };

        Self {
            status: err.kind.status(),
            component: err.component,
            code: err.kind.code(),
            message,
            data: HttpErrorData { errors },
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

/// Convert a domain error into its HTTP form, logging it once
pub fn handle_error(ctx: &RequestContext, err: AppError) -> HttpError {
    let http = HttpError::from_app_error(&err, ctx.locale());

    if http.status.is_server_error() {
        error!(
            component = err.component,
            code = http.code,
            cause = ?err.cause,
            "[Application Error] {}",
            err
        );
    } else {
        warn!(component = err.component, code = http.code, "{}", err);
    }

    http
}
