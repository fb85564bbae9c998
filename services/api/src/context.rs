//! Per-request context threaded through every service and repository call

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::i18n::Locale;

/// Locale, cancellation and deadline of one request
///
/// Cloning is cheap; clones share the same cancellation token.
#[derive(Debug, Clone)]
pub struct RequestContext {
    locale: Locale,
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Create a new context with no deadline
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            cancellation: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Share an existing cancellation token
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Give up on queries once `timeout` has elapsed from now
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.deadline = timeout.map(|timeout| Instant::now() + timeout);
        self
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Run a database future, abandoning it if the request goes away
    ///
    /// Cancellation wins over a query that completes in the same poll.
    pub async fn guard<T, F>(&self, component: &'static str, query: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => {
                Err(AppError::cancelled(component, "request cancelled"))
            }
            _ = deadline => {
                Err(AppError::cancelled(component, "request deadline exceeded"))
            }
            result = query => result.map_err(|e| AppError::database(component, e)),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Locale::default())
    }
}
