//! Shared fixtures for unit tests

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::database::{DatabaseConfig, init_pool};
use sqlx::SqlitePool;

use crate::services::Clock;

/// Fresh in-memory database with the schema applied
pub(crate) async fn pool() -> SqlitePool {
    let pool = init_pool(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory pool");
    crate::db::migrate(&pool).await.expect("migrations");
    pool
}

/// Clock that advances one second per reading
#[derive(Debug)]
pub(crate) struct StepClock {
    next: Mutex<DateTime<Utc>>,
}

impl StepClock {
    pub(crate) fn new() -> Self {
        Self {
            next: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + Duration::seconds(1);
        now
    }
}
