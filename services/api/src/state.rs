//! Application state shared across handlers

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::repositories::{UserRepository, UserTypeRepository};
use crate::services::{Clock, SystemClock, UserService, UserTypeService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub user_type_service: UserTypeService,
    pub user_service: UserService,
}

impl AppState {
    /// Wire repositories and services over `db_pool`
    pub fn new(db_pool: SqlitePool, config: AppConfig) -> Self {
        Self::with_clock(db_pool, config, Arc::new(SystemClock))
    }

    pub fn with_clock(db_pool: SqlitePool, config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let user_type_service = UserTypeService::new(
            UserTypeRepository::new(db_pool.clone()),
            clock.clone(),
            config.default_limit,
        );
        let user_service = UserService::new(
            UserRepository::new(db_pool.clone()),
            user_type_service.clone(),
            clock,
            config.default_limit,
        );

        Self {
            db_pool,
            config: Arc::new(config),
            user_type_service,
            user_service,
        }
    }
}
