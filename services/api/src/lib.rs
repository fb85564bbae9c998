//! Roster API service
//!
//! CRUD over users and the user types they belong to. Services validate
//! input, repositories translate filters and find options into SQL, and the
//! routes map outcomes onto HTTP.

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod query;
pub mod repositories;
pub mod resources;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use state::AppState;
