//! Persisted entities

pub mod user;
pub mod user_type;

pub use user::User;
pub use user_type::UserType;
