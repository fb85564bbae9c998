//! Request and response payloads
//!
//! Input resources carry their field rules as `validator` derives and
//! implement [`Resource`](crate::validation::Resource) so violations can be
//! namespaced and ordered. Output resources serialize in camelCase.

use serde::Serialize;

pub mod user;
pub mod user_type;

pub use user::{
    UserCreateResource, UserDeleteResource, UserFindOneResource, UserFindResource, UserResource,
    UserUpdateResource,
};
pub use user_type::{
    UserTypeCreateResource, UserTypeDeleteResource, UserTypeFindOneResource,
    UserTypeFindResource, UserTypeResource, UserTypeUpdateResource,
};

/// Envelope for list responses
///
/// `page_count` is the number of items in `data`, not a number of pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList<T> {
    pub data: Vec<T>,
    pub total_count: i64,
    pub page_count: i64,
}

impl<T> ResourceList<T> {
    pub fn new(data: Vec<T>, total_count: i64) -> Self {
        let page_count = data.len() as i64;
        Self {
            data,
            total_count,
            page_count,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }
}
