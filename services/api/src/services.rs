//! Business operations over users and user types

pub mod clock;
pub mod user;
pub mod user_type;

pub use clock::{Clock, SystemClock};
pub use user::UserService;
pub use user_type::UserTypeService;
