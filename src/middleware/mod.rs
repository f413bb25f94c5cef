pub mod admin;
pub mod auth;
pub mod authorize;
pub mod response;

pub use admin::CurrentAdmin;
pub use auth::Identity;
