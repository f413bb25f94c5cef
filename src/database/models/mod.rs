pub mod admin;
pub mod agency;
pub mod invitation;
pub mod session;
pub mod temporary_access;
pub mod user;

pub use admin::Admin;
pub use agency::Agency;
pub use invitation::Invitation;
pub use session::Session;
pub use temporary_access::TemporaryAccess;
pub use user::{Role, User};
