pub mod access_service;
pub mod admin_service;
pub mod session_service;
pub mod user_service;

pub use access_service::AccessService;
pub use admin_service::AdminService;
pub use session_service::SessionService;
pub use user_service::UserService;
