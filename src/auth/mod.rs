pub mod cookies;
pub mod credentials;
pub mod jwt;
