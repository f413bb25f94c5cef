mod login;
mod logout;
mod sweep;
mod whoami;

pub use login::login;
pub use logout::logout;
pub use sweep::sweep_sessions;
pub use whoami::whoami;
