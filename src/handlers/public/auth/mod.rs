mod login;
mod signup;
pub mod utils;
mod verify;

pub use login::login;
pub use signup::signup;
pub use verify::verify_email;
