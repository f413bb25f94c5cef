mod logout;
mod whoami;

pub use logout::logout;
pub use whoami::whoami;
