mod session;
mod subject;
mod token;
mod user;

pub use session::*;
pub use subject::*;
pub use token::*;
pub use user::*;
