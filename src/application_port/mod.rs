mod session_service;
mod session_validator;
mod token_codec;

pub use session_service::*;
pub use session_validator::*;
pub use token_codec::*;
