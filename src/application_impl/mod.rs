mod session_service_impl;
mod session_validator_impl;
mod token_codec_jwt;

#[cfg(test)]
mod identity_provider_fake;

pub use session_service_impl::*;
pub use session_validator_impl::*;
pub use token_codec_jwt::*;

#[cfg(test)]
pub use identity_provider_fake::*;
