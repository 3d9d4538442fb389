mod identity_provider_auth0;

pub use identity_provider_auth0::*;
