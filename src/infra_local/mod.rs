mod identity_provider_local;

pub use identity_provider_local::*;
