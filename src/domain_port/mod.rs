// store

mod session_store;

pub use session_store::*;

// provider

mod identity_provider;

pub use identity_provider::*;
