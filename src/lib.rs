pub mod api;
pub mod logger;
pub mod settings;

pub mod server;

pub mod application_port;
pub mod application_impl;
pub mod domain_model;
pub mod domain_port;
pub mod infra_auth0;
pub mod infra_file;
pub mod infra_local;
pub mod infra_memory;
