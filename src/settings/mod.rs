//! Settings are read from a TOML file chosen by `--settings`.
//! See `bin/settings_demo.rs` for a manual check of the loading rules.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
