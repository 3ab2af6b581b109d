//! Small helpers shared by the workspace crates: environment lookups and the
//! layered application settings.

pub mod config;
pub mod env;
