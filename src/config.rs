//! Configuration loader and schema types.
//!
//! This module exposes the settings that drive scanning, background
//! reconciliation and logging, and helpers to load them from disk.

mod load;
mod schema;

pub use load::{CONFIG_PATH_ENV, ENV_PREFIX, default_config_path, resolve_config_path};
pub use schema::*;
