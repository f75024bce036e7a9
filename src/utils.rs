//! Utility functions and helpers.

pub mod settings;

pub use settings::{get_env_var, get_env_vars, resolve_token, Settings};
