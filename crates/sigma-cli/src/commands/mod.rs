//! CLI command implementations.

pub mod common;
pub mod config;
pub mod patch;
pub mod presets;
pub mod render;
