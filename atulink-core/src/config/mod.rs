//! Configuration types
//!
//! The bridge configuration is TOML embedded in the firmware image and
//! parsed at startup; the emulator only has fixed settings.

pub mod parse;
pub mod types;

pub use parse::{parse_bridge_config, ConfigError};
pub use types::*;
