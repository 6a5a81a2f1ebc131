//! Configuration loading and merging
//!
//! Defaults come from a fresh in-code tree, a YAML file is deep-merged on
//! top, and CLI flags are applied last by direct assignment
//! (CLI > File > Defaults).

pub mod loader;
pub mod merge;

pub use loader::{load_config, CliOverrides, Config, NatsServer};
