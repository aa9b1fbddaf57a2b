//! Configuration for gh-pr-commenter
//!
//! This crate provides:
//! - Config file locations (CWD, then the platform config directory)
//! - Configuration file loading (TOML)
//! - Commenter configuration (CommenterConfig, RetryConfig)

pub mod commenter_config;
pub mod config_file;
pub mod paths;

pub use commenter_config::{CommenterConfig, RetryConfig, DEFAULT_HOST};
pub use config_file::load_config_file;
