//! Configuration file locations
//!
//! Uses XDG directories via `dirs` crate with fallbacks.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/gh-pr-commenter/`
//! - macOS: `~/Library/Application Support/gh-pr-commenter/`
//! - Windows: `%APPDATA%\gh-pr-commenter\`

use std::path::PathBuf;

const APP_NAME: &str = "gh-pr-commenter";

/// Config file name looked up in the current working directory
pub const LOCAL_CONFIG_FILE: &str = ".gh-pr-commenter.toml";

/// Get the application config directory, if the platform has one
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join(APP_NAME))
}

/// Get path to the global config file
pub fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get path to the local config file (in CWD)
pub fn local_config_path() -> PathBuf {
    PathBuf::from(LOCAL_CONFIG_FILE)
}

/// Config files in lookup order: CWD first, then the global config directory
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![local_config_path()];
    paths.extend(global_config_path());
    paths
}
