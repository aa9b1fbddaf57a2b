use std::path::{Path, PathBuf};

/// Load config file content from the first path that can be read
///
/// Returns the path and the file content if found, None otherwise.
pub fn load_config_file(search_paths: &[PathBuf]) -> Option<(PathBuf, String)> {
    search_paths.iter().find_map(|path| read_config(path))
}

fn read_config(path: &Path) -> Option<(PathBuf, String)> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            log::debug!("Loaded config from {}", path.display());
            Some((path.to_path_buf(), content))
        }
        Err(_) => None,
    }
}
