pub mod error;
pub mod manifest;
pub mod settings;

pub use error::*;
pub use manifest::{Manifest, ResourceBlock};
pub use settings::{Settings, WaitSettings};

use std::path::PathBuf;

pub const MANIFEST_ENV: &str = "SAFETORUN_MANIFEST";
pub const ENDPOINT_ENV: &str = "SAFETORUN_ENDPOINT";
pub const API_KEY_ENV: &str = "SAFETORUN_API_KEY";
pub const TOKEN_ENV: &str = "SAFETORUN_TOKEN";

/// Directory for project-local files (state, lock, manifest)
pub const PROJECT_DIR: &str = ".safetorun";

/// Get the Safetorun config directory, creating it if needed
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("safetorun");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Find the project's manifest file
///
/// Search order:
/// 1. `SAFETORUN_MANIFEST` environment variable
/// 2. Current directory: safetorun.local.yaml, safetorun.yaml
/// 3. `./.safetorun/` directory, same order
pub fn find_manifest_file() -> Result<PathBuf> {
    if let Ok(manifest_path) = std::env::var(MANIFEST_ENV) {
        let path = PathBuf::from(manifest_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "{} points at a missing file: {}",
            MANIFEST_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;
    let candidates = ["safetorun.local.yaml", "safetorun.yaml"];

    for filename in &candidates {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let project_dir = current_dir.join(PROJECT_DIR);
    if project_dir.is_dir() {
        for filename in &candidates {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    Err(ConfigError::ManifestNotFound)
}
