use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error(
        "Manifest not found. Looked for:\n\
        - current directory: safetorun.local.yaml, safetorun.yaml\n\
        - ./.safetorun/ directory\n\
        Or point SAFETORUN_MANIFEST at a file"
    )]
    ManifestNotFound,

    #[error("No endpoint configured. Set `endpoint` in {0} or SAFETORUN_ENDPOINT")]
    MissingEndpoint(PathBuf),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
