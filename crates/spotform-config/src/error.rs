use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "configuration file not found. Looked in:\n\
        - current directory: spotform.local.yaml, spotform.yaml, spotform.yml, spotform.json\n\
        - ~/.config/spotform/spotform.yaml\n\
        Set SPOTFORM_CONFIG_PATH or pass --config to point at a file directly"
    )]
    ConfigFileNotFound,

    #[error("unsupported configuration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
