use thiserror::Error;

#[derive(Error, Debug)]
pub enum PomupError {
    #[error("Project validation failed: {0}")]
    ProjectValidation(String),

    #[error("POM parsing failed: {0}")]
    ManifestParsing(String),

    #[error("Failed to retrieve versions for {coordinate}: {reason}")]
    Catalog { coordinate: String, reason: String },

    #[error("Invalid version range specification '{spec}': {reason}")]
    InvalidVersionRange { spec: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PomupError>;
