#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("No configuration file found (looked in: {0})")]
    NotFound(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}
