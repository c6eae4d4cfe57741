use thiserror::Error;

pub type LinkageResult<T> = Result<T, LinkageError>;

#[derive(Error, Debug)]
pub enum LinkageError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown metric column: {0}")]
    UnknownMetric(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Grouping key must name at least one dimension")]
    EmptyGroupingKey,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
