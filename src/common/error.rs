use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavError {
    #[error("Bake incomplete: expected {expected} lookups, created {created}")]
    BakeIncomplete { expected: usize, created: usize },

    #[error("Bake cancelled")]
    BakeCancelled,

    #[error("Invalid routing table: {0}")]
    InvalidTable(String),

    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scene error: {0}")]
    Scene(String),

    #[error("Corrupt asset: {0}")]
    CorruptAsset(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavError),

    #[error("No navigation context installed for scene {scene}")]
    NoContext { scene: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type NavResult<T> = Result<T, NavError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
