use thiserror::Error;

/// All errors that can occur in bookgarden-core.
#[derive(Debug, Error)]
pub enum GardenError {
    #[error("Plant not found: {0}")]
    PlantNotFound(String),

    #[error("No book is currently growing")]
    NoGrowingPlant,

    #[error("A book is already growing: {0}")]
    AlreadyGrowing(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Exit codes matching the CLI specification.
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
    Conflict = 7,
}

pub type Result<T> = std::result::Result<T, GardenError>;
