use thiserror::Error;

use crate::datatype::TypeTag;

#[derive(Error, Debug)]
pub enum OrmError {
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Unknown field '{field}' for table '{table}'")]
    UnknownField { table: String, field: String },
    #[error("Type error: column '{column}' expects {expected}, got {found}")]
    Type {
        column: String,
        expected: TypeTag,
        found: &'static str,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, OrmError>;

// Helper conversions
impl From<rusqlite::Error> for OrmError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<config::ConfigError> for OrmError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
