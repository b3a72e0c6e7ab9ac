use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read allegiance document at {path}: {reason}")]
    UnreadableDocument { path: String, reason: String },
    #[error("Allegiance document is malformed: {0}")]
    MalformedDocument(String),
    #[error("Entity category {0:?} is not valid, should be one of: alliance, corp, pilot, ship, system")]
    InvalidCategory(String),
}
