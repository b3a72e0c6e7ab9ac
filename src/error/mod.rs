//! Error types for the brintel pipeline.
//!
//! This module provides specialized error types for the two fatal failure
//! domains (configuration, per-battle parsing) and aggregates them, together
//! with external library errors, into a single unified error type using
//! `thiserror` for ergonomic definitions with automatic `Display` and `Error`
//! trait implementations.

pub mod config;
pub mod parse;

use thiserror::Error;

use crate::error::{config::ConfigError, parse::ParseError};

/// Main error type for the brintel pipeline.
///
/// Aggregates the domain-specific error types and external library errors
/// into a single unified error type, using `thiserror`'s `#[from]` attribute
/// to enable automatic conversion via the `?` operator.
///
/// # Error Categories
/// - Configuration errors (malformed allegiance document, invalid entity category): fatal for the run
/// - Parse errors (timing text, missing document fields): fatal for the single battle being parsed
/// - External library errors (JSON deserialization, file I/O)
///
/// Identity heuristic fallbacks and classification ambiguity are deliberately
/// *not* errors: they recover locally with a degraded-but-valid result
/// (sentinel id, `Team::Unknown`) and a logged diagnostic.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (malformed allegiance document, invalid category).
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    /// Battle document parse error (timing text, missing fields).
    #[error(transparent)]
    ParseError(#[from] ParseError),
    /// JSON serialization/deserialization error.
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    /// File I/O error (cache reads, export writes).
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
