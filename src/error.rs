//! # Errors
//!
//! Failures at the crate boundary: configuration, colours, search queries and hyphenation
//! dictionaries. The layout core itself never fails; degenerate states are
//! logged and absorbed where they occur.

/// Errors raised while configuring a view or loading its collaborators
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("Failed to load hyphenation dictionary: {0}")]
    Hyphenation(String),
    #[error("Search query is empty")]
    EmptyQuery,
    #[error("Search query cannot be compiled: {0}")]
    InvalidQuery(#[from] regex::Error),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, LayoutError>;
