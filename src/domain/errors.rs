// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration crate.
//!
//! This module defines the error kinds that can occur when addressing, reading,
//! writing or loading configuration parameters. All errors use `thiserror`.

use thiserror::Error;

/// The main error type for configuration operations.
///
/// Every failure names the offending fully-qualified parameter name (FQN) and,
/// where applicable, the expected and the actual kind. The enum is marked as
/// `#[non_exhaustive]` to allow for future additions.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::errors::ConfigError;
///
/// let err = ConfigError::key_not_found("database.hots", vec!["database.host".to_string()]);
/// assert!(err.to_string().contains("database.host"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The requested parameter does not exist.
    #[error("Key `{key}` does not exist!{}", format_suggestions(.suggestions))]
    KeyNotFound {
        /// The fully-qualified name that could not be resolved
        key: String,
        /// Existing parameter names that are close to `key`
        suggestions: Vec<String>,
    },

    /// A parameter exists but has a different kind, a type change was
    /// attempted, or a dynamic value could not be mapped to a parameter kind.
    #[error("{message}")]
    TypeError {
        /// Description naming the key and the involved kinds/types
        message: String,
    },

    /// An input value is invalid, e.g. a malformed date string, a lossy
    /// numeric cast, an empty placeholder or a malformed key.
    #[error("{message}")]
    ValueError {
        /// Description of the invalid input
        message: String,
    },

    /// A list index is out of bounds.
    #[error("Index {index} is out of range for list `{key}` with {len} element(s)!")]
    IndexError {
        /// The list parameter
        key: String,
        /// The requested (unresolved) index
        index: i64,
        /// The length of the list
        len: usize,
    },

    /// Failed to read or parse a configuration document.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = suggestions.iter().map(|s| format!("`{}`", s)).collect();
    format!(" Did you mean: {}?", quoted.join(", "))
}

impl ConfigError {
    /// Creates a `KeyNotFound` error with optional suggestions.
    pub fn key_not_found(key: impl Into<String>, suggestions: Vec<String>) -> Self {
        ConfigError::KeyNotFound {
            key: key.into(),
            suggestions,
        }
    }

    /// Creates a `TypeError` from a message.
    pub fn type_error(message: impl Into<String>) -> Self {
        ConfigError::TypeError {
            message: message.into(),
        }
    }

    /// Creates a `ValueError` from a message.
    pub fn value_error(message: impl Into<String>) -> Self {
        ConfigError::ValueError {
            message: message.into(),
        }
    }

    /// Creates a `ParseError` without an underlying cause.
    pub fn parse_error(message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a `ParseError` wrapping a parser-specific error.
    pub fn from_parser_error<E>(format: &str, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ConfigError::ParseError {
            message: format!("Invalid {} document: {}", format, err),
            source: Some(Box::new(err)),
        }
    }

    /// Creates a `ParseError` from an I/O error encountered while reading `what`.
    pub fn from_io_error(what: &str, err: std::io::Error) -> Self {
        ConfigError::ParseError {
            message: format!("{}: {}", what, err),
            source: Some(Box::new(err)),
        }
    }

    /// Returns `true` if this is a `KeyNotFound` error.
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, ConfigError::KeyNotFound { .. })
    }

    /// Returns `true` if this is a `TypeError`.
    pub fn is_type_error(&self) -> bool {
        matches!(self, ConfigError::TypeError { .. })
    }

    /// Returns `true` if this is a `ValueError`.
    pub fn is_value_error(&self) -> bool {
        matches!(self, ConfigError::ValueError { .. })
    }

    /// Returns `true` if this is an `IndexError`.
    pub fn is_index_error(&self) -> bool {
        matches!(self, ConfigError::IndexError { .. })
    }

    /// Returns `true` if this is a `ParseError`.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ConfigError::ParseError { .. })
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
