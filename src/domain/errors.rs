// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the configuration merge engine.
//!
//! This module defines the error types that can occur while decoding, parsing,
//! selecting, and merging configuration sources. All errors use `thiserror` for
//! proper error handling and conversion.

use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;
use thiserror::Error;

/// The main error type for configuration operations.
///
/// This enum represents all possible errors that can occur when processing raw
/// configuration sources. It is marked as `#[non_exhaustive]` to allow for future
/// additions without breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use k8scfg::domain::errors::ConfigError;
///
/// fn read_prefix() -> Result<String, ConfigError> {
///     Err(ConfigError::InvalidPrefixState {
///         message: "prefix is deferred".to_string(),
///     })
/// }
///
/// assert!(read_prefix().is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A raw value of a source could not be base64-decoded into text.
    #[error("Failed to decode key '{key}' of source '{source_name}': {message}")]
    DecodeError {
        /// The name of the source holding the value
        source_name: String,
        /// The key whose value could not be decoded
        key: String,
        /// The error message
        message: String,
        /// The underlying decoding error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failed to parse a structured document (YAML or properties).
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Processing a source failed and the failure policy does not allow skipping it.
    #[error("Configuration source '{source_name}' error: {message}")]
    SourceError {
        /// The name of the source that encountered the error
        source_name: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The value of a deferred prefix was read before it was resolved.
    #[error("Invalid prefix state: {message}")]
    InvalidPrefixState {
        /// The error message
        message: String,
    },

    /// A profile activation expression could not be parsed.
    #[error("Invalid profile expression '{expression}': {message}")]
    ProfileExpressionError {
        /// The offending expression
        expression: String,
        /// The error message
        message: String,
    },

    /// Failed to convert a configuration value to the requested type.
    #[error(
        "Failed to convert configuration value for key '{key}' to type {target_type}: {source}"
    )]
    TypeConversionError {
        /// The key being converted
        key: String,
        /// The target type name
        target_type: String,
        /// The underlying conversion error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O error occurred while reading a source snapshot.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    /// Creates a TypeConversionError from a ParseIntError.
    pub fn from_parse_int_error(key: String, err: ParseIntError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "integer".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseFloatError.
    pub fn from_parse_float_error(key: String, err: ParseFloatError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "float".to_string(),
            source: Box::new(err),
        }
    }

    /// Creates a TypeConversionError from a ParseBoolError.
    pub fn from_parse_bool_error(key: String, err: ParseBoolError) -> Self {
        ConfigError::TypeConversionError {
            key,
            target_type: "boolean".to_string(),
            source: Box::new(err),
        }
    }

    /// Returns `true` for errors that the failure policy may turn into a warning.
    ///
    /// Decoding and parsing failures are caused by the content of one source.
    /// A read of an unresolved prefix is a caller bug and is never skippable.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ConfigError::DecodeError { .. } | ConfigError::ParseError { .. }
        )
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
