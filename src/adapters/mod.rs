// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing the collaborator implementations.
//!
//! This module contains the document formats implementing the parser and
//! serializer ports, file access with extension-based format selection, and the
//! dynamic-value bridge.

pub mod dynamic;
pub mod file;
pub mod json_format;
pub mod libconfig_format;
pub mod toml_format;
#[cfg(feature = "yaml")]
pub mod yaml_format;

pub use json_format::{JsonFormat, NullValuePolicy};
pub use libconfig_format::LibconfigFormat;
pub use toml_format::TomlFormat;
#[cfg(feature = "yaml")]
pub use yaml_format::YamlFormat;

use crate::domain::ConfigError;

// Dotted path of a document member, used in error messages.
pub(crate) fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

pub(crate) fn invalid_name(format: &str, path: &str) -> ConfigError {
    ConfigError::parse_error(format!(
        "Invalid {} document: `{}` is not a valid parameter name! Names may only \
         contain alphanumeric characters, `-` and `_`.",
        format, path
    ))
}
