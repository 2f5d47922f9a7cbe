// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file access.
//!
//! This module reads configuration documents from disk and selects the parser
//! for a file by its extension. All read failures, including missing files,
//! are reported as `ConfigError::ParseError`.

use crate::adapters::{JsonFormat, LibconfigFormat, TomlFormat};
use crate::domain::{ConfigError, Group, Result};
use crate::ports::ConfigParser;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Maximum allowed size of a configuration file (10MB)
pub const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024;

static PARSERS: Lazy<Vec<Box<dyn ConfigParser>>> = Lazy::new(|| {
    let mut parsers: Vec<Box<dyn ConfigParser>> = vec![
        Box::new(TomlFormat::new()),
        Box::new(JsonFormat::new()),
        Box::new(LibconfigFormat::new()),
    ];
    #[cfg(feature = "yaml")]
    parsers.push(Box::new(crate::adapters::YamlFormat::new()));
    parsers
});

fn display_name(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
}

/// Reads a configuration file into a string.
///
/// The path is canonicalized and files larger than [`MAX_CONFIG_FILE_SIZE`]
/// are rejected before reading.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` if the file is missing, unreadable, too
/// large or not valid UTF-8.
pub fn read_config_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let file_path = path.as_ref();

    let canonical_path = file_path.canonicalize().map_err(|e| {
        ConfigError::from_io_error(
            &format!("Invalid or inaccessible path `{}`", file_path.display()),
            e,
        )
    })?;

    let metadata = fs::metadata(&canonical_path).map_err(|e| {
        ConfigError::from_io_error(
            &format!("Failed to read file metadata of `{}`", display_name(&canonical_path)),
            e,
        )
    })?;

    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::parse_error(format!(
            "Configuration file too large: {} bytes (max {} bytes)",
            metadata.len(),
            MAX_CONFIG_FILE_SIZE
        )));
    }

    fs::read_to_string(&canonical_path).map_err(|e| {
        ConfigError::from_io_error(
            &format!("Failed to read configuration file `{}`", display_name(&canonical_path)),
            e,
        )
    })
}

/// Returns the registered parser for the extension of `path`.
///
/// Extensions are matched case-insensitively.
///
/// # Examples
///
/// ```rust
/// use cfgtree::adapters::file::parser_for_path;
/// use cfgtree::ports::ConfigParser;
///
/// assert_eq!(parser_for_path("settings.TOML").unwrap().name(), "TOML");
/// assert_eq!(parser_for_path("app.cfg").unwrap().name(), "libconfig");
/// assert!(parser_for_path("notes.txt").is_err());
/// ```
pub fn parser_for_path<P: AsRef<Path>>(path: P) -> Result<&'static dyn ConfigParser> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    PARSERS
        .iter()
        .find(|p| p.supported_extensions().contains(&extension.as_str()))
        .map(|p| &**p)
        .ok_or_else(|| {
            ConfigError::parse_error(format!(
                "Unsupported configuration file format `{}`: unknown extension `{}`",
                display_name(path),
                extension
            ))
        })
}

/// Reads and parses a file with the parser selected by its extension.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Group> {
    let parser = parser_for_path(&path)?;
    parse_file_with(parser, path)
}

/// Reads a file and parses it with `parser`.
pub fn parse_file_with<P: AsRef<Path>>(parser: &dyn ConfigParser, path: P) -> Result<Group> {
    let path = path.as_ref();
    let content = read_config_file(path)?;
    let group = parser.parse(&content)?;
    debug!(
        "Loaded {} configuration from {} ({} top-level parameters)",
        parser.name(),
        path.display(),
        group.len()
    );
    Ok(group)
}

/// Returns the path of `file_name` in the OS-appropriate configuration
/// directory of an application.
///
/// This method uses the `directories` crate to determine the appropriate
/// configuration directory for the current operating system.
///
/// # Arguments
///
/// * `app_name` - The application name (e.g., "myapp")
/// * `qualifier` - The organization/qualifier (e.g., "com.example")
/// * `file_name` - The configuration file name (e.g., "config.toml")
pub fn default_location(app_name: &str, qualifier: &str, file_name: &str) -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from(qualifier, "", app_name).ok_or_else(|| {
        ConfigError::parse_error("Failed to determine project directories")
    })?;
    Ok(proj_dirs.config_dir().join(file_name))
}
