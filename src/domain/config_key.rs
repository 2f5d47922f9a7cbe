// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fully-qualified parameter names.
//!
//! This module provides the `ConfigKey` type, a newtype around `String` holding a
//! fully-qualified parameter name (FQN) such as `"values.other.arr2[1].int2"`, and
//! the parser that splits such a name into traversal steps.
//!
//! # Key Format
//!
//! - `.` descends into a group member, e.g. `"section1.subgroup.my-bool"`.
//! - `[i]` addresses a list element; negative indices count from the end.
//! - Member names must match `[A-Za-z0-9_-]+`.
//! - The empty key (or a single `"."`) denotes the root group.

use crate::domain::errors::{ConfigError, Result};
use std::fmt;

/// A single traversal step of a parsed key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyStep {
    /// Descend into the named member of a group.
    Name(String),
    /// Select an element of a list (negative values count from the end).
    Index(i64),
}

impl fmt::Display for KeyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStep::Name(name) => write!(f, "{}", name),
            KeyStep::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

/// A type-safe wrapper for fully-qualified parameter names.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::config_key::{ConfigKey, KeyStep};
///
/// let key = ConfigKey::from("values.arr[-1].x");
/// let steps = key.steps().unwrap();
/// assert_eq!(steps, vec![
///     KeyStep::Name("values".to_string()),
///     KeyStep::Name("arr".to_string()),
///     KeyStep::Index(-1),
///     KeyStep::Name("x".to_string()),
/// ]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Creates a new `ConfigKey` from a `String`.
    pub fn new(key: String) -> Self {
        ConfigKey(key)
    }

    /// Returns the key denoting the root group.
    pub fn root() -> Self {
        ConfigKey(String::new())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ConfigKey` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if this key addresses the root group.
    pub fn is_root(&self) -> bool {
        self.0.is_empty() || self.0 == "."
    }

    /// Appends a relative key to this key.
    ///
    /// # Examples
    ///
    /// ```
    /// use cfgtree::domain::config_key::ConfigKey;
    ///
    /// assert_eq!(ConfigKey::from("a.b").join("c").as_str(), "a.b.c");
    /// assert_eq!(ConfigKey::from("a.lst").join("[2]").as_str(), "a.lst[2]");
    /// assert_eq!(ConfigKey::root().join("c").as_str(), "c");
    /// assert_eq!(ConfigKey::from("a").join("").as_str(), "a");
    /// ```
    pub fn join(&self, relative: &str) -> ConfigKey {
        let relative = if relative == "." { "" } else { relative };
        if self.is_root() {
            return ConfigKey(relative.to_string());
        }
        if relative.is_empty() {
            return self.clone();
        }
        if relative.starts_with('[') {
            ConfigKey(format!("{}{}", self.0, relative))
        } else {
            ConfigKey(format!("{}.{}", self.0, relative))
        }
    }

    /// Returns the key of the list element at `index`.
    ///
    /// ```
    /// use cfgtree::domain::config_key::ConfigKey;
    ///
    /// assert_eq!(ConfigKey::from("lst").element(3).as_str(), "lst[3]");
    /// ```
    pub fn element(&self, index: usize) -> ConfigKey {
        ConfigKey(format!("{}[{}]", self.0, index))
    }

    /// Builds a key from already validated steps.
    pub fn from_steps(steps: &[KeyStep]) -> ConfigKey {
        let mut key = String::new();
        for step in steps {
            match step {
                KeyStep::Name(name) => {
                    if !key.is_empty() {
                        key.push('.');
                    }
                    key.push_str(name);
                }
                KeyStep::Index(idx) => key.push_str(&format!("[{}]", idx)),
            }
        }
        ConfigKey(key)
    }

    /// Parses the key into its traversal steps.
    ///
    /// The root key yields an empty step sequence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueError` if the key is malformed, e.g. it
    /// contains empty segments, forbidden characters, or an invalid index.
    pub fn steps(&self) -> Result<Vec<KeyStep>> {
        if self.is_root() {
            return Ok(Vec::new());
        }

        let mut steps = Vec::new();
        for segment in self.0.split('.') {
            let (name, mut rest) = match segment.find('[') {
                Some(pos) => (&segment[..pos], &segment[pos..]),
                None => (segment, ""),
            };
            if !is_valid_name(name) {
                return Err(self.malformed(&format!("invalid segment `{}`", segment)));
            }
            steps.push(KeyStep::Name(name.to_string()));

            while !rest.is_empty() {
                let close = match (rest.starts_with('['), rest.find(']')) {
                    (true, Some(close)) => close,
                    _ => return Err(self.malformed(&format!("invalid segment `{}`", segment))),
                };
                let index = rest[1..close].parse::<i64>().map_err(|_| {
                    self.malformed(&format!("invalid list index `{}`", &rest[1..close]))
                })?;
                steps.push(KeyStep::Index(index));
                rest = &rest[close + 1..];
            }
        }
        Ok(steps)
    }

    fn malformed(&self, detail: &str) -> ConfigError {
        ConfigError::value_error(format!(
            "Invalid parameter name `{}`: {}! Names may only contain alphanumeric \
             characters, `-` and `_`, separated by `.` and optionally followed by `[index]`.",
            self.0, detail
        ))
    }
}

/// Checks whether `name` is a valid member name of a group.
///
/// ```
/// use cfgtree::domain::config_key::is_valid_name;
///
/// assert!(is_valid_name("my-bool_2"));
/// assert!(!is_valid_name("a.b"));
/// assert!(!is_valid_name(""));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl From<String> for ConfigKey {
    fn from(s: String) -> Self {
        ConfigKey(s)
    }
}

impl From<&str> for ConfigKey {
    fn from(s: &str) -> Self {
        ConfigKey(s.to_string())
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> KeyStep {
        KeyStep::Name(s.to_string())
    }

    #[test]
    fn test_config_key_from_str() {
        let key = ConfigKey::from("test.key");
        assert_eq!(key.as_str(), "test.key");
        assert_eq!(format!("{}", key), "test.key");
    }

    #[test]
    fn test_string_from_config_key() {
        let key = ConfigKey::from("test.key");
        let s: String = key.into();
        assert_eq!(s, "test.key");
    }

    #[test]
    fn test_root_keys() {
        assert!(ConfigKey::root().is_root());
        assert!(ConfigKey::from(".").is_root());
        assert!(ConfigKey::from("").steps().unwrap().is_empty());
        assert!(!ConfigKey::from("a").is_root());
    }

    #[test]
    fn test_steps_dotted() {
        let steps = ConfigKey::from("section1.subgroup.my-bool").steps().unwrap();
        assert_eq!(steps, vec![name("section1"), name("subgroup"), name("my-bool")]);
    }

    #[test]
    fn test_steps_with_indices() {
        let steps = ConfigKey::from("values.other.arr2[1].int2").steps().unwrap();
        assert_eq!(
            steps,
            vec![
                name("values"),
                name("other"),
                name("arr2"),
                KeyStep::Index(1),
                name("int2")
            ]
        );
    }

    #[test]
    fn test_steps_nested_indices() {
        let steps = ConfigKey::from("matrix[0][-2]").steps().unwrap();
        assert_eq!(
            steps,
            vec![name("matrix"), KeyStep::Index(0), KeyStep::Index(-2)]
        );
    }

    #[test]
    fn test_malformed_keys() {
        for key in [
            "a..b", "a.", ".a", "a b", "a[", "a[x]", "a[1", "[0]", "a[0]x", "ä", "a.[0]",
        ] {
            let result = ConfigKey::from(key).steps();
            assert!(
                matches!(result, Err(ConfigError::ValueError { .. })),
                "Expected ValueError for `{}`",
                key
            );
        }
    }

    #[test]
    fn test_join() {
        assert_eq!(ConfigKey::from("a").join("b.c").as_str(), "a.b.c");
        assert_eq!(ConfigKey::from("a").join("[0].x").as_str(), "a[0].x");
        assert_eq!(ConfigKey::from("a").join(".").as_str(), "a");
        assert_eq!(ConfigKey::root().join("").as_str(), "");
    }

    #[test]
    fn test_from_steps_round_trip() {
        let key = ConfigKey::from("a.b[3][-1].c");
        let steps = key.steps().unwrap();
        assert_eq!(ConfigKey::from_steps(&steps), key);
    }

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("abc"));
        assert!(is_valid_name("A_b-9"));
        assert!(!is_valid_name("a.b"));
        assert!(!is_valid_name("a[0]"));
        assert!(!is_valid_name("with space"));
    }
}
