// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration parser trait definition.
//!
//! This module defines the `ConfigParser` trait, which provides an interface for
//! parsing configuration documents in different formats (TOML, JSON, YAML,
//! libconfig) into a configuration tree.

use crate::domain::{Group, Result};

/// A trait for parsing configuration documents.
///
/// Parsers keep the document's structure: tables/objects/mappings become
/// [`Group`]s (member order preserved), arrays become lists and scalars keep
/// their kind.
///
/// # Examples
///
/// ```rust
/// use cfgtree::domain::{ConfigValue, Group, Result};
/// use cfgtree::ports::ConfigParser;
///
/// struct KeyValueParser;
///
/// impl ConfigParser for KeyValueParser {
///     fn name(&self) -> &str {
///         "key-value"
///     }
///
///     fn parse(&self, content: &str) -> Result<Group> {
///         let mut group = Group::new();
///         for line in content.lines() {
///             if let Some((k, v)) = line.split_once('=') {
///                 group.insert(k.trim(), ConfigValue::from(v.trim()))?;
///             }
///         }
///         Ok(group)
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["kv"]
///     }
/// }
///
/// let group = KeyValueParser.parse("host = localhost").unwrap();
/// assert_eq!(group.get("host"), Some(&ConfigValue::from("localhost")));
/// ```
pub trait ConfigParser: Send + Sync {
    /// Human-readable format name used in log and error messages.
    fn name(&self) -> &str;

    /// Parses a document into its root group.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if the document is malformed or its
    /// top level is not a table/object/mapping.
    fn parse(&self, content: &str) -> Result<Group>;

    /// Returns the file extensions supported by this parser.
    ///
    /// Extensions are given without the leading dot and in lower case.
    fn supported_extensions(&self) -> &[&str];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigValue;

    // Test implementation of ConfigParser for testing purposes
    struct TestParser;

    impl ConfigParser for TestParser {
        fn name(&self) -> &str {
            "test"
        }

        fn parse(&self, _content: &str) -> Result<Group> {
            let mut group = Group::new();
            group.insert("key", ConfigValue::from("value"))?;
            Ok(group)
        }

        fn supported_extensions(&self) -> &[&str] {
            &["test", "tst"]
        }
    }

    #[test]
    fn test_parser_parse() {
        let parser = TestParser;
        let result = parser.parse("dummy content").unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("key"), Some(&ConfigValue::from("value")));
    }

    #[test]
    fn test_parser_supported_extensions() {
        let parser = TestParser;
        assert_eq!(parser.supported_extensions(), &["test", "tst"]);
    }

    #[test]
    fn test_parser_as_trait_object() {
        let parsers: Vec<Box<dyn ConfigParser>> = vec![Box::new(TestParser)];
        assert_eq!(parsers[0].name(), "test");
    }
}
