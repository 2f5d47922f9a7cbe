// SPDX-License-Identifier: MIT OR Apache-2.0

//! The root configuration handle.

use crate::adapters::dynamic::{group_from_dynamic, group_to_dynamic};
use crate::adapters::file;
use crate::adapters::{JsonFormat, LibconfigFormat, NullValuePolicy, TomlFormat};
use crate::domain::{ConfigKey, Group, Result};
use crate::ports::{ConfigParser, ConfigSerializer, DynamicValue};
use crate::service::access::ParameterAccess;
use crate::service::view::{self, ConfigView};
use std::cell::RefCell;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use tracing::debug;

/// A configuration: one root group of named parameters.
///
/// Parameters are addressed by fully-qualified names such as
/// `"values.other.arr2[1].int2"`, see [`ParameterAccess`] for the accessors.
///
/// Views created with [`Configuration::view`] share the configuration's
/// storage: changes made through a view are visible here and vice versa. Use
/// [`Configuration::copy`] for an independent snapshot. A configuration is
/// single-threaded; it is neither `Send` nor `Sync`.
///
/// # Examples
///
/// ```rust
/// use cfgtree::prelude::*;
///
/// # fn main() -> Result<()> {
/// let config = Configuration::load_toml_str(
///     r#"
/// [values]
/// name = "demo"
/// arr = [1, 2, 3]
/// "#,
/// )?;
///
/// let mut values = config.view("values")?;
/// values.set_boolean("enabled", true)?;
///
/// assert!(config.get_boolean("values.enabled")?);
/// assert_eq!(config.get_integer("values.arr[-1]")?, 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct Configuration {
    root: Rc<RefCell<Group>>,
}

impl Configuration {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration owning `group` as its root.
    pub fn from_group(group: Group) -> Self {
        Self {
            root: Rc::new(RefCell::new(group)),
        }
    }

    /// Creates a configuration from a dynamic mapping.
    ///
    /// # Errors
    ///
    /// `TypeError` if `value` is not a mapping or holds values without a
    /// parameter kind.
    pub fn from_dynamic(value: DynamicValue) -> Result<Self> {
        group_from_dynamic(value, &ConfigKey::root()).map(Self::from_group)
    }

    /// Converts the whole configuration into a dynamic mapping.
    pub fn to_dynamic(&self) -> Result<DynamicValue> {
        self.with_root(group_to_dynamic)
    }

    /// Returns a deep copy of the root group.
    pub fn to_group(&self) -> Group {
        self.with_root(Group::clone)
    }

    /// Returns an independent deep copy of this configuration.
    pub fn copy(&self) -> Self {
        Self::from_group(self.to_group())
    }

    /// Returns a view of the group or list at `key`.
    ///
    /// Negative indices in `key` are resolved when the view is created.
    ///
    /// # Errors
    ///
    /// Lookup errors if `key` does not resolve, `TypeError` if it names a
    /// scalar parameter.
    pub fn view(&self, key: &str) -> Result<ConfigView> {
        view::open(&self.root, &self.fqn(key))
    }

    /// Parses `content` with `parser`.
    pub fn parse_with(parser: &dyn ConfigParser, content: &str) -> Result<Self> {
        let group = parser.parse(content)?;
        debug!(
            "Parsed {} configuration ({} top-level parameters)",
            parser.name(),
            group.len()
        );
        Ok(Self::from_group(group))
    }

    /// Serializes the configuration with `serializer`.
    pub fn serialize_with(&self, serializer: &dyn ConfigSerializer) -> Result<String> {
        self.with_root(|root| serializer.serialize(root))
    }

    /// Loads a configuration file, choosing the format by its extension.
    ///
    /// # Errors
    ///
    /// `ParseError` for unknown extensions, unreadable files and invalid
    /// documents.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        file::parse_file(path).map(Self::from_group)
    }

    /// Loads `file_name` from the OS-appropriate configuration directory of
    /// an application.
    ///
    /// # Arguments
    ///
    /// * `app_name` - The application name (e.g., "myapp")
    /// * `qualifier` - The organization/qualifier (e.g., "com.example")
    /// * `file_name` - The configuration file name (e.g., "config.toml")
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use cfgtree::service::Configuration;
    ///
    /// # fn main() -> cfgtree::domain::Result<()> {
    /// let config = Configuration::load_from_default_location("myapp", "com.example", "config.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from_default_location(
        app_name: &str,
        qualifier: &str,
        file_name: &str,
    ) -> Result<Self> {
        let path = file::default_location(app_name, qualifier, file_name)?;
        Self::load_file(path)
    }

    /// Parses a TOML document.
    pub fn load_toml_str(content: &str) -> Result<Self> {
        Self::parse_with(&TomlFormat::new(), content)
    }

    /// Loads a TOML file.
    pub fn load_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        file::parse_file_with(&TomlFormat::new(), path).map(Self::from_group)
    }

    /// Parses a JSON document, skipping `null` values.
    pub fn load_json_str(content: &str) -> Result<Self> {
        Self::parse_with(&JsonFormat::new(), content)
    }

    /// Parses a JSON document with the given `null` handling.
    pub fn load_json_str_with(content: &str, null_policy: NullValuePolicy) -> Result<Self> {
        Self::parse_with(&JsonFormat::with_null_policy(null_policy), content)
    }

    /// Loads a JSON file, skipping `null` values.
    pub fn load_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        file::parse_file_with(&JsonFormat::new(), path).map(Self::from_group)
    }

    /// Parses a YAML document, skipping `null` values.
    #[cfg(feature = "yaml")]
    pub fn load_yaml_str(content: &str) -> Result<Self> {
        Self::parse_with(&crate::adapters::YamlFormat::new(), content)
    }

    /// Loads a YAML file, skipping `null` values.
    #[cfg(feature = "yaml")]
    pub fn load_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        file::parse_file_with(&crate::adapters::YamlFormat::new(), path).map(Self::from_group)
    }

    /// Parses a libconfig document.
    pub fn load_libconfig_str(content: &str) -> Result<Self> {
        Self::parse_with(&LibconfigFormat::new(), content)
    }

    /// Loads a libconfig file.
    pub fn load_libconfig_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        file::parse_file_with(&LibconfigFormat::new(), path).map(Self::from_group)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        self.serialize_with(&TomlFormat::new())
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        self.serialize_with(&JsonFormat::new())
    }

    /// Serializes to YAML.
    #[cfg(feature = "yaml")]
    pub fn to_yaml_string(&self) -> Result<String> {
        self.serialize_with(&crate::adapters::YamlFormat::new())
    }

    /// Serializes to libconfig.
    pub fn to_libconfig_string(&self) -> Result<String> {
        self.serialize_with(&LibconfigFormat::new())
    }
}

impl ParameterAccess for Configuration {
    fn fqn(&self, key: &str) -> ConfigKey {
        ConfigKey::root().join(key)
    }

    fn with_root<R>(&self, f: impl FnOnce(&Group) -> R) -> R {
        f(&self.root.borrow())
    }

    fn with_root_mut<R>(&mut self, f: impl FnOnce(&mut Group) -> R) -> R {
        f(&mut self.root.borrow_mut())
    }
}

impl From<Group> for Configuration {
    fn from(group: Group) -> Self {
        Self::from_group(group)
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.root, &other.root) || *self.root.borrow() == *other.root.borrow()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.len();
        write!(
            f,
            "Configuration({} parameter{})",
            count,
            if count == 1 { "" } else { "s" }
        )
    }
}
