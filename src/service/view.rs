// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aliasing views into a configuration.

use crate::domain::resolver::{self, resolve_index};
use crate::domain::{ConfigError, ConfigKey, ConfigType, ConfigValue, Group, Result};
use crate::service::access::ParameterAccess;
use crate::service::configuration::Configuration;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A handle to a group or list inside a configuration.
///
/// A view shares the storage of the configuration it was created from. Keys
/// are relative to the viewed parameter, and changes made through any view
/// (or the configuration itself) are visible through all of them. Cloning a
/// view creates another alias; [`ConfigView::copy`] creates an independent
/// configuration.
///
/// # Examples
///
/// ```rust
/// use cfgtree::prelude::*;
///
/// # fn main() -> Result<()> {
/// let config = Configuration::load_json_str(r#"{"servers": [{"port": 80}, {"port": 443}]}"#)?;
///
/// let servers = config.view("servers")?;
/// let mut last = servers.element(-1)?;
/// assert_eq!(last.prefix().as_str(), "servers[1]");
///
/// last.set_integer("port", 8443)?;
/// assert_eq!(config.get_integer("servers[1].port")?, 8443);
/// assert_eq!(servers.get_integer("[1].port")?, 8443);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct ConfigView {
    root: Rc<RefCell<Group>>,
    prefix: ConfigKey,
}

// Creates a view of the group or list at `fqn`.
pub(crate) fn open(root: &Rc<RefCell<Group>>, fqn: &ConfigKey) -> Result<ConfigView> {
    let prefix = {
        let group = root.borrow();
        let prefix = resolver::canonical_key(&group, fqn)?;
        let kind = resolver::resolve(&group, &prefix)?.config_type();
        if kind.is_scalar() {
            return Err(ConfigError::type_error(format!(
                "Cannot create a view of `{}`: it is a `{}`, not a group or list!",
                fqn, kind
            )));
        }
        prefix
    };
    Ok(ConfigView {
        root: Rc::clone(root),
        prefix,
    })
}

impl ConfigView {
    /// Key of the viewed parameter, relative to the configuration root.
    pub fn prefix(&self) -> &ConfigKey {
        &self.prefix
    }

    /// Kind of the viewed parameter (`Group` or `List`).
    pub fn kind(&self) -> Result<ConfigType> {
        self.parameter_type("")
    }

    /// Returns a view of the group or list at `key`, relative to this view.
    pub fn view(&self, key: &str) -> Result<ConfigView> {
        open(&self.root, &self.fqn(key))
    }

    /// Returns a view of element `index` of a list view.
    ///
    /// Negative indices count from the end.
    ///
    /// # Errors
    ///
    /// `TypeError` if this view is not a list or the element is a scalar,
    /// `IndexError` if `index` is out of range.
    pub fn element(&self, index: i64) -> Result<ConfigView> {
        let element = {
            let group = self.root.borrow();
            let node = resolver::resolve(&group, &self.prefix)?;
            let items = node.as_list().ok_or_else(|| {
                ConfigError::type_error(format!(
                    "Parameter `{}` is a `{}`, not a `list`!",
                    self.prefix,
                    node.config_type()
                ))
            })?;
            self.prefix
                .element(resolve_index(index, items.len(), &self.prefix)?)
        };
        open(&self.root, &element)
    }

    /// Returns an independent configuration holding a deep copy of the
    /// viewed group.
    ///
    /// # Errors
    ///
    /// `TypeError` for list views.
    pub fn copy(&self) -> Result<Configuration> {
        let group = self.get_group("").map_err(|e| {
            if e.is_type_error() {
                ConfigError::type_error(format!(
                    "Cannot copy `{}`: only group views can be copied!",
                    self.prefix
                ))
            } else {
                e
            }
        })?;
        Ok(Configuration::from_group(group))
    }

    fn snapshot(&self) -> Option<ConfigValue> {
        self.with_root(|root| {
            resolver::resolve(root, &self.prefix)
                .ok()
                .map(|node| node.to_value())
        })
    }
}

impl ParameterAccess for ConfigView {
    fn fqn(&self, key: &str) -> ConfigKey {
        self.prefix.join(key)
    }

    fn with_root<R>(&self, f: impl FnOnce(&Group) -> R) -> R {
        f(&self.root.borrow())
    }

    fn with_root_mut<R>(&mut self, f: impl FnOnce(&mut Group) -> R) -> R {
        f(&mut self.root.borrow_mut())
    }
}

impl PartialEq for ConfigView {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl fmt::Display for ConfigView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.len();
        write!(
            f,
            "ConfigView(`{}`, {} parameter{})",
            self.prefix,
            count,
            if count == 1 { "" } else { "s" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::DynamicValue;

    fn sample() -> Configuration {
        Configuration::load_json_str(
            r#"{
                "values": {"name": "x", "arr": [1, 2], "other": [{"int2": 2}, [3, 4]]},
                "top": true
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_view_aliases_configuration() {
        let config = sample();
        let mut view = config.view("values").unwrap();
        view.set_string("name", "y").unwrap();
        assert_eq!(config.get_string("values.name").unwrap(), "y");

        let alias = view.clone();
        view.set_integer("added", 1).unwrap();
        assert_eq!(alias.get_integer("added").unwrap(), 1);
    }

    #[test]
    fn test_view_keys_are_relative() {
        let config = sample();
        let view = config.view("values").unwrap();
        assert_eq!(view.keys().unwrap(), vec!["name", "arr", "other"]);
        assert_eq!(view.get_integer("other[0].int2").unwrap(), 2);
        assert_eq!(view.len(), 3);
        let err = view.get_integer("missing").unwrap_err();
        assert!(err.to_string().contains("`values.missing`"));
    }

    #[test]
    fn test_list_view() {
        let config = sample();
        let view = config.view("values.arr").unwrap();
        assert_eq!(view.kind().unwrap(), ConfigType::List);
        assert_eq!(view.len(), 2);
        assert_eq!(view.get_integer("[-1]").unwrap(), 2);
        assert_eq!(view.values().unwrap(), vec![ConfigValue::from(1), ConfigValue::from(2)]);
        assert!(view.copy().unwrap_err().is_type_error());
        assert!(view.keys().unwrap_err().is_type_error());
    }

    #[test]
    fn test_nested_views_and_elements() {
        let config = sample();
        let other = config.view("values").unwrap().view("other").unwrap();
        let first = other.element(0).unwrap();
        assert_eq!(first.prefix().as_str(), "values.other[0]");
        assert_eq!(first.get_integer("int2").unwrap(), 2);

        let nested = other.element(-1).unwrap();
        assert_eq!(nested.prefix().as_str(), "values.other[1]");
        assert_eq!(nested.kind().unwrap(), ConfigType::List);

        assert!(nested.element(0).unwrap_err().is_type_error());
        assert!(other.element(2).unwrap_err().is_index_error());
        assert!(first.element(0).unwrap_err().is_type_error());
    }

    #[test]
    fn test_view_prefix_is_canonical() {
        let mut config = sample();
        let view = config.view("values.other[-1]").unwrap();
        config
            .append("values.other", DynamicValue::mapping([("late", DynamicValue::Int(0))]))
            .unwrap();
        assert_eq!(view.prefix().as_str(), "values.other[1]");
        assert_eq!(view.get_integer("[0]").unwrap(), 3);
    }

    #[test]
    fn test_view_copy_is_independent() {
        let config = sample();
        let view = config.view("values").unwrap();
        let mut copy = view.copy().unwrap();
        copy.set_string("name", "changed").unwrap();
        assert_eq!(view.get_string("name").unwrap(), "x");
        assert_eq!(copy.len(), 3);
    }

    #[test]
    fn test_view_of_deleted_parameter() {
        let mut config = sample();
        let view = config.view("values").unwrap();
        config.delete("values").unwrap();
        assert_eq!(view.len(), 0);
        assert!(view.get_string("name").unwrap_err().is_key_not_found());
    }

    #[test]
    fn test_view_equality_and_display() {
        let config = sample();
        let a = config.view("values").unwrap();
        let b = config.copy().view("values").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "ConfigView(`values`, 3 parameters)");
    }
}
