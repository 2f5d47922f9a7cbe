// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed parameter access.
//!
//! [`ParameterAccess`] is the interface shared by [`Configuration`] and
//! [`ConfigView`]. Every key passed to its methods is relative to the handle:
//! the root of a configuration, or the parameter a view was created for.
//!
//! [`Configuration`]: crate::service::Configuration
//! [`ConfigView`]: crate::service::ConfigView

use crate::adapters::dynamic::{element_from_dynamic, from_dynamic, group_from_dynamic, to_dynamic};
use crate::adapters::file;
use crate::domain::casts::Numeric;
use crate::domain::group::{visit_value_leaves_mut, Group};
use crate::domain::matcher::matches_any;
use crate::domain::resolver::{self, NodeMut, Slot};
use crate::domain::{
    ConfigError, ConfigKey, ConfigType, ConfigValue, Date, DateTime, Result, ScalarType, Time,
};
use crate::ports::DynamicValue;
use std::path::Path;
use tracing::debug;

/// Read and write access to the parameters below a handle.
///
/// Implementors only provide key qualification and access to the root group;
/// all accessors are provided methods.
///
/// # Examples
///
/// ```rust
/// use cfgtree::prelude::*;
///
/// # fn main() -> Result<()> {
/// let mut config = Configuration::load_toml_str("[server]\nport = 8080\n")?;
///
/// assert_eq!(config.get_integer("server.port")?, 8080);
/// assert_eq!(config.get_integer_or("server.workers", 4)?, 4);
///
/// config.set_integer("server.port", 9090)?;
/// assert!(config.set_string("server.port", "high").unwrap_err().is_type_error());
/// # Ok(())
/// # }
/// ```
pub trait ParameterAccess {
    /// Qualifies a key relative to this handle.
    fn fqn(&self, key: &str) -> ConfigKey;

    /// Runs `f` with shared access to the root group.
    fn with_root<R>(&self, f: impl FnOnce(&Group) -> R) -> R;

    /// Runs `f` with exclusive access to the root group.
    fn with_root_mut<R>(&mut self, f: impl FnOnce(&mut Group) -> R) -> R;

    /// Returns `true` if `key` names an existing parameter.
    ///
    /// Malformed keys and out-of-range indices are reported as absent.
    fn contains(&self, key: &str) -> bool {
        let fqn = self.fqn(key);
        self.with_root(|root| resolver::contains(root, &fqn))
    }

    /// Kind of the parameter at `key`.
    fn parameter_type(&self, key: &str) -> Result<ConfigType> {
        let fqn = self.fqn(key);
        self.with_root(|root| resolver::resolve(root, &fqn).map(|node| node.config_type()))
    }

    /// Number of members (groups), elements (lists), or 1 for scalars.
    fn parameter_len(&self, key: &str) -> Result<usize> {
        let fqn = self.fqn(key);
        self.with_root(|root| resolver::resolve(root, &fqn).map(|node| node.len()))
    }

    /// Number of direct children of this handle, 0 if it no longer resolves.
    fn len(&self) -> usize {
        self.parameter_len("").unwrap_or(0)
    }

    /// Returns `true` if this handle has no children.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a scalar parameter of the kind `T` is stored as.
    ///
    /// # Errors
    ///
    /// `KeyNotFound`/`IndexError` if the parameter does not exist and
    /// `TypeError` if it has another kind.
    fn get<T: ScalarType>(&self, key: &str) -> Result<T> {
        let fqn = self.fqn(key);
        self.with_root(|root| {
            let node = resolver::resolve(root, &fqn)?;
            node.as_value()
                .and_then(T::from_value)
                .ok_or_else(|| wrong_kind(&fqn, node.config_type(), T::KIND))
        })
    }

    /// Reads a scalar parameter, returning `default` if it does not exist.
    ///
    /// Only absence is defaulted; a parameter of another kind is still a
    /// `TypeError`.
    fn get_or<T: ScalarType>(&self, key: &str, default: T) -> Result<T> {
        match self.get(key) {
            Err(e) if e.is_key_not_found() || e.is_index_error() => Ok(default),
            other => other,
        }
    }

    /// Writes a scalar parameter, creating it (and missing parent groups) if needed.
    ///
    /// # Errors
    ///
    /// `TypeError` if the parameter exists with another kind or a parent is
    /// not a group.
    fn set<T: ScalarType>(&mut self, key: &str, value: T) -> Result<()> {
        let fqn = self.fqn(key);
        self.with_root_mut(|root| store(root, &fqn, value.into_value(), false))
    }

    /// Reads a `Boolean` parameter.
    fn get_boolean(&self, key: &str) -> Result<bool> {
        self.get(key)
    }

    /// Reads an `Integer` parameter.
    fn get_integer(&self, key: &str) -> Result<i64> {
        self.get(key)
    }

    /// Reads a `FloatingPoint` parameter.
    fn get_float(&self, key: &str) -> Result<f64> {
        self.get(key)
    }

    /// Reads a `String` parameter.
    fn get_string(&self, key: &str) -> Result<String> {
        self.get(key)
    }

    /// Reads a `Date` parameter.
    fn get_date(&self, key: &str) -> Result<Date> {
        self.get(key)
    }

    /// Reads a `Time` parameter.
    fn get_time(&self, key: &str) -> Result<Time> {
        self.get(key)
    }

    /// Reads a `DateTime` parameter.
    fn get_datetime(&self, key: &str) -> Result<DateTime> {
        self.get(key)
    }

    /// Reads a `Boolean` parameter or returns `default`.
    fn get_boolean_or(&self, key: &str, default: bool) -> Result<bool> {
        self.get_or(key, default)
    }

    /// Reads an `Integer` parameter or returns `default`.
    fn get_integer_or(&self, key: &str, default: i64) -> Result<i64> {
        self.get_or(key, default)
    }

    /// Reads a `FloatingPoint` parameter or returns `default`.
    fn get_float_or(&self, key: &str, default: f64) -> Result<f64> {
        self.get_or(key, default)
    }

    /// Reads a `String` parameter or returns `default`.
    fn get_string_or(&self, key: &str, default: &str) -> Result<String> {
        self.get_or(key, default.to_string())
    }

    /// Reads a `Date` parameter or returns `default`.
    fn get_date_or(&self, key: &str, default: Date) -> Result<Date> {
        self.get_or(key, default)
    }

    /// Reads a `Time` parameter or returns `default`.
    fn get_time_or(&self, key: &str, default: Time) -> Result<Time> {
        self.get_or(key, default)
    }

    /// Reads a `DateTime` parameter or returns `default`.
    fn get_datetime_or(&self, key: &str, default: DateTime) -> Result<DateTime> {
        self.get_or(key, default)
    }

    /// Writes a `Boolean` parameter.
    fn set_boolean(&mut self, key: &str, value: bool) -> Result<()> {
        self.set(key, value)
    }

    /// Writes an `Integer` parameter.
    fn set_integer(&mut self, key: &str, value: i64) -> Result<()> {
        self.set(key, value)
    }

    /// Writes a `FloatingPoint` parameter.
    fn set_float(&mut self, key: &str, value: f64) -> Result<()> {
        self.set(key, value)
    }

    /// Writes a `String` parameter.
    fn set_string(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.set(key, value.into())
    }

    /// Writes a `Date` parameter.
    fn set_date(&mut self, key: &str, value: Date) -> Result<()> {
        self.set(key, value)
    }

    /// Writes a `Time` parameter.
    fn set_time(&mut self, key: &str, value: Time) -> Result<()> {
        self.set(key, value)
    }

    /// Writes a `DateTime` parameter.
    fn set_datetime(&mut self, key: &str, value: DateTime) -> Result<()> {
        self.set(key, value)
    }

    /// Reads a numeric parameter as any primitive number type.
    ///
    /// # Errors
    ///
    /// `TypeError` if the parameter is not numeric, `ValueError` if its value
    /// is not exactly representable as `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfgtree::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let config = Configuration::load_toml_str("small = 200\nbig = 300\nhalf = 0.5")?;
    /// assert_eq!(config.get_numeric::<u8>("small")?, 200);
    /// assert!(config.get_numeric::<u8>("big").unwrap_err().is_value_error());
    /// assert!(config.get_numeric::<i32>("half").unwrap_err().is_value_error());
    /// assert_eq!(config.get_numeric::<f32>("half")?, 0.5);
    /// # Ok(())
    /// # }
    /// ```
    fn get_numeric<T: Numeric>(&self, key: &str) -> Result<T> {
        let fqn = self.fqn(key);
        self.with_root(|root| {
            let node = resolver::resolve(root, &fqn)?;
            match node.as_value() {
                Some(ConfigValue::Integer(i)) => {
                    T::from_integer(*i).ok_or_else(|| lossy_cast(&fqn, i, T::NAME))
                }
                Some(ConfigValue::FloatingPoint(f)) => {
                    T::from_float(*f).ok_or_else(|| lossy_cast(&fqn, f, T::NAME))
                }
                _ => Err(ConfigError::type_error(format!(
                    "Parameter `{}` is a `{}`, not a number!",
                    fqn,
                    node.config_type()
                ))),
            }
        })
    }

    /// Reads any parameter (or this whole handle with `""`) as a dynamic value.
    fn get_value(&self, key: &str) -> Result<DynamicValue> {
        let fqn = self.fqn(key);
        let value = self.with_root(|root| resolver::resolve(root, &fqn).map(|node| node.to_value()))?;
        to_dynamic(&value)
    }

    /// Writes any parameter from a dynamic value.
    ///
    /// An existing parameter keeps its kind: numbers are converted between
    /// `Integer` and `FloatingPoint` if this is exact, lists and groups are
    /// replaced as a whole. Writing a mapping to the root key replaces the
    /// whole root group.
    ///
    /// # Errors
    ///
    /// - `TypeError` if the value has no parameter kind or would change the
    ///   kind of an existing parameter
    /// - `ValueError` if a numeric conversion would lose information
    fn set_value(&mut self, key: &str, value: DynamicValue) -> Result<()> {
        let fqn = self.fqn(key);
        if fqn.is_root() {
            let group = group_from_dynamic(value, &fqn)?;
            return self.with_root_mut(|root| replace_root(root, group));
        }
        let value = from_dynamic(value, &fqn)?;
        self.with_root_mut(|root| store(root, &fqn, value, true))
    }

    /// Returns a deep copy of the group at `key`.
    fn get_group(&self, key: &str) -> Result<Group> {
        let fqn = self.fqn(key);
        self.with_root(|root| {
            let node = resolver::resolve(root, &fqn)?;
            node.as_group()
                .cloned()
                .ok_or_else(|| wrong_kind(&fqn, node.config_type(), ConfigType::Group))
        })
    }

    /// Writes a group parameter, replacing an existing group (or the root).
    fn set_group(&mut self, key: &str, group: Group) -> Result<()> {
        let fqn = self.fqn(key);
        self.with_root_mut(|root| {
            if fqn.is_root() {
                replace_root(root, group)
            } else {
                store(root, &fqn, ConfigValue::Group(group), false)
            }
        })
    }

    /// Returns a deep copy of the list elements at `key`.
    fn get_list(&self, key: &str) -> Result<Vec<ConfigValue>> {
        let fqn = self.fqn(key);
        self.with_root(|root| {
            let node = resolver::resolve(root, &fqn)?;
            node.as_list()
                .map(<[ConfigValue]>::to_vec)
                .ok_or_else(|| wrong_kind(&fqn, node.config_type(), ConfigType::List))
        })
    }

    /// Writes a list parameter, replacing an existing list.
    ///
    /// Every element is converted before anything is written.
    ///
    /// ```rust
    /// use cfgtree::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let mut config = Configuration::new();
    /// config.set_list("arr", [1, 2, 3])?;
    /// assert_eq!(config.get_integer("arr[-1]")?, 3);
    ///
    /// let err = config.set_list("arr", [DynamicValue::Int(1), DynamicValue::Null]).unwrap_err();
    /// assert!(err.is_type_error());
    /// assert_eq!(config.parameter_len("arr")?, 3);
    /// # Ok(())
    /// # }
    /// ```
    fn set_list<I, V>(&mut self, key: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<DynamicValue>,
    {
        let fqn = self.fqn(key);
        let items = values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| element_from_dynamic(value.into(), &fqn, idx))
            .collect::<Result<Vec<_>>>()?;
        self.with_root_mut(|root| store(root, &fqn, ConfigValue::List(items), false))
    }

    /// Appends an element to the list at `key`, creating the list if the
    /// parameter does not exist yet.
    fn append(&mut self, key: &str, value: impl Into<DynamicValue>) -> Result<()> {
        let fqn = self.fqn(key);
        let index = self.with_root(|root| resolver::resolve(root, &fqn).map_or(0, |node| node.len()));
        let item = element_from_dynamic(value.into(), &fqn, index)?;
        self.with_root_mut(|root| match resolver::slot(root, &fqn)? {
            Slot::Occupied(ConfigValue::List(items)) => {
                items.push(item);
                Ok(())
            }
            Slot::Occupied(other) => Err(wrong_kind(&fqn, other.config_type(), ConfigType::List)),
            Slot::Vacant { parent, name } => {
                parent.insert(name, ConfigValue::List(vec![item]))?;
                Ok(())
            }
        })
    }

    /// Removes all members or elements of the group or list at `key`.
    fn clear(&mut self, key: &str) -> Result<()> {
        let fqn = self.fqn(key);
        self.with_root_mut(|root| {
            let node = resolver::resolve_mut(root, &fqn)?;
            match node.config_type() {
                ConfigType::Group => node.into_group().map(Group::clear),
                ConfigType::List => node.into_list().map(Vec::clear),
                other => {
                    return Err(ConfigError::type_error(format!(
                        "Cannot clear `{}`: it is a `{}`, not a group or list!",
                        fqn, other
                    )))
                }
            };
            Ok(())
        })
    }

    /// Deletes the parameter at `key`.
    ///
    /// # Errors
    ///
    /// `KeyNotFound` if it does not exist, `TypeError` for the root key and
    /// for list elements.
    fn delete(&mut self, key: &str) -> Result<()> {
        let fqn = self.fqn(key);
        self.with_root_mut(|root| resolver::remove(root, &fqn)).map(|_| ())
    }

    /// Names of the direct members of this handle.
    fn keys(&self) -> Result<Vec<String>> {
        self.list_parameter_names("", false, false)
    }

    /// Direct members (groups) or elements (lists) of this handle.
    fn values(&self) -> Result<Vec<ConfigValue>> {
        let fqn = self.fqn("");
        self.with_root(|root| {
            let node = resolver::resolve(root, &fqn)?;
            if let Some(group) = node.as_group() {
                Ok(group.values().cloned().collect())
            } else if let Some(items) = node.as_list() {
                Ok(items.to_vec())
            } else {
                Err(wrong_kind(&fqn, node.config_type(), ConfigType::Group))
            }
        })
    }

    /// `(name, value)` pairs of the direct members of this handle.
    fn items(&self) -> Result<Vec<(String, ConfigValue)>> {
        let group = self.get_group("")?;
        Ok(group
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect())
    }

    /// Lists parameter names below the group at `key`, relative to it.
    ///
    /// See [`Group::parameter_names`] for the meaning of the flags.
    fn list_parameter_names(
        &self,
        key: &str,
        include_array_entries: bool,
        recursive: bool,
    ) -> Result<Vec<String>> {
        let fqn = self.fqn(key);
        self.with_root(|root| {
            let node = resolver::resolve(root, &fqn)?;
            node.as_group()
                .map(|group| group.parameter_names(include_array_entries, recursive))
                .ok_or_else(|| wrong_kind(&fqn, node.config_type(), ConfigType::Group))
        })
    }

    /// Replaces placeholders in every string parameter below `key`.
    ///
    /// Replacements are applied in order to each string, so a later search
    /// string also matches text produced by an earlier replacement. Returns
    /// `true` if any parameter changed.
    ///
    /// # Errors
    ///
    /// `ValueError` if a search string is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfgtree::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let mut config = Configuration::load_toml_str("path = '$HOME/data'\nn = 3")?;
    /// assert!(config.replace_placeholders("", &[("$HOME", "/home/me")])?);
    /// assert_eq!(config.get_string("path")?, "/home/me/data");
    /// assert!(!config.replace_placeholders("", &[("$HOME", "/root")])?);
    /// # Ok(())
    /// # }
    /// ```
    fn replace_placeholders<S, R>(&mut self, key: &str, replacements: &[(S, R)]) -> Result<bool>
    where
        S: AsRef<str>,
        R: AsRef<str>,
    {
        if replacements.iter().any(|(search, _)| search.as_ref().is_empty()) {
            return Err(ConfigError::value_error(
                "Placeholder search strings must not be empty!",
            ));
        }
        let fqn = self.fqn(key);
        let mut replaced = 0usize;
        self.with_root_mut(|root| {
            let node = resolver::resolve_mut(root, &fqn)?;
            visit_node_leaves_mut(node, &mut |_, value| {
                if let ConfigValue::String(text) = value {
                    let mut changed = false;
                    for (search, replacement) in replacements {
                        if text.contains(search.as_ref()) {
                            *text = text.replace(search.as_ref(), replacement.as_ref());
                            changed = true;
                        }
                    }
                    replaced += usize::from(changed);
                }
                Ok(())
            })
        })?;
        debug!("Replaced placeholders in {} parameter(s) below `{}`", replaced, fqn);
        Ok(replaced > 0)
    }

    /// Turns relative paths into absolute ones.
    ///
    /// Every leaf below the group at `key` whose name (relative to `key`)
    /// matches one of the `*` wildcard `patterns` must be a string. Relative
    /// paths are prefixed with `base_path`; absolute and empty strings are
    /// left alone. Returns `true` if any parameter changed.
    ///
    /// # Errors
    ///
    /// `TypeError` if a matching parameter is not a string; nothing is
    /// modified in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfgtree::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let mut config = Configuration::load_toml_str(
    ///     "[files]\nlog_path = 'logs/app.log'\ndata_path = '/srv/data'\nname = 'x'",
    /// )?;
    /// assert!(config.adjust_relative_paths("files", "/opt/app", &["*_path"])?);
    /// assert_eq!(config.get_string("files.log_path")?, "/opt/app/logs/app.log");
    /// assert_eq!(config.get_string("files.data_path")?, "/srv/data");
    /// # Ok(())
    /// # }
    /// ```
    fn adjust_relative_paths<P, S>(&mut self, key: &str, base_path: P, patterns: &[S]) -> Result<bool>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let fqn = self.fqn(key);
        let base = base_path.as_ref();
        let mut adjusted = 0usize;
        self.with_root_mut(|root| {
            let node = resolver::resolve_mut(root, &fqn)?;
            let actual = node.config_type();
            let group = node
                .into_group()
                .ok_or_else(|| wrong_kind(&fqn, actual, ConfigType::Group))?;

            let mut mismatch = None;
            group.visit_leaves(&mut |name, value| {
                if mismatch.is_none() && matches_any(patterns, name.as_str()) && value.as_str().is_none() {
                    mismatch = Some(wrong_kind(&fqn.join(name.as_str()), value.config_type(), ConfigType::String));
                }
            });
            if let Some(err) = mismatch {
                return Err(err);
            }

            group.visit_leaves_mut(&mut |name, value| {
                if !matches_any(patterns, name.as_str()) {
                    return Ok(());
                }
                if let ConfigValue::String(path) = value {
                    if !path.is_empty() && Path::new(path.as_str()).is_relative() {
                        let joined = base.join(path.as_str());
                        *path = joined
                            .to_str()
                            .ok_or_else(|| {
                                ConfigError::value_error(format!(
                                    "Adjusted path for `{}` is not valid UTF-8!",
                                    fqn.join(name.as_str())
                                ))
                            })?
                            .to_string();
                        adjusted += 1;
                    }
                }
                Ok(())
            })
        })?;
        debug!("Adjusted {} relative path(s) below `{}`", adjusted, fqn);
        Ok(adjusted > 0)
    }

    /// Replaces the string parameter at `key` by the configuration loaded
    /// from the file it names.
    ///
    /// The file format is chosen by extension.
    ///
    /// # Errors
    ///
    /// `TypeError` if the parameter is not a string, `ParseError` if the file
    /// cannot be read or parsed. The parameter is unchanged on error.
    fn load_nested(&mut self, key: &str) -> Result<()> {
        let path = self.get_string(key)?;
        let group = file::parse_file(&path)?;
        let fqn = self.fqn(key);
        debug!("Loaded nested configuration for `{}` from {}", fqn, path);
        self.with_root_mut(|root| match resolver::slot(root, &fqn)? {
            Slot::Occupied(value) => {
                *value = ConfigValue::Group(group);
                Ok(())
            }
            Slot::Vacant { .. } => Err(ConfigError::key_not_found(fqn.as_str(), Vec::new())),
        })
    }
}

fn wrong_kind(fqn: &ConfigKey, actual: ConfigType, expected: ConfigType) -> ConfigError {
    ConfigError::type_error(format!(
        "Parameter `{}` is a `{}`, not a `{}`!",
        fqn, actual, expected
    ))
}

fn lossy_cast(fqn: &ConfigKey, value: impl std::fmt::Display, target: &str) -> ConfigError {
    ConfigError::value_error(format!(
        "Value {} of parameter `{}` cannot be represented exactly as `{}`!",
        value, fqn, target
    ))
}

fn replace_root(root: &mut Group, group: Group) -> Result<()> {
    *root = group;
    Ok(())
}

// Writes `value` at `fqn`. An existing parameter keeps its kind; with
// `coerce_numbers`, Integer and FloatingPoint values are converted exactly.
fn store(root: &mut Group, fqn: &ConfigKey, value: ConfigValue, coerce_numbers: bool) -> Result<()> {
    match resolver::slot(root, fqn)? {
        Slot::Vacant { parent, name } => {
            parent.insert(name, value)?;
        }
        Slot::Occupied(existing) => {
            *existing = keep_kind(fqn, existing.config_type(), value, coerce_numbers)?;
        }
    }
    Ok(())
}

fn keep_kind(
    fqn: &ConfigKey,
    kind: ConfigType,
    value: ConfigValue,
    coerce_numbers: bool,
) -> Result<ConfigValue> {
    if value.config_type() == kind {
        return Ok(value);
    }
    match (kind, value) {
        (ConfigType::Integer, ConfigValue::FloatingPoint(f)) if coerce_numbers => i64::from_float(f)
            .map(ConfigValue::Integer)
            .ok_or_else(|| lossy_cast(fqn, f, "integer")),
        (ConfigType::FloatingPoint, ConfigValue::Integer(i)) if coerce_numbers => f64::from_integer(i)
            .map(ConfigValue::FloatingPoint)
            .ok_or_else(|| lossy_cast(fqn, i, "floating_point")),
        (kind, value) => Err(ConfigError::type_error(format!(
            "Cannot change the type of parameter `{}` from `{}` to `{}`!",
            fqn,
            kind,
            value.config_type()
        ))),
    }
}

fn visit_node_leaves_mut(
    node: NodeMut<'_>,
    visitor: &mut dyn FnMut(&ConfigKey, &mut ConfigValue) -> Result<()>,
) -> Result<()> {
    match node {
        NodeMut::Root(group) => group.visit_leaves_mut(visitor),
        NodeMut::Value(value) => visit_value_leaves_mut(value, &ConfigKey::root(), visitor),
    }
}
