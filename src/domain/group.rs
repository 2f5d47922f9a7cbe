// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered groups of named parameters.
//!
//! A `Group` keeps its members in insertion order. Configuration groups are
//! usually short, so members are stored in a `Vec` and looked up linearly.

use crate::domain::config_key::{is_valid_name, ConfigKey};
use crate::domain::config_value::ConfigValue;
use crate::domain::errors::{ConfigError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// An ordered mapping from member names to values.
///
/// Equality ignores member order: two groups are equal if they hold the same
/// names with equal values.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::{ConfigValue, Group};
///
/// let mut group = Group::new();
/// group.insert("port", ConfigValue::from(8080)).unwrap();
/// group.insert("host", ConfigValue::from("localhost")).unwrap();
///
/// assert_eq!(group.keys().collect::<Vec<_>>(), vec!["port", "host"]);
/// assert!(group.insert("not.valid", ConfigValue::from(1)).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Group {
    entries: Vec<(String, ConfigValue)>,
}

impl Group {
    /// Creates an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of direct members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the member named `name`.
    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Returns the mutable member named `name`.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ConfigValue> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns `true` if a member named `name` exists.
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Inserts or replaces a member.
    ///
    /// Replacing keeps the member's position. Returns the previous value, if any.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueError` if `name` is not a valid member name.
    pub fn insert(&mut self, name: impl Into<String>, value: ConfigValue) -> Result<Option<ConfigValue>> {
        let name = name.into();
        if !is_valid_name(&name) {
            return Err(ConfigError::value_error(format!(
                "`{}` is not a valid parameter name! Names may only contain \
                 alphanumeric characters, `-` and `_`.",
                name
            )));
        }
        match self.get_mut(&name) {
            Some(existing) => Ok(Some(std::mem::replace(existing, value))),
            None => {
                self.entries.push((name, value));
                Ok(None)
            }
        }
    }

    /// Returns the member named `name`, inserting `default()` first if it is absent.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueError` if a member must be inserted and `name`
    /// is not a valid member name.
    pub fn get_or_insert_with(
        &mut self,
        name: &str,
        default: impl FnOnce() -> ConfigValue,
    ) -> Result<&mut ConfigValue> {
        let pos = match self.entries.iter().position(|(n, _)| n == name) {
            Some(pos) => pos,
            None => {
                self.insert(name, default())?;
                self.entries.len() - 1
            }
        };
        Ok(&mut self.entries[pos].1)
    }

    /// Removes the member named `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<ConfigValue> {
        let pos = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Removes all members.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Member names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Member values in order.
    pub fn values(&self) -> impl Iterator<Item = &ConfigValue> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Mutable `(name, value)` pairs in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ConfigValue)> {
        self.entries.iter_mut().map(|(n, v)| (n.as_str(), v))
    }

    /// Lists the names of this group's parameters, relative to the group.
    ///
    /// Without `recursive` only direct members are listed. With `recursive`
    /// every nested group member is listed too, including members of groups
    /// stored inside lists (e.g. `arr2[1].int2`). List elements themselves
    /// (e.g. `arr2[1]`) are only listed when `include_array_entries` is set.
    ///
    /// ```
    /// use cfgtree::domain::{ConfigValue, Group};
    ///
    /// let mut inner = Group::new();
    /// inner.insert("x", ConfigValue::from(1)).unwrap();
    /// let mut group = Group::new();
    /// group.insert("lst", ConfigValue::List(vec![ConfigValue::Group(inner)])).unwrap();
    ///
    /// assert_eq!(group.parameter_names(false, true), vec!["lst", "lst[0].x"]);
    /// assert_eq!(group.parameter_names(true, true), vec!["lst", "lst[0]", "lst[0].x"]);
    /// assert_eq!(group.parameter_names(true, false), vec!["lst"]);
    /// ```
    pub fn parameter_names(&self, include_array_entries: bool, recursive: bool) -> Vec<String> {
        let mut names = Vec::new();
        collect_group_names(self, &ConfigKey::root(), include_array_entries, recursive, &mut names);
        names.into_iter().map(ConfigKey::into_string).collect()
    }

    /// Visits every leaf (a parameter that is neither a group nor a list),
    /// passing its name relative to this group.
    pub fn visit_leaves<'a>(&'a self, visitor: &mut dyn FnMut(&ConfigKey, &'a ConfigValue)) {
        for (name, value) in &self.entries {
            visit_value_leaves(value, &ConfigKey::from(name.as_str()), visitor);
        }
    }

    /// Visits every leaf mutably, stopping at the first error.
    pub fn visit_leaves_mut(
        &mut self,
        visitor: &mut dyn FnMut(&ConfigKey, &mut ConfigValue) -> Result<()>,
    ) -> Result<()> {
        for (name, value) in &mut self.entries {
            visit_value_leaves_mut(value, &ConfigKey::from(name.as_str()), visitor)?;
        }
        Ok(())
    }
}

fn collect_group_names(
    group: &Group,
    prefix: &ConfigKey,
    include_array_entries: bool,
    recursive: bool,
    names: &mut Vec<ConfigKey>,
) {
    for (name, value) in group.iter() {
        let fqn = prefix.join(name);
        names.push(fqn.clone());
        if recursive {
            collect_nested_names(value, &fqn, include_array_entries, names);
        }
    }
}

fn collect_nested_names(
    value: &ConfigValue,
    fqn: &ConfigKey,
    include_array_entries: bool,
    names: &mut Vec<ConfigKey>,
) {
    match value {
        ConfigValue::Group(group) => {
            collect_group_names(group, fqn, include_array_entries, true, names)
        }
        ConfigValue::List(items) => {
            for (idx, item) in items.iter().enumerate() {
                let element = fqn.element(idx);
                if include_array_entries {
                    names.push(element.clone());
                }
                collect_nested_names(item, &element, include_array_entries, names);
            }
        }
        _ => {}
    }
}

/// Visits every leaf below `value` (or `value` itself if it is a leaf),
/// naming each relative to `fqn`.
pub fn visit_value_leaves<'a>(
    value: &'a ConfigValue,
    fqn: &ConfigKey,
    visitor: &mut dyn FnMut(&ConfigKey, &'a ConfigValue),
) {
    match value {
        ConfigValue::Group(group) => {
            for (name, member) in group.iter() {
                visit_value_leaves(member, &fqn.join(name), visitor);
            }
        }
        ConfigValue::List(items) => {
            for (idx, item) in items.iter().enumerate() {
                visit_value_leaves(item, &fqn.element(idx), visitor);
            }
        }
        leaf => visitor(fqn, leaf),
    }
}

/// Mutable counterpart of [`visit_value_leaves`], stopping at the first error.
pub fn visit_value_leaves_mut(
    value: &mut ConfigValue,
    fqn: &ConfigKey,
    visitor: &mut dyn FnMut(&ConfigKey, &mut ConfigValue) -> Result<()>,
) -> Result<()> {
    match value {
        ConfigValue::Group(group) => {
            for (name, member) in group.iter_mut() {
                let member_fqn = fqn.join(name);
                visit_value_leaves_mut(member, &member_fqn, visitor)?;
            }
            Ok(())
        }
        ConfigValue::List(items) => {
            for (idx, item) in items.iter_mut().enumerate() {
                visit_value_leaves_mut(item, &fqn.element(idx), visitor)?;
            }
            Ok(())
        }
        leaf => visitor(fqn, leaf),
    }
}

impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name).map_or(false, |o| o == value))
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Group {
        let mut other = Group::new();
        other.insert("int2", ConfigValue::from(2)).unwrap();
        other.insert("flt2", ConfigValue::from(2.5)).unwrap();

        let mut values = Group::new();
        values.insert("str", ConfigValue::from("s")).unwrap();
        values
            .insert(
                "arr2",
                ConfigValue::List(vec![ConfigValue::from(1), ConfigValue::Group(other)]),
            )
            .unwrap();

        let mut root = Group::new();
        root.insert("values", ConfigValue::Group(values)).unwrap();
        root.insert("flag", ConfigValue::from(true)).unwrap();
        root
    }

    #[test]
    fn test_insert_keeps_position_on_replace() {
        let mut group = Group::new();
        group.insert("a", ConfigValue::from(1)).unwrap();
        group.insert("b", ConfigValue::from(2)).unwrap();
        let previous = group.insert("a", ConfigValue::from(3)).unwrap();
        assert_eq!(previous, Some(ConfigValue::from(1)));
        assert_eq!(group.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(group.get("a"), Some(&ConfigValue::from(3)));
    }

    #[test]
    fn test_insert_invalid_name() {
        let mut group = Group::new();
        let err = group.insert("a b", ConfigValue::from(1)).unwrap_err();
        assert!(err.is_value_error());
        assert!(group.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut group = sample();
        assert!(group.remove("flag").is_some());
        assert!(group.remove("flag").is_none());
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = Group::new();
        a.insert("x", ConfigValue::from(1)).unwrap();
        a.insert("y", ConfigValue::from("y")).unwrap();
        let mut b = Group::new();
        b.insert("y", ConfigValue::from("y")).unwrap();
        b.insert("x", ConfigValue::from(1)).unwrap();
        assert_eq!(a, b);

        b.insert("x", ConfigValue::from(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_parameter_names_recursive() {
        let names = sample().parameter_names(false, true);
        assert_eq!(
            names,
            vec![
                "values",
                "values.str",
                "values.arr2",
                "values.arr2[1].int2",
                "values.arr2[1].flt2",
                "flag",
            ]
        );
    }

    #[test]
    fn test_parameter_names_with_array_entries() {
        let names = sample().parameter_names(true, true);
        assert!(names.contains(&"values.arr2[0]".to_string()));
        assert!(names.contains(&"values.arr2[1]".to_string()));
        assert!(names.contains(&"values.arr2[1].int2".to_string()));
    }

    #[test]
    fn test_parameter_names_flat() {
        assert_eq!(sample().parameter_names(true, false), vec!["values", "flag"]);
    }

    #[test]
    fn test_visit_leaves() {
        let group = sample();
        let mut seen = Vec::new();
        group.visit_leaves(&mut |fqn, _| seen.push(fqn.to_string()));
        assert_eq!(
            seen,
            vec![
                "values.str",
                "values.arr2[0]",
                "values.arr2[1].int2",
                "values.arr2[1].flt2",
                "flag"
            ]
        );
    }

    #[test]
    fn test_visit_leaves_mut_stops_on_error() {
        let mut group = sample();
        let mut visited = 0;
        let result = group.visit_leaves_mut(&mut |_, _| {
            visited += 1;
            Err(ConfigError::type_error("stop"))
        });
        assert!(result.is_err());
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_serialize_preserves_order() {
        let mut group = Group::new();
        group.insert("b", ConfigValue::from(1)).unwrap();
        group.insert("a", ConfigValue::from(false)).unwrap();
        assert_eq!(serde_json::to_string(&group).unwrap(), r#"{"b":1,"a":false}"#);
    }
}
