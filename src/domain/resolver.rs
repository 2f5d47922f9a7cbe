// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key path resolution.
//!
//! Resolves fully-qualified parameter names against a root group. Reads go
//! through [`resolve`]; writes first locate a [`Slot`] for the target, which
//! creates missing parent groups along `Name` steps. Lists are never created
//! implicitly: every `Index` step must address an existing element.
//!
//! Error mapping:
//!
//! - a missing member, or a member name applied to a non-group, is `KeyNotFound`
//!   on reads (with "did you mean" suggestions)
//! - an index applied to a non-list is `TypeError`
//! - an index outside the list is `IndexError`
//! - creating a member below a non-group parameter is `TypeError`

use crate::domain::config_key::{ConfigKey, KeyStep};
use crate::domain::config_value::{ConfigType, ConfigValue};
use crate::domain::errors::{ConfigError, Result};
use crate::domain::group::Group;

/// A resolved node: either the root group or a value inside the tree.
#[derive(Clone, Copy, Debug)]
pub enum Node<'a> {
    /// The root group (addressed by the empty key)
    Root(&'a Group),
    /// A parameter inside the tree
    Value(&'a ConfigValue),
}

impl<'a> Node<'a> {
    /// Kind of the node; the root is always a `Group`.
    pub fn config_type(&self) -> ConfigType {
        match self {
            Node::Root(_) => ConfigType::Group,
            Node::Value(v) => v.config_type(),
        }
    }

    /// Returns the group, if the node is one.
    pub fn as_group(&self) -> Option<&'a Group> {
        match *self {
            Node::Root(g) => Some(g),
            Node::Value(v) => v.as_group(),
        }
    }

    /// Returns the list elements, if the node is a list.
    pub fn as_list(&self) -> Option<&'a [ConfigValue]> {
        match *self {
            Node::Root(_) => None,
            Node::Value(v) => v.as_list(),
        }
    }

    /// Returns the parameter value, `None` for the root.
    pub fn as_value(&self) -> Option<&'a ConfigValue> {
        match *self {
            Node::Root(_) => None,
            Node::Value(v) => Some(v),
        }
    }

    /// Number of direct children (1 for scalars).
    pub fn len(&self) -> usize {
        match self {
            Node::Root(g) => g.len(),
            Node::Value(v) => v.len(),
        }
    }

    /// Returns `true` for an empty group or list.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deep copy of the node as a value.
    pub fn to_value(&self) -> ConfigValue {
        match self {
            Node::Root(g) => ConfigValue::Group((*g).clone()),
            Node::Value(v) => (*v).clone(),
        }
    }
}

/// A mutably resolved node.
#[derive(Debug)]
pub enum NodeMut<'a> {
    /// The root group
    Root(&'a mut Group),
    /// A parameter inside the tree
    Value(&'a mut ConfigValue),
}

impl<'a> NodeMut<'a> {
    /// Kind of the node; the root is always a `Group`.
    pub fn config_type(&self) -> ConfigType {
        match self {
            NodeMut::Root(_) => ConfigType::Group,
            NodeMut::Value(v) => v.config_type(),
        }
    }

    /// Converts into the mutable group, if the node is one.
    pub fn into_group(self) -> Option<&'a mut Group> {
        match self {
            NodeMut::Root(g) => Some(g),
            NodeMut::Value(v) => v.as_group_mut(),
        }
    }

    /// Converts into the mutable list, if the node is one.
    pub fn into_list(self) -> Option<&'a mut Vec<ConfigValue>> {
        match self {
            NodeMut::Root(_) => None,
            NodeMut::Value(v) => v.as_list_mut(),
        }
    }
}

/// Write target located by [`slot`].
#[derive(Debug)]
pub enum Slot<'a> {
    /// The parameter exists.
    Occupied(&'a mut ConfigValue),
    /// The parameter does not exist yet; it will become member `name` of `parent`.
    Vacant {
        /// The (possibly just created) parent group
        parent: &'a mut Group,
        /// Name of the new member
        name: String,
    },
}

/// Converts a possibly negative index into a position within `len` elements.
///
/// ```
/// use cfgtree::domain::config_key::ConfigKey;
/// use cfgtree::domain::resolver::resolve_index;
///
/// let key = ConfigKey::from("lst");
/// assert_eq!(resolve_index(-1, 3, &key).unwrap(), 2);
/// assert_eq!(resolve_index(0, 3, &key).unwrap(), 0);
/// assert!(resolve_index(3, 3, &key).unwrap_err().is_index_error());
/// assert!(resolve_index(-4, 3, &key).unwrap_err().is_index_error());
/// ```
pub fn resolve_index(index: i64, len: usize, list_key: &ConfigKey) -> Result<usize> {
    let position = if index < 0 {
        len as i64 + index
    } else {
        index
    };
    if position < 0 || position >= len as i64 {
        return Err(ConfigError::IndexError {
            key: list_key.to_string(),
            index,
            len,
        });
    }
    Ok(position as usize)
}

/// Resolves `key` against `root`.
///
/// # Errors
///
/// `ValueError` for malformed keys, `KeyNotFound`, `TypeError` or
/// `IndexError` as described in the module documentation.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::{ConfigKey, ConfigValue, Group};
/// use cfgtree::domain::resolver::resolve;
///
/// let mut root = Group::new();
/// root.insert("lst", ConfigValue::List(vec![1.into(), 2.into(), 3.into()])).unwrap();
///
/// let last = resolve(&root, &ConfigKey::from("lst[-1]")).unwrap();
/// assert_eq!(last.as_value(), Some(&ConfigValue::from(3)));
/// assert!(resolve(&root, &ConfigKey::from("lst[3]")).unwrap_err().is_index_error());
/// assert!(resolve(&root, &ConfigKey::from("lsd")).unwrap_err().is_key_not_found());
/// ```
pub fn resolve<'a>(root: &'a Group, key: &ConfigKey) -> Result<Node<'a>> {
    let steps = key.steps()?;
    walk(root, &steps, key)
}

fn walk<'a>(root: &'a Group, steps: &[KeyStep], key: &ConfigKey) -> Result<Node<'a>> {
    let mut node = Node::Root(root);
    for (pos, step) in steps.iter().enumerate() {
        node = match step {
            KeyStep::Name(name) => match node.as_group().and_then(|g| g.get(name)) {
                Some(value) => Node::Value(value),
                None => return Err(not_found(root, key)),
            },
            KeyStep::Index(index) => {
                let list_key = ConfigKey::from_steps(&steps[..pos]);
                let items = node
                    .as_list()
                    .ok_or_else(|| not_a_list(&list_key, node.config_type()))?;
                let position = resolve_index(*index, items.len(), &list_key)?;
                Node::Value(&items[position])
            }
        };
    }
    Ok(node)
}

/// Resolves `key` and returns it with every index replaced by its
/// non-negative position, so the key keeps addressing the same node when the
/// list grows.
///
/// ```
/// use cfgtree::domain::{ConfigKey, ConfigValue, Group};
/// use cfgtree::domain::resolver::canonical_key;
///
/// let mut root = Group::new();
/// root.insert("lst", ConfigValue::List(vec![1.into(), 2.into()])).unwrap();
/// assert_eq!(canonical_key(&root, &ConfigKey::from("lst[-1]")).unwrap().as_str(), "lst[1]");
/// ```
pub fn canonical_key(root: &Group, key: &ConfigKey) -> Result<ConfigKey> {
    let mut steps = key.steps()?;
    let mut node = Node::Root(root);
    for pos in 0..steps.len() {
        node = match steps[pos].clone() {
            KeyStep::Name(name) => match node.as_group().and_then(|g| g.get(&name)) {
                Some(value) => Node::Value(value),
                None => return Err(not_found(root, key)),
            },
            KeyStep::Index(index) => {
                let list_key = ConfigKey::from_steps(&steps[..pos]);
                let items = node
                    .as_list()
                    .ok_or_else(|| not_a_list(&list_key, node.config_type()))?;
                let position = resolve_index(index, items.len(), &list_key)?;
                steps[pos] = KeyStep::Index(position as i64);
                Node::Value(&items[position])
            }
        };
    }
    Ok(ConfigKey::from_steps(&steps))
}

/// Mutably resolves `key` against `root`, with the same errors as [`resolve`].
pub fn resolve_mut<'a>(root: &'a mut Group, key: &ConfigKey) -> Result<NodeMut<'a>> {
    let steps = key.steps()?;
    walk(root, &steps, key)?;
    walk_mut(root, &steps, key)
}

fn walk_mut<'a>(root: &'a mut Group, steps: &[KeyStep], key: &ConfigKey) -> Result<NodeMut<'a>> {
    let mut node = NodeMut::Root(root);
    for (pos, step) in steps.iter().enumerate() {
        let actual = node.config_type();
        node = match step {
            KeyStep::Name(name) => node
                .into_group()
                .and_then(|group| group.get_mut(name))
                .map(NodeMut::Value)
                .ok_or_else(|| ConfigError::key_not_found(key.as_str(), Vec::new()))?,
            KeyStep::Index(index) => {
                let list_key = ConfigKey::from_steps(&steps[..pos]);
                let items = node
                    .into_list()
                    .ok_or_else(|| not_a_list(&list_key, actual))?;
                let position = resolve_index(*index, items.len(), &list_key)?;
                NodeMut::Value(&mut items[position])
            }
        };
    }
    Ok(node)
}

/// Returns `true` if `key` resolves to a node. Malformed keys are never contained.
pub fn contains(root: &Group, key: &ConfigKey) -> bool {
    resolve(root, key).is_ok()
}

/// Locates the write target for `key`, creating missing parent groups.
///
/// The whole path is validated before anything is created, so a failing call
/// leaves the tree untouched.
///
/// # Errors
///
/// - `ValueError` for malformed keys
/// - `TypeError` for the root key, or if a parent exists but is not a group
///   (for `Name` steps) or not a list (for `Index` steps)
/// - `KeyNotFound` if an `Index` step addresses a list that does not exist
/// - `IndexError` if an index is out of range
pub fn slot<'a>(root: &'a mut Group, key: &ConfigKey) -> Result<Slot<'a>> {
    let steps = key.steps()?;
    let (last, parents) = match steps.split_last() {
        Some(split) => split,
        None => {
            return Err(ConfigError::type_error(
                "The root group cannot be replaced by a single value!",
            ))
        }
    };
    check_slot(root, &steps)?;

    let mut node = NodeMut::Root(root);
    for (pos, step) in parents.iter().enumerate() {
        let parent = ConfigKey::from_steps(&steps[..pos]);
        let actual = node.config_type();
        node = match step {
            KeyStep::Name(name) => {
                let group = node
                    .into_group()
                    .ok_or_else(|| not_a_container(&parent, actual, step))?;
                NodeMut::Value(group.get_or_insert_with(name, || ConfigValue::Group(Group::new()))?)
            }
            KeyStep::Index(index) => {
                let items = node
                    .into_list()
                    .ok_or_else(|| not_a_container(&parent, actual, step))?;
                let position = resolve_index(*index, items.len(), &parent)?;
                NodeMut::Value(&mut items[position])
            }
        };
    }

    let parent = ConfigKey::from_steps(parents);
    let actual = node.config_type();
    match last {
        KeyStep::Name(name) => {
            let group = node
                .into_group()
                .ok_or_else(|| not_a_container(&parent, actual, last))?;
            if group.contains_key(name) {
                group
                    .get_mut(name)
                    .map(Slot::Occupied)
                    .ok_or_else(|| ConfigError::key_not_found(key.as_str(), Vec::new()))
            } else {
                Ok(Slot::Vacant {
                    parent: group,
                    name: name.clone(),
                })
            }
        }
        KeyStep::Index(index) => {
            let items = node
                .into_list()
                .ok_or_else(|| not_a_container(&parent, actual, last))?;
            let position = resolve_index(*index, items.len(), &parent)?;
            Ok(Slot::Occupied(&mut items[position]))
        }
    }
}

// Validates a write path without mutating anything.
fn check_slot(root: &Group, steps: &[KeyStep]) -> Result<()> {
    let mut node = Node::Root(root);
    for (pos, step) in steps.iter().enumerate() {
        let parent = ConfigKey::from_steps(&steps[..pos]);
        node = match step {
            KeyStep::Name(name) => {
                let group = node
                    .as_group()
                    .ok_or_else(|| not_a_container(&parent, node.config_type(), step))?;
                match group.get(name) {
                    Some(value) => Node::Value(value),
                    None => {
                        let rest = &steps[pos + 1..];
                        if let Some(idx) = rest.iter().position(|s| matches!(s, KeyStep::Index(_))) {
                            let missing = ConfigKey::from_steps(&steps[..pos + 1 + idx]);
                            return Err(ConfigError::key_not_found(
                                missing.as_str(),
                                suggestions(root, &missing),
                            ));
                        }
                        return Ok(());
                    }
                }
            }
            KeyStep::Index(index) => {
                let items = node
                    .as_list()
                    .ok_or_else(|| not_a_container(&parent, node.config_type(), step))?;
                let position = resolve_index(*index, items.len(), &parent)?;
                Node::Value(&items[position])
            }
        };
    }
    Ok(())
}

/// Removes the parameter `key` and returns its value.
///
/// # Errors
///
/// `KeyNotFound` if the parameter does not exist, `TypeError` if `key` is the
/// root or addresses a list element (elements cannot be deleted individually).
pub fn remove(root: &mut Group, key: &ConfigKey) -> Result<ConfigValue> {
    let steps = key.steps()?;
    let (last, parents) = match steps.split_last() {
        Some(split) => split,
        None => return Err(ConfigError::type_error("The root group cannot be deleted!")),
    };
    let name = match last {
        KeyStep::Name(name) => name,
        KeyStep::Index(_) => {
            return Err(ConfigError::type_error(format!(
                "Cannot delete `{}`: list elements cannot be deleted individually!",
                key
            )))
        }
    };
    walk(root, &steps, key)?;
    let parent = walk_mut(root, parents, key)?;
    parent
        .into_group()
        .and_then(|group| group.remove(name))
        .ok_or_else(|| ConfigError::key_not_found(key.as_str(), Vec::new()))
}

fn not_found(root: &Group, key: &ConfigKey) -> ConfigError {
    ConfigError::key_not_found(key.as_str(), suggestions(root, key))
}

fn not_a_list(key: &ConfigKey, actual: ConfigType) -> ConfigError {
    ConfigError::type_error(format!(
        "Parameter `{}` is a `{}`, not a `list`!",
        key, actual
    ))
}

fn not_a_container(parent: &ConfigKey, actual: ConfigType, step: &KeyStep) -> ConfigError {
    let expected = match step {
        KeyStep::Name(_) => ConfigType::Group,
        KeyStep::Index(_) => ConfigType::List,
    };
    ConfigError::type_error(format!(
        "Cannot address `{}` below parameter `{}`: it is a `{}`, not a `{}`!",
        step, parent, actual, expected
    ))
}

const MAX_SUGGESTIONS: usize = 3;

/// Existing parameter names close to `key` by edit distance, best first.
pub fn suggestions(root: &Group, key: &ConfigKey) -> Vec<String> {
    let wanted = key.as_str();
    let threshold = (wanted.chars().count() / 4).max(2);
    let mut scored: Vec<(usize, String)> = root
        .parameter_names(true, true)
        .into_iter()
        .map(|name| (edit_distance(wanted, &name), name))
        .filter(|(distance, _)| *distance <= threshold)
        .collect();
    scored.sort();
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name)
        .collect()
}

/// Levenshtein distance between two strings, counted in characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ConfigKey {
        ConfigKey::from(s)
    }

    fn sample() -> Group {
        let mut element = Group::new();
        element.insert("int2", ConfigValue::from(2)).unwrap();

        let mut other = Group::new();
        other
            .insert(
                "arr2",
                ConfigValue::List(vec![ConfigValue::from(1), ConfigValue::Group(element)]),
            )
            .unwrap();

        let mut values = Group::new();
        values.insert("other", ConfigValue::Group(other)).unwrap();
        values.insert("name", ConfigValue::from("x")).unwrap();

        let mut root = Group::new();
        root.insert("values", ConfigValue::Group(values)).unwrap();
        root
    }

    #[test]
    fn test_resolve_nested() {
        let root = sample();
        let node = resolve(&root, &key("values.other.arr2[1].int2")).unwrap();
        assert_eq!(node.as_value(), Some(&ConfigValue::from(2)));
    }

    #[test]
    fn test_resolve_root() {
        let root = sample();
        let node = resolve(&root, &key("")).unwrap();
        assert_eq!(node.config_type(), ConfigType::Group);
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn test_negative_index() {
        let root = sample();
        let a = resolve(&root, &key("values.other.arr2[-1]")).unwrap().to_value();
        let b = resolve(&root, &key("values.other.arr2[1]")).unwrap().to_value();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_member_suggests() {
        let root = sample();
        let err = resolve(&root, &key("values.nmae")).unwrap_err();
        match err {
            ConfigError::KeyNotFound { key, suggestions } => {
                assert_eq!(key, "values.nmae");
                assert_eq!(suggestions, vec!["values.name".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_member_of_scalar_is_not_found() {
        let root = sample();
        assert!(resolve(&root, &key("values.name.x"))
            .unwrap_err()
            .is_key_not_found());
    }

    #[test]
    fn test_index_into_non_list() {
        let root = sample();
        assert!(resolve(&root, &key("values.name[0]"))
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn test_index_out_of_range() {
        let root = sample();
        let err = resolve(&root, &key("values.other.arr2[2]")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Index 2 is out of range for list `values.other.arr2` with 2 element(s)!"
        );
    }

    #[test]
    fn test_malformed_key() {
        let root = sample();
        assert!(resolve(&root, &key("values..name")).unwrap_err().is_value_error());
        assert!(!contains(&root, &key("values..name")));
    }

    #[test]
    fn test_slot_creates_parents() {
        let mut root = Group::new();
        match slot(&mut root, &key("a.b.c")).unwrap() {
            Slot::Vacant { parent, name } => {
                parent.insert(name, ConfigValue::from(1)).unwrap();
            }
            Slot::Occupied(_) => panic!("expected a vacant slot"),
        }
        assert_eq!(
            resolve(&root, &key("a.b.c")).unwrap().as_value(),
            Some(&ConfigValue::from(1))
        );
    }

    #[test]
    fn test_slot_occupied_list_element() {
        let mut root = sample();
        match slot(&mut root, &key("values.other.arr2[0]")).unwrap() {
            Slot::Occupied(value) => *value = ConfigValue::from(10),
            Slot::Vacant { .. } => panic!("expected an occupied slot"),
        }
        assert_eq!(
            resolve(&root, &key("values.other.arr2[0]")).unwrap().as_value(),
            Some(&ConfigValue::from(10))
        );
    }

    #[test]
    fn test_slot_never_creates_lists() {
        let mut root = Group::new();
        let err = slot(&mut root, &key("a.lst[0]")).unwrap_err();
        assert!(err.is_key_not_found());
        assert!(root.is_empty(), "failed slot lookup must not create parents");
    }

    #[test]
    fn test_slot_below_scalar() {
        let mut root = sample();
        assert!(slot(&mut root, &key("values.name.sub"))
            .unwrap_err()
            .is_type_error());
        assert!(slot(&mut root, &key("")).unwrap_err().is_type_error());
    }

    #[test]
    fn test_remove() {
        let mut root = sample();
        let removed = remove(&mut root, &key("values.name")).unwrap();
        assert_eq!(removed, ConfigValue::from("x"));
        assert!(!contains(&root, &key("values.name")));
        assert!(remove(&mut root, &key("values.name"))
            .unwrap_err()
            .is_key_not_found());
        assert!(remove(&mut root, &key("values.other.arr2[0]"))
            .unwrap_err()
            .is_type_error());
    }

    #[test]
    fn test_resolve_mut() {
        let mut root = sample();
        let list = resolve_mut(&mut root, &key("values.other.arr2"))
            .unwrap()
            .into_list()
            .unwrap();
        list.push(ConfigValue::from(3));
        assert_eq!(resolve(&root, &key("values.other.arr2")).unwrap().len(), 3);
    }

    #[test]
    fn test_canonical_key() {
        let root = sample();
        assert!(canonical_key(&root, &key("values.other.arr2[-2].x"))
            .unwrap_err()
            .is_key_not_found());
        assert_eq!(
            canonical_key(&root, &key("values.other.arr2[-1]")).unwrap(),
            key("values.other.arr2[1]")
        );
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("same", "same"), 0);
    }
}
