// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration serializer trait definition.

use crate::domain::{Group, Result};

/// A trait for writing a configuration tree as a document.
///
/// Serializers emit group members in insertion order.
///
/// # Examples
///
/// ```rust
/// use cfgtree::domain::{ConfigValue, Group, Result};
/// use cfgtree::ports::ConfigSerializer;
///
/// struct NamesOnly;
///
/// impl ConfigSerializer for NamesOnly {
///     fn name(&self) -> &str {
///         "names"
///     }
///
///     fn serialize(&self, group: &Group) -> Result<String> {
///         Ok(group.keys().collect::<Vec<_>>().join(","))
///     }
/// }
///
/// let mut group = Group::new();
/// group.insert("a", ConfigValue::from(1)).unwrap();
/// group.insert("b", ConfigValue::from(2)).unwrap();
/// assert_eq!(NamesOnly.serialize(&group).unwrap(), "a,b");
/// ```
pub trait ConfigSerializer: Send + Sync {
    /// Human-readable format name used in log and error messages.
    fn name(&self) -> &str;

    /// Serializes `group` as the root of a document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValueError` if the tree holds something the format
    /// cannot represent.
    fn serialize(&self, group: &Group) -> Result<String>;
}
