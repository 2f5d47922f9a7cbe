// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML format adapter.
//!
//! Mappings become groups (member order preserved), sequences become lists.
//! Tagged values are read as their untagged content. Like JSON, YAML documents
//! store dates and times as strings, and `null` is handled according to the
//! adapter's [`NullValuePolicy`].

use crate::adapters::NullValuePolicy;
use crate::domain::config_key::is_valid_name;
use crate::domain::{ConfigError, ConfigValue, Group, Result};
use crate::ports::{ConfigParser, ConfigSerializer};
use super::{invalid_name, join_path};

/// YAML parser and serializer.
///
/// # Examples
///
/// ```rust
/// use cfgtree::adapters::YamlFormat;
/// use cfgtree::domain::ConfigValue;
/// use cfgtree::ports::ConfigParser;
///
/// let group = YamlFormat::new().parse("database:\n  host: localhost\n  port: 5432").unwrap();
/// let database = group.get("database").unwrap().as_group().unwrap();
/// assert_eq!(database.get("port"), Some(&ConfigValue::from(5432)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlFormat {
    null_policy: NullValuePolicy,
}

impl YamlFormat {
    /// Creates a YAML adapter which skips `null` values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a YAML adapter with the given `null` handling.
    pub fn with_null_policy(null_policy: NullValuePolicy) -> Self {
        Self { null_policy }
    }

    fn mapping_to_group(&self, mapping: serde_yaml::Mapping, path: &str) -> Result<Group> {
        let mut group = Group::new();
        for (key, value) in mapping {
            let name = match key {
                serde_yaml::Value::String(name) => name,
                other => {
                    return Err(ConfigError::parse_error(format!(
                        "Invalid YAML document: only string keys are supported, found `{:?}` in `{}`!",
                        other,
                        if path.is_empty() { "<root>" } else { path }
                    )))
                }
            };
            let member_path = join_path(path, &name);
            if !is_valid_name(&name) {
                return Err(invalid_name("YAML", &member_path));
            }
            if let Some(value) = self.value_to_config(value, &member_path)? {
                group.insert(name, value)?;
            }
        }
        Ok(group)
    }

    fn value_to_config(&self, value: serde_yaml::Value, path: &str) -> Result<Option<ConfigValue>> {
        Ok(Some(match value {
            serde_yaml::Value::Null => return Ok(self.null_policy.resolve(path)),
            serde_yaml::Value::Bool(b) => ConfigValue::Boolean(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ConfigValue::Integer(i)
                } else if n.is_u64() {
                    return Err(ConfigError::parse_error(format!(
                        "Invalid YAML document: integer {} at `{}` exceeds the 64-bit signed range!",
                        n, path
                    )));
                } else {
                    match n.as_f64() {
                        Some(f) => ConfigValue::FloatingPoint(f),
                        None => {
                            return Err(ConfigError::parse_error(format!(
                                "Invalid YAML document: unsupported number {} at `{}`!",
                                n, path
                            )))
                        }
                    }
                }
            }
            serde_yaml::Value::String(s) => ConfigValue::String(s),
            serde_yaml::Value::Sequence(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    if let Some(value) = self.value_to_config(item, &format!("{}[{}]", path, idx))? {
                        list.push(value);
                    }
                }
                ConfigValue::List(list)
            }
            serde_yaml::Value::Mapping(mapping) => {
                ConfigValue::Group(self.mapping_to_group(mapping, path)?)
            }
            serde_yaml::Value::Tagged(tagged) => return self.value_to_config(tagged.value, path),
        }))
    }
}

impl ConfigParser for YamlFormat {
    fn name(&self) -> &str {
        "YAML"
    }

    fn parse(&self, content: &str) -> Result<Group> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::from_parser_error("YAML", e))?;
        match value {
            serde_yaml::Value::Mapping(mapping) => self.mapping_to_group(mapping, ""),
            // An empty document
            serde_yaml::Value::Null => Ok(Group::new()),
            _ => Err(ConfigError::parse_error(
                "Invalid YAML document: the top level must be a mapping!",
            )),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

impl ConfigSerializer for YamlFormat {
    fn name(&self) -> &str {
        "YAML"
    }

    fn serialize(&self, group: &Group) -> Result<String> {
        serde_yaml::to_string(group).map_err(|e| {
            ConfigError::value_error(format!("Cannot represent configuration as YAML: {}", e))
        })
    }
}
