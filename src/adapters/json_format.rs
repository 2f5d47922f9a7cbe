// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON format adapter.
//!
//! Objects become groups (member order preserved), arrays become lists.
//! JSON has no calendar types, so dates and times are read as strings and
//! written in their RFC 3339 form. `null` has no parameter kind; how it is
//! handled is chosen with [`NullValuePolicy`].

use crate::domain::config_key::is_valid_name;
use crate::domain::{ConfigError, ConfigValue, Group, Result};
use crate::ports::{ConfigParser, ConfigSerializer};
use super::{invalid_name, join_path};
use tracing::warn;

/// How `null` values in JSON/YAML documents are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullValuePolicy {
    /// Drop the member (or list element) and log a warning.
    #[default]
    Skip,
    /// Store the string `"null"`.
    NullString,
    /// Store an empty list.
    EmptyList,
}

impl NullValuePolicy {
    /// Value stored for a `null` at `path`, `None` if it is dropped.
    pub(crate) fn resolve(&self, path: &str) -> Option<ConfigValue> {
        match self {
            NullValuePolicy::Skip => {
                warn!("Skipping null value at `{}`", path);
                None
            }
            NullValuePolicy::NullString => Some(ConfigValue::from("null")),
            NullValuePolicy::EmptyList => Some(ConfigValue::List(Vec::new())),
        }
    }
}

/// JSON parser and serializer.
///
/// # Examples
///
/// ```rust
/// use cfgtree::adapters::{JsonFormat, NullValuePolicy};
/// use cfgtree::domain::ConfigValue;
/// use cfgtree::ports::ConfigParser;
///
/// let json = r#"{"name": "demo", "missing": null}"#;
///
/// let group = JsonFormat::new().parse(json).unwrap();
/// assert_eq!(group.get("name"), Some(&ConfigValue::from("demo")));
/// assert!(group.get("missing").is_none());
///
/// let group = JsonFormat::with_null_policy(NullValuePolicy::NullString).parse(json).unwrap();
/// assert_eq!(group.get("missing"), Some(&ConfigValue::from("null")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonFormat {
    null_policy: NullValuePolicy,
}

impl JsonFormat {
    /// Creates a JSON adapter which skips `null` values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a JSON adapter with the given `null` handling.
    pub fn with_null_policy(null_policy: NullValuePolicy) -> Self {
        Self { null_policy }
    }

    /// Returns the configured `null` handling.
    pub fn null_policy(&self) -> NullValuePolicy {
        self.null_policy
    }

    fn object_to_group(
        &self,
        object: serde_json::Map<String, serde_json::Value>,
        path: &str,
    ) -> Result<Group> {
        let mut group = Group::new();
        for (name, value) in object {
            let member_path = join_path(path, &name);
            if !is_valid_name(&name) {
                return Err(invalid_name("JSON", &member_path));
            }
            if let Some(value) = self.value_to_config(value, &member_path)? {
                group.insert(name, value)?;
            }
        }
        Ok(group)
    }

    fn value_to_config(&self, value: serde_json::Value, path: &str) -> Result<Option<ConfigValue>> {
        Ok(Some(match value {
            serde_json::Value::Null => return Ok(self.null_policy.resolve(path)),
            serde_json::Value::Bool(b) => ConfigValue::Boolean(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ConfigValue::Integer(i)
                } else if n.is_u64() {
                    return Err(ConfigError::parse_error(format!(
                        "Invalid JSON document: integer {} at `{}` exceeds the 64-bit signed range!",
                        n, path
                    )));
                } else {
                    match n.as_f64() {
                        Some(f) => ConfigValue::FloatingPoint(f),
                        None => {
                            return Err(ConfigError::parse_error(format!(
                                "Invalid JSON document: unsupported number {} at `{}`!",
                                n, path
                            )))
                        }
                    }
                }
            }
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    if let Some(value) = self.value_to_config(item, &format!("{}[{}]", path, idx))? {
                        list.push(value);
                    }
                }
                ConfigValue::List(list)
            }
            serde_json::Value::Object(object) => {
                ConfigValue::Group(self.object_to_group(object, path)?)
            }
        }))
    }
}

impl ConfigParser for JsonFormat {
    fn name(&self) -> &str {
        "JSON"
    }

    fn parse(&self, content: &str) -> Result<Group> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ConfigError::from_parser_error("JSON", e))?;
        match value {
            serde_json::Value::Object(object) => self.object_to_group(object, ""),
            _ => Err(ConfigError::parse_error(
                "Invalid JSON document: the top level must be an object!",
            )),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

impl ConfigSerializer for JsonFormat {
    fn name(&self) -> &str {
        "JSON"
    }

    fn serialize(&self, group: &Group) -> Result<String> {
        serde_json::to_string_pretty(group).map_err(|e| {
            ConfigError::value_error(format!("Cannot represent configuration as JSON: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConfigType, Date};

    #[test]
    fn test_json_parser_nested() {
        let group = JsonFormat::new()
            .parse(r#"{"database": {"host": "localhost", "port": 5432, "ratio": 0.5}}"#)
            .unwrap();
        let database = group.get("database").unwrap().as_group().unwrap();
        assert_eq!(database.get("port"), Some(&ConfigValue::Integer(5432)));
        assert_eq!(database.get("ratio"), Some(&ConfigValue::FloatingPoint(0.5)));
    }

    #[test]
    fn test_json_parser_arrays() {
        let group = JsonFormat::new()
            .parse(r#"{"servers": ["a", "b"], "mixed": [1, "two", [3]]}"#)
            .unwrap();
        assert_eq!(group.get("servers").unwrap().len(), 2);
        let mixed = group.get("mixed").unwrap().as_list().unwrap();
        assert_eq!(mixed[2].config_type(), ConfigType::List);
    }

    #[test]
    fn test_json_null_policies() {
        let json = r#"{"a": null, "lst": [1, null]}"#;

        let skipped = JsonFormat::new().parse(json).unwrap();
        assert!(!skipped.contains_key("a"));
        assert_eq!(skipped.get("lst").unwrap().len(), 1);

        let strings = JsonFormat::with_null_policy(NullValuePolicy::NullString)
            .parse(json)
            .unwrap();
        assert_eq!(strings.get("a"), Some(&ConfigValue::from("null")));

        let lists = JsonFormat::with_null_policy(NullValuePolicy::EmptyList)
            .parse(json)
            .unwrap();
        assert_eq!(lists.get("a"), Some(&ConfigValue::List(Vec::new())));
        assert_eq!(lists.get("lst").unwrap().len(), 2);
    }

    #[test]
    fn test_json_parser_top_level_must_be_object() {
        let err = JsonFormat::new().parse("[1, 2]").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_json_parser_invalid() {
        assert!(JsonFormat::new().parse("{invalid").unwrap_err().is_parse_error());
    }

    #[test]
    fn test_json_parser_rejects_huge_integers() {
        let err = JsonFormat::new()
            .parse(r#"{"big": 18446744073709551615}"#)
            .unwrap_err();
        assert!(err.to_string().contains("`big`"));
    }

    #[test]
    fn test_json_parser_rejects_invalid_names() {
        let err = JsonFormat::new().parse(r#"{"a": {"b.c": 1}}"#).unwrap_err();
        assert!(err.to_string().contains("`a.b.c`"));
    }

    #[test]
    fn test_json_serializer() {
        let mut group = Group::new();
        group.insert("z", ConfigValue::from(1)).unwrap();
        group
            .insert("d", ConfigValue::Date(Date::new(2022, 12, 1).unwrap()))
            .unwrap();
        let text = JsonFormat::new().serialize(&group).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["z"], 1);
        assert_eq!(value["d"], "2022-12-01");
        assert!(text.find("\"z\"").unwrap() < text.find("\"d\"").unwrap());
    }
}
