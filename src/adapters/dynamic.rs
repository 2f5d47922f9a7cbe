// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic-value bridge.
//!
//! This is the only place where [`DynamicValue`]s are translated into
//! configuration values and back. Conversion dispatches on the dynamic kind:
//!
//! | dynamic kind           | parameter kind   |
//! |------------------------|------------------|
//! | `Bool`                 | `Boolean`        |
//! | `Int`                  | `Integer`        |
//! | `Float`                | `FloatingPoint`  |
//! | `String`               | `String`         |
//! | `Date`/`Time`/`DateTime` | `Date`/`Time`/`DateTime` |
//! | `Sequence`             | `List`           |
//! | `Mapping`/`Config`     | `Group`          |
//!
//! `Null` and `Bytes` have no parameter kind and are rejected with a
//! `TypeError` naming the offending key.

use crate::domain::config_key::is_valid_name;
use crate::domain::{
    ConfigError, ConfigKey, ConfigValue, Date, DateTime, Group, Result, Time, TimeOffset,
};
use crate::ports::{DynamicKind, DynamicValue};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// Converts a configuration value into a dynamic value (deep copy).
///
/// # Examples
///
/// ```
/// use cfgtree::adapters::dynamic::to_dynamic;
/// use cfgtree::domain::ConfigValue;
/// use cfgtree::ports::DynamicValue;
///
/// let value = ConfigValue::List(vec![ConfigValue::from(1), ConfigValue::from("a")]);
/// assert_eq!(
///     to_dynamic(&value).unwrap(),
///     DynamicValue::Sequence(vec![DynamicValue::Int(1), DynamicValue::from("a")])
/// );
/// ```
pub fn to_dynamic(value: &ConfigValue) -> Result<DynamicValue> {
    Ok(match value {
        ConfigValue::Boolean(b) => DynamicValue::Bool(*b),
        ConfigValue::Integer(i) => DynamicValue::Int(*i),
        ConfigValue::FloatingPoint(f) => DynamicValue::Float(*f),
        ConfigValue::String(s) => DynamicValue::String(s.clone()),
        ConfigValue::Date(d) => DynamicValue::Date(NaiveDate::from(*d)),
        ConfigValue::Time(t) => DynamicValue::Time(NaiveTime::from(*t)),
        ConfigValue::DateTime(dt) => {
            DynamicValue::DateTime(NaiveDateTime::from(*dt), dt.offset().map(FixedOffset::from))
        }
        ConfigValue::List(items) => {
            DynamicValue::Sequence(items.iter().map(to_dynamic).collect::<Result<_>>()?)
        }
        ConfigValue::Group(group) => group_to_dynamic(group)?,
    })
}

/// Converts a group into an ordered mapping with string keys.
pub fn group_to_dynamic(group: &Group) -> Result<DynamicValue> {
    let entries = group
        .iter()
        .map(|(name, value)| Ok((DynamicValue::String(name.to_string()), to_dynamic(value)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(DynamicValue::Mapping(entries))
}

/// Converts a dynamic value into the parameter `key`.
///
/// `key` only names the parameter in error messages.
///
/// # Errors
///
/// `TypeError` for `Null`/`Bytes` values (at any depth) and for mapping keys
/// that are not valid parameter names; `ValueError` for calendar values that
/// cannot be represented.
///
/// # Examples
///
/// ```
/// use cfgtree::adapters::dynamic::from_dynamic;
/// use cfgtree::domain::{ConfigKey, ConfigType};
/// use cfgtree::ports::DynamicValue;
///
/// let key = ConfigKey::from("servers");
/// let value = from_dynamic(DynamicValue::from(vec![DynamicValue::from("a")]), &key).unwrap();
/// assert_eq!(value.config_type(), ConfigType::List);
///
/// let err = from_dynamic(DynamicValue::Bytes(vec![0]), &key).unwrap_err();
/// assert!(err.is_type_error());
/// ```
pub fn from_dynamic(value: DynamicValue, key: &ConfigKey) -> Result<ConfigValue> {
    convert(value, key, None)
}

/// Converts the element at `index` of the list `list_key`; errors name the
/// list rather than the element.
pub fn element_from_dynamic(
    value: DynamicValue,
    list_key: &ConfigKey,
    index: usize,
) -> Result<ConfigValue> {
    convert(value, &list_key.element(index), Some(list_key))
}

/// Converts a mapping (or an already structured group) into a group.
///
/// # Errors
///
/// `TypeError` if `value` is neither a mapping nor a group, or if any member
/// cannot be converted.
pub fn group_from_dynamic(value: DynamicValue, key: &ConfigKey) -> Result<Group> {
    match value {
        DynamicValue::Mapping(entries) => group_from_mapping(entries, key),
        DynamicValue::Config(group) => Ok(group),
        other => Err(ConfigError::type_error(format!(
            "Cannot convert a value of type `{}` into a group{}!",
            other.kind(),
            describe_key(key)
        ))),
    }
}

// `list` is the enclosing list when `key` names one of its elements.
fn convert(value: DynamicValue, key: &ConfigKey, list: Option<&ConfigKey>) -> Result<ConfigValue> {
    Ok(match value {
        DynamicValue::Bool(b) => ConfigValue::Boolean(b),
        DynamicValue::Int(i) => ConfigValue::Integer(i),
        DynamicValue::Float(f) => ConfigValue::FloatingPoint(f),
        DynamicValue::String(s) => ConfigValue::String(s),
        DynamicValue::Date(d) => ConfigValue::Date(Date::try_from(d)?),
        DynamicValue::Time(t) => ConfigValue::Time(Time::from(t)),
        DynamicValue::DateTime(naive, offset) => {
            let local = DateTime::try_from(naive)?;
            let offset = offset.map(TimeOffset::try_from).transpose()?;
            ConfigValue::DateTime(DateTime::new(local.date(), local.time(), offset))
        }
        DynamicValue::Sequence(items) => ConfigValue::List(
            items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| convert(item, &key.element(idx), Some(key)))
                .collect::<Result<_>>()?,
        ),
        DynamicValue::Mapping(entries) => ConfigValue::Group(group_from_mapping(entries, key)?),
        DynamicValue::Config(group) => ConfigValue::Group(group),
        unsupported @ (DynamicValue::Null | DynamicValue::Bytes(_)) => {
            return Err(unsupported_kind(unsupported.kind(), key, list))
        }
    })
}

fn group_from_mapping(entries: Vec<(DynamicValue, DynamicValue)>, key: &ConfigKey) -> Result<Group> {
    let mut group = Group::new();
    for (name, value) in entries {
        let name = match name {
            DynamicValue::String(name) if is_valid_name(&name) => name,
            DynamicValue::String(name) => {
                return Err(ConfigError::type_error(format!(
                    "Mapping key `{}` is not a valid parameter name{}! Names may only \
                     contain alphanumeric characters, `-` and `_`.",
                    name,
                    describe_key(key)
                )))
            }
            other => {
                return Err(ConfigError::type_error(format!(
                    "Mapping keys must be strings, but found a key of type `{}`{}!",
                    other.kind(),
                    describe_key(key)
                )))
            }
        };
        if group.contains_key(&name) {
            return Err(ConfigError::type_error(format!(
                "Mapping key `{}` occurs more than once{}!",
                name,
                describe_key(key)
            )));
        }
        let member_key = key.join(&name);
        let value = convert(value, &member_key, None)?;
        group.insert(name, value)?;
    }
    Ok(group)
}

fn describe_key(key: &ConfigKey) -> String {
    if key.is_root() {
        String::new()
    } else {
        format!(" (parameter `{}`)", key)
    }
}

fn unsupported_kind(kind: DynamicKind, key: &ConfigKey, list: Option<&ConfigKey>) -> ConfigError {
    match list {
        None => ConfigError::type_error(format!(
            "Cannot convert a value of type `{}` to a configuration parameter! Check key `{}`!",
            kind, key
        )),
        Some(list) => ConfigError::type_error(format!(
            "Cannot append a value of type `{}` to list `{}`!",
            kind, list
        )),
    }
}

impl From<serde_json::Value> for DynamicValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DynamicValue::Null,
            serde_json::Value::Bool(b) => DynamicValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => DynamicValue::Int(i),
                None => DynamicValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => DynamicValue::String(s),
            serde_json::Value::Array(items) => {
                DynamicValue::Sequence(items.into_iter().map(DynamicValue::from).collect())
            }
            serde_json::Value::Object(map) => DynamicValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (DynamicValue::String(k), DynamicValue::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigType;

    fn key(s: &str) -> ConfigKey {
        ConfigKey::from(s)
    }

    #[test]
    fn test_scalars_from_dynamic() {
        assert_eq!(
            from_dynamic(DynamicValue::from(true), &key("b")).unwrap(),
            ConfigValue::Boolean(true)
        );
        assert_eq!(
            from_dynamic(DynamicValue::from(-5), &key("i")).unwrap(),
            ConfigValue::Integer(-5)
        );
        assert_eq!(
            from_dynamic(DynamicValue::from(0.5), &key("f")).unwrap(),
            ConfigValue::FloatingPoint(0.5)
        );
    }

    #[test]
    fn test_calendar_values() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        let value = from_dynamic(DynamicValue::from(date), &key("d")).unwrap();
        assert_eq!(value, ConfigValue::Date(Date::new(2023, 1, 31).unwrap()));
        assert_eq!(to_dynamic(&value).unwrap(), DynamicValue::Date(date));

        let dt = chrono::DateTime::parse_from_rfc3339("2023-01-31T10:00:00+02:00").unwrap();
        let value = from_dynamic(DynamicValue::from(dt), &key("dt")).unwrap();
        let stored = value.as_datetime().unwrap();
        assert_eq!(stored.offset(), Some(TimeOffset::new(120).unwrap()));
        assert_eq!(to_dynamic(&value).unwrap(), DynamicValue::from(dt));
    }

    #[test]
    fn test_nested_sequences() {
        let value = from_dynamic(
            DynamicValue::from(vec![
                DynamicValue::from(1),
                DynamicValue::from(vec![DynamicValue::from("x")]),
            ]),
            &key("lst"),
        )
        .unwrap();
        let items = value.as_list().unwrap();
        assert_eq!(items[1].config_type(), ConfigType::List);
    }

    #[test]
    fn test_mapping_keeps_order() {
        let value = from_dynamic(
            DynamicValue::mapping(vec![("z", DynamicValue::from(1)), ("a", DynamicValue::from(2))]),
            &key("grp"),
        )
        .unwrap();
        let group = value.as_group().unwrap();
        assert_eq!(group.keys().collect::<Vec<_>>(), vec!["z", "a"]);
    }

    #[test]
    fn test_invalid_mapping_keys() {
        let dotted = DynamicValue::mapping(vec![("a.b", DynamicValue::from(1))]);
        let err = from_dynamic(dotted, &key("grp")).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().contains("`a.b`"));

        let int_key = DynamicValue::Mapping(vec![(DynamicValue::Int(1), DynamicValue::from(1))]);
        let err = from_dynamic(int_key, &key("grp")).unwrap_err();
        assert!(err.to_string().contains("`int`"));
    }

    #[test]
    fn test_unsupported_kinds_name_the_key() {
        let err = from_dynamic(
            DynamicValue::mapping(vec![("blob", DynamicValue::Bytes(vec![1, 2]))]),
            &key("grp"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot convert a value of type `bytes` to a configuration parameter! Check key `grp.blob`!"
        );

        let err = from_dynamic(
            DynamicValue::from(vec![DynamicValue::from(1), DynamicValue::Null]),
            &key("lst"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot append a value of type `null` to list `lst`!"
        );
    }

    #[test]
    fn test_element_errors_name_the_enclosing_list() {
        let nested = DynamicValue::from(vec![
            DynamicValue::from(vec![DynamicValue::from(1)]),
            DynamicValue::from(vec![DynamicValue::from(2), DynamicValue::Bytes(vec![0])]),
        ]);
        let err = from_dynamic(nested, &key("servers")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot append a value of type `bytes` to list `servers[1]`!"
        );

        let err = element_from_dynamic(DynamicValue::Null, &key("matrix[0]"), 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot append a value of type `null` to list `matrix[0]`!"
        );
        let err = element_from_dynamic(DynamicValue::Null, &key("servers"), 0).unwrap_err();
        assert!(err.to_string().ends_with("to list `servers`!"));
    }

    #[test]
    fn test_repeated_mapping_keys_are_rejected() {
        let repeated = DynamicValue::mapping(vec![
            ("port", DynamicValue::from(80)),
            ("port", DynamicValue::from(443)),
        ]);
        let err = from_dynamic(repeated, &key("server")).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().contains("`port`"));
        assert!(err.to_string().contains("`server`"));
    }

    #[test]
    fn test_group_from_dynamic_requires_mapping() {
        assert!(group_from_dynamic(DynamicValue::from(1), &key("x"))
            .unwrap_err()
            .is_type_error());
        let group = group_from_dynamic(DynamicValue::Config(Group::new()), &key("x")).unwrap();
        assert!(group.is_empty());
    }

    #[test]
    fn test_from_json_value() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"a": [1, 2.5, "s"], "b": {"c": true}}"#).unwrap();
        let dynamic = DynamicValue::from(json);
        let group = group_from_dynamic(dynamic, &ConfigKey::root()).unwrap();
        assert_eq!(group.get("a").unwrap().len(), 3);
        assert_eq!(
            group.get("b").unwrap().as_group().unwrap().get("c"),
            Some(&ConfigValue::Boolean(true))
        );
    }

    #[test]
    fn test_round_trip_group() {
        let mut group = Group::new();
        group.insert("name", ConfigValue::from("n")).unwrap();
        group
            .insert("lst", ConfigValue::List(vec![ConfigValue::from(1.5)]))
            .unwrap();
        let dynamic = group_to_dynamic(&group).unwrap();
        assert_eq!(group_from_dynamic(dynamic, &ConfigKey::root()).unwrap(), group);
    }
}
