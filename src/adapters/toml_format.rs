// SPDX-License-Identifier: MIT OR Apache-2.0

//! TOML format adapter.
//!
//! Tables become groups, arrays become lists and TOML's offset/local
//! date-times, local dates and local times map onto the calendar kinds.

use crate::domain::config_key::is_valid_name;
use crate::domain::{ConfigError, ConfigValue, Date, DateTime, Group, Result, Time, TimeOffset};
use crate::ports::{ConfigParser, ConfigSerializer};
use super::{invalid_name, join_path};
use toml::value::{Datetime as TomlDatetime, Offset as TomlOffset};

/// TOML parser and serializer.
///
/// # Examples
///
/// ```rust
/// use cfgtree::adapters::TomlFormat;
/// use cfgtree::domain::ConfigValue;
/// use cfgtree::ports::ConfigParser;
///
/// let group = TomlFormat::new().parse("x = 42\n[g]\ny = 'hi'").unwrap();
/// assert_eq!(group.get("x"), Some(&ConfigValue::from(42)));
/// assert!(group.get("g").unwrap().as_group().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TomlFormat;

impl TomlFormat {
    /// Creates a new TOML format adapter.
    pub fn new() -> Self {
        TomlFormat
    }

    fn table_to_group(table: toml::Table, path: &str) -> Result<Group> {
        let mut group = Group::new();
        for (name, value) in table {
            let member_path = join_path(path, &name);
            if !is_valid_name(&name) {
                return Err(invalid_name("TOML", &member_path));
            }
            let value = Self::value_to_config(value, &member_path)?;
            group.insert(name, value)?;
        }
        Ok(group)
    }

    fn value_to_config(value: toml::Value, path: &str) -> Result<ConfigValue> {
        Ok(match value {
            toml::Value::String(s) => ConfigValue::String(s),
            toml::Value::Integer(i) => ConfigValue::Integer(i),
            toml::Value::Float(f) => ConfigValue::FloatingPoint(f),
            toml::Value::Boolean(b) => ConfigValue::Boolean(b),
            toml::Value::Datetime(dt) => datetime_to_config(&dt).map_err(|e| {
                ConfigError::parse_error(format!("Invalid TOML date/time at `{}`: {}", path, e))
            })?,
            toml::Value::Array(items) => ConfigValue::List(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| Self::value_to_config(item, &format!("{}[{}]", path, idx)))
                    .collect::<Result<_>>()?,
            ),
            toml::Value::Table(table) => ConfigValue::Group(Self::table_to_group(table, path)?),
        })
    }

    fn group_to_table(group: &Group) -> Result<toml::Table> {
        group
            .iter()
            .map(|(name, value)| Ok((name.to_string(), Self::config_to_value(value)?)))
            .collect()
    }

    fn config_to_value(value: &ConfigValue) -> Result<toml::Value> {
        Ok(match value {
            ConfigValue::Boolean(b) => toml::Value::Boolean(*b),
            ConfigValue::Integer(i) => toml::Value::Integer(*i),
            ConfigValue::FloatingPoint(f) => toml::Value::Float(*f),
            ConfigValue::String(s) => toml::Value::String(s.clone()),
            ConfigValue::Date(d) => toml::Value::Datetime(TomlDatetime {
                date: Some(to_toml_date(d)?),
                time: None,
                offset: None,
            }),
            ConfigValue::Time(t) => toml::Value::Datetime(TomlDatetime {
                date: None,
                time: Some(to_toml_time(t)?),
                offset: None,
            }),
            ConfigValue::DateTime(dt) => toml::Value::Datetime(TomlDatetime {
                date: Some(to_toml_date(&dt.date())?),
                time: Some(to_toml_time(&dt.time())?),
                offset: dt.offset().map(to_toml_offset).transpose()?,
            }),
            ConfigValue::List(items) => toml::Value::Array(
                items
                    .iter()
                    .map(Self::config_to_value)
                    .collect::<Result<_>>()?,
            ),
            ConfigValue::Group(group) => toml::Value::Table(Self::group_to_table(group)?),
        })
    }
}

fn datetime_to_config(dt: &TomlDatetime) -> Result<ConfigValue> {
    let date = dt
        .date
        .map(|d| Date::new(u32::from(d.year), u32::from(d.month), u32::from(d.day)))
        .transpose()?;
    let time = dt
        .time
        .map(|t| {
            Time::new(
                u32::from(t.hour),
                u32::from(t.minute),
                u32::from(t.second),
                t.nanosecond,
            )
        })
        .transpose()?;
    let offset = dt
        .offset
        .map(|o| match o {
            TomlOffset::Z => Ok(TimeOffset::utc()),
            TomlOffset::Custom { minutes } => TimeOffset::new(i32::from(minutes)),
        })
        .transpose()?;

    match (date, time, offset) {
        (Some(date), None, None) => Ok(ConfigValue::Date(date)),
        (None, Some(time), None) => Ok(ConfigValue::Time(time)),
        (Some(date), Some(time), offset) => Ok(ConfigValue::DateTime(DateTime::new(date, time, offset))),
        _ => Err(ConfigError::value_error(format!("Unsupported date/time `{}`", dt))),
    }
}

fn out_of_range(what: &str, value: impl std::fmt::Display) -> ConfigError {
    ConfigError::value_error(format!(
        "Cannot represent {} `{}` as TOML: component out of range!",
        what, value
    ))
}

fn to_toml_date(d: &Date) -> Result<toml::value::Date> {
    let err = || out_of_range("date", d);
    Ok(toml::value::Date {
        year: u16::try_from(d.year()).map_err(|_| err())?,
        month: u8::try_from(d.month()).map_err(|_| err())?,
        day: u8::try_from(d.day()).map_err(|_| err())?,
    })
}

fn to_toml_time(t: &Time) -> Result<toml::value::Time> {
    let err = || out_of_range("time", t);
    Ok(toml::value::Time {
        hour: u8::try_from(t.hour()).map_err(|_| err())?,
        minute: u8::try_from(t.minute()).map_err(|_| err())?,
        second: u8::try_from(t.second()).map_err(|_| err())?,
        nanosecond: t.nanosecond(),
    })
}

fn to_toml_offset(offset: TimeOffset) -> Result<TomlOffset> {
    match offset.minutes() {
        0 => Ok(TomlOffset::Z),
        minutes => i16::try_from(minutes)
            .map(|minutes| TomlOffset::Custom { minutes })
            .map_err(|_| out_of_range("UTC offset", offset)),
    }
}

impl ConfigParser for TomlFormat {
    fn name(&self) -> &str {
        "TOML"
    }

    fn parse(&self, content: &str) -> Result<Group> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::from_parser_error("TOML", e))?;
        Self::table_to_group(table, "")
    }

    fn supported_extensions(&self) -> &[&str] {
        &["toml"]
    }
}

impl ConfigSerializer for TomlFormat {
    fn name(&self) -> &str {
        "TOML"
    }

    fn serialize(&self, group: &Group) -> Result<String> {
        toml::to_string(&Self::group_to_table(group)?).map_err(|e| {
            ConfigError::value_error(format!("Cannot represent configuration as TOML: {}", e))
        })
    }
}
