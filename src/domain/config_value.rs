// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration values.
//!
//! This module provides `ConfigValue`, the recursive tagged union holding every
//! node of a configuration tree, its kind discriminant `ConfigType`, and the
//! `ScalarType` trait which maps Rust types onto scalar parameter kinds.

use crate::domain::datetime::{Date, DateTime, Time};
use crate::domain::group::Group;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a configuration parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigType {
    /// `true` or `false`
    Boolean,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point number
    FloatingPoint,
    /// UTF-8 string
    String,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Date and time, optionally with UTC offset
    DateTime,
    /// Ordered sequence of parameters
    List,
    /// Ordered mapping of names to parameters
    Group,
}

impl ConfigType {
    /// Returns `true` for all kinds except `List` and `Group`.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ConfigType::List | ConfigType::Group)
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigType::Boolean => "boolean",
            ConfigType::Integer => "integer",
            ConfigType::FloatingPoint => "floating_point",
            ConfigType::String => "string",
            ConfigType::Date => "date",
            ConfigType::Time => "time",
            ConfigType::DateTime => "date_time",
            ConfigType::List => "list",
            ConfigType::Group => "group",
        };
        write!(f, "{}", name)
    }
}

/// A single node of the configuration tree.
///
/// The variant (kind) of an existing parameter never changes through the typed
/// accessors; only its payload is mutable.
///
/// # Examples
///
/// ```
/// use cfgtree::domain::{ConfigType, ConfigValue};
///
/// let value = ConfigValue::from(42);
/// assert_eq!(value.config_type(), ConfigType::Integer);
/// assert_eq!(value.as_integer(), Some(42));
/// assert_eq!(value.as_bool(), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigValue {
    /// A boolean flag
    Boolean(bool),
    /// A 64-bit signed integer
    Integer(i64),
    /// A 64-bit floating point number
    FloatingPoint(f64),
    /// A string
    String(String),
    /// A calendar date
    Date(Date),
    /// A time of day
    Time(Time),
    /// A date-time
    DateTime(DateTime),
    /// A (possibly heterogeneous) list
    List(Vec<ConfigValue>),
    /// A group of named parameters
    Group(Group),
}

impl ConfigValue {
    /// Returns the kind of this value.
    pub fn config_type(&self) -> ConfigType {
        match self {
            ConfigValue::Boolean(_) => ConfigType::Boolean,
            ConfigValue::Integer(_) => ConfigType::Integer,
            ConfigValue::FloatingPoint(_) => ConfigType::FloatingPoint,
            ConfigValue::String(_) => ConfigType::String,
            ConfigValue::Date(_) => ConfigType::Date,
            ConfigValue::Time(_) => ConfigType::Time,
            ConfigValue::DateTime(_) => ConfigType::DateTime,
            ConfigValue::List(_) => ConfigType::List,
            ConfigValue::Group(_) => ConfigType::Group,
        }
    }

    /// Returns the boolean payload, if this is a `Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the floating point payload, if this is a `FloatingPoint`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::FloatingPoint(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a `String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the date payload, if this is a `Date`.
    pub fn as_date(&self) -> Option<Date> {
        match self {
            ConfigValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the time payload, if this is a `Time`.
    pub fn as_time(&self) -> Option<Time> {
        match self {
            ConfigValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Returns the date-time payload, if this is a `DateTime`.
    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            ConfigValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Returns the elements, if this is a `List`.
    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the mutable elements, if this is a `List`.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<ConfigValue>> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the group, if this is a `Group`.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            ConfigValue::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Returns the mutable group, if this is a `Group`.
    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            ConfigValue::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Returns `true` for all kinds except `List` and `Group`.
    pub fn is_scalar(&self) -> bool {
        self.config_type().is_scalar()
    }

    /// Number of direct children (1 for scalars).
    pub fn len(&self) -> usize {
        match self {
            ConfigValue::List(items) => items.len(),
            ConfigValue::Group(g) => g.len(),
            _ => 1,
        }
    }

    /// Returns `true` for an empty `List` or `Group`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! impl_from_for_value {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for ConfigValue {
                fn from(v: $t) -> Self {
                    ConfigValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_value!(
    bool => Boolean,
    i64 => Integer,
    i32 => Integer,
    u32 => Integer,
    f64 => FloatingPoint,
    f32 => FloatingPoint,
    String => String,
    &str => String,
    Date => Date,
    Time => Time,
    DateTime => DateTime,
    Vec<ConfigValue> => List,
    Group => Group,
);

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Boolean(b) => serializer.serialize_bool(*b),
            ConfigValue::Integer(i) => serializer.serialize_i64(*i),
            ConfigValue::FloatingPoint(f) => serializer.serialize_f64(*f),
            ConfigValue::String(s) => serializer.serialize_str(s),
            ConfigValue::Date(d) => serializer.collect_str(d),
            ConfigValue::Time(t) => serializer.collect_str(t),
            ConfigValue::DateTime(dt) => serializer.collect_str(dt),
            ConfigValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Group(g) => g.serialize(serializer),
        }
    }
}

/// A Rust type that maps onto one scalar parameter kind.
///
/// Implemented for `bool`, `i64`, `f64`, `String`, `Date`, `Time` and `DateTime`.
/// Used by the generic typed accessors (`get::<T>`, `get_or::<T>`, `set::<T>`).
pub trait ScalarType: Sized {
    /// The parameter kind this type is stored as.
    const KIND: ConfigType;

    /// Extracts the value if `value` is of kind `KIND`.
    fn from_value(value: &ConfigValue) -> Option<Self>;

    /// Wraps the value into a `ConfigValue` of kind `KIND`.
    fn into_value(self) -> ConfigValue;
}

macro_rules! impl_scalar_type {
    ($t:ty, $kind:ident, $extract:expr) => {
        impl ScalarType for $t {
            const KIND: ConfigType = ConfigType::$kind;

            fn from_value(value: &ConfigValue) -> Option<Self> {
                $extract(value)
            }

            fn into_value(self) -> ConfigValue {
                ConfigValue::$kind(self)
            }
        }
    };
}

impl_scalar_type!(bool, Boolean, ConfigValue::as_bool);
impl_scalar_type!(i64, Integer, ConfigValue::as_integer);
impl_scalar_type!(f64, FloatingPoint, ConfigValue::as_float);
impl_scalar_type!(String, String, |v: &ConfigValue| v.as_str().map(str::to_string));
impl_scalar_type!(Date, Date, ConfigValue::as_date);
impl_scalar_type!(Time, Time, ConfigValue::as_time);
impl_scalar_type!(DateTime, DateTime, ConfigValue::as_datetime);
