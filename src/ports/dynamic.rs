// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic host values.
//!
//! `DynamicValue` models the loosely typed values an embedding host hands to the
//! configuration tree (e.g. values coming from a scripting layer or a generic
//! JSON document). Its kind is inspected with [`DynamicValue::kind`]; the
//! conversion into and out of the tree happens only in the dynamic-value bridge
//! (`crate::adapters::dynamic`).

use crate::domain::Group;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// The kind tag of a [`DynamicValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DynamicKind {
    /// Absence of a value
    Null,
    /// Boolean
    Bool,
    /// Signed integer
    Int,
    /// Floating point number
    Float,
    /// Text
    String,
    /// Raw bytes
    Bytes,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Date and time
    DateTime,
    /// Ordered sequence
    Sequence,
    /// Ordered key/value mapping
    Mapping,
    /// An already structured configuration group
    Config,
}

impl fmt::Display for DynamicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DynamicKind::Null => "null",
            DynamicKind::Bool => "bool",
            DynamicKind::Int => "int",
            DynamicKind::Float => "float",
            DynamicKind::String => "str",
            DynamicKind::Bytes => "bytes",
            DynamicKind::Date => "date",
            DynamicKind::Time => "time",
            DynamicKind::DateTime => "datetime",
            DynamicKind::Sequence => "sequence",
            DynamicKind::Mapping => "mapping",
            DynamicKind::Config => "config",
        };
        write!(f, "{}", name)
    }
}

/// A dynamically typed host value.
///
/// Mapping keys are themselves dynamic values, since hosts may use any value
/// as a key; only string keys that are valid parameter names can be stored in
/// a configuration.
///
/// # Examples
///
/// ```
/// use cfgtree::ports::{DynamicKind, DynamicValue};
///
/// let value = DynamicValue::mapping(vec![
///     ("name", DynamicValue::from("demo")),
///     ("ports", DynamicValue::from(vec![DynamicValue::from(80), DynamicValue::from(443)])),
/// ]);
/// assert_eq!(value.kind(), DynamicKind::Mapping);
/// assert_eq!(value.get("name"), Some(&DynamicValue::from("demo")));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum DynamicValue {
    /// `None`/`null`
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time, with an optional UTC offset
    DateTime(NaiveDateTime, Option<FixedOffset>),
    /// Ordered sequence (list/tuple-like)
    Sequence(Vec<DynamicValue>),
    /// Ordered mapping (dict-like)
    Mapping(Vec<(DynamicValue, DynamicValue)>),
    /// A configuration group
    Config(Group),
}

impl DynamicValue {
    /// Builds a mapping with string keys.
    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, DynamicValue)>,
    {
        DynamicValue::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (DynamicValue::String(k.into()), v))
                .collect(),
        )
    }

    /// Returns the kind tag.
    pub fn kind(&self) -> DynamicKind {
        match self {
            DynamicValue::Null => DynamicKind::Null,
            DynamicValue::Bool(_) => DynamicKind::Bool,
            DynamicValue::Int(_) => DynamicKind::Int,
            DynamicValue::Float(_) => DynamicKind::Float,
            DynamicValue::String(_) => DynamicKind::String,
            DynamicValue::Bytes(_) => DynamicKind::Bytes,
            DynamicValue::Date(_) => DynamicKind::Date,
            DynamicValue::Time(_) => DynamicKind::Time,
            DynamicValue::DateTime(..) => DynamicKind::DateTime,
            DynamicValue::Sequence(_) => DynamicKind::Sequence,
            DynamicValue::Mapping(_) => DynamicKind::Mapping,
            DynamicValue::Config(_) => DynamicKind::Config,
        }
    }

    /// Looks up a string key in a mapping.
    pub fn get(&self, key: &str) -> Option<&DynamicValue> {
        match self {
            DynamicValue::Mapping(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, DynamicValue::String(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Returns `true` for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, DynamicValue::Null)
    }
}

macro_rules! impl_from_for_dynamic {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for DynamicValue {
                fn from(v: $t) -> Self {
                    DynamicValue::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_dynamic!(
    bool => Bool,
    i64 => Int,
    i32 => Int,
    u32 => Int,
    f64 => Float,
    f32 => Float,
    String => String,
    &str => String,
    NaiveDate => Date,
    NaiveTime => Time,
    Vec<DynamicValue> => Sequence,
    Group => Config,
);

impl From<NaiveDateTime> for DynamicValue {
    fn from(dt: NaiveDateTime) -> Self {
        DynamicValue::DateTime(dt, None)
    }
}

impl From<chrono::DateTime<FixedOffset>> for DynamicValue {
    fn from(dt: chrono::DateTime<FixedOffset>) -> Self {
        DynamicValue::DateTime(dt.naive_local(), Some(*dt.offset()))
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(DynamicValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(DynamicValue::from(true).kind(), DynamicKind::Bool);
        assert_eq!(DynamicValue::from(3).kind(), DynamicKind::Int);
        assert_eq!(DynamicValue::from(3.5).kind(), DynamicKind::Float);
        assert_eq!(DynamicValue::from("s").kind(), DynamicKind::String);
        assert_eq!(DynamicValue::from(None::<i64>).kind(), DynamicKind::Null);
        assert_eq!(DynamicValue::Bytes(vec![1]).kind(), DynamicKind::Bytes);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(DynamicKind::String.to_string(), "str");
        assert_eq!(DynamicKind::DateTime.to_string(), "datetime");
    }

    #[test]
    fn test_offset_datetime() {
        let dt = chrono::DateTime::parse_from_rfc3339("1979-05-27T00:32:00-07:00").unwrap();
        match DynamicValue::from(dt) {
            DynamicValue::DateTime(naive, Some(offset)) => {
                assert_eq!(naive.to_string(), "1979-05-27 00:32:00");
                assert_eq!(offset.local_minus_utc(), -7 * 3600);
            }
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn test_mapping_lookup() {
        let value = DynamicValue::Mapping(vec![
            (DynamicValue::Int(1), DynamicValue::from("int key")),
            (DynamicValue::from("k"), DynamicValue::from(2)),
        ]);
        assert_eq!(value.get("k"), Some(&DynamicValue::Int(2)));
        assert_eq!(value.get("1"), None);
        assert_eq!(DynamicValue::from(1).get("k"), None);
    }
}
