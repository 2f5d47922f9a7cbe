// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and algorithms.
//!
//! This module contains the configuration tree itself: parameter values and
//! their kinds, groups, fully-qualified names and their resolution. It performs
//! no I/O and is independent of any document format.

pub mod casts;
pub mod config_key;
pub mod config_value;
pub mod datetime;
pub mod errors;
pub mod group;
pub mod matcher;
pub mod resolver;

// Re-export commonly used types
pub use casts::Numeric;
pub use config_key::{ConfigKey, KeyStep};
pub use config_value::{ConfigType, ConfigValue, ScalarType};
pub use datetime::{Date, DateTime, Time, TimeOffset};
pub use errors::{ConfigError, Result};
pub use group::Group;
