// SPDX-License-Identifier: MIT OR Apache-2.0

//! A typed, hierarchical configuration tree.
//!
//! This crate loads structured configuration documents (TOML, JSON, YAML and
//! libconfig) into an in-memory tree of named parameters and offers
//! type-checked read and write access to it, addressed by fully-qualified
//! names such as `"values.other.arr2[1].int2"`.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: The tree itself (`ConfigValue`, `Group`), parameter
//!   names (`ConfigKey`), their resolution and the error type
//! - **Ports**: Trait definitions for the collaborators (`ConfigParser`,
//!   `ConfigSerializer`) and the dynamic host-value model (`DynamicValue`)
//! - **Adapters**: Document formats, file access and the dynamic-value bridge
//! - **Service**: The `Configuration` and `ConfigView` handles and the typed
//!   accessors they share (`ParameterAccess`)
//!
//! # Rules
//!
//! - Every parameter has a kind (boolean, integer, floating point, string,
//!   date, time, date-time, list or group). Writing a value of another kind to
//!   an existing parameter is a `TypeError`.
//! - Writing a missing parameter creates it, including missing parent groups.
//!   Lists are never created implicitly by indexing.
//! - Negative list indices count from the end.
//! - Views share storage with their configuration; `copy()` does not.
//!
//! # Feature Flags
//!
//! - `yaml`: Enable YAML document support (default)
//!
//! # Quick Start
//!
//! ```rust
//! use cfgtree::prelude::*;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut config = Configuration::load_toml_str(
//!     r#"
//! [section1]
//! my-bool = true
//! paths = ["data", "/var/log"]
//! "#,
//! )?;
//!
//! assert!(config.get_boolean("section1.my-bool")?);
//! assert_eq!(config.get_string("section1.paths[-1]")?, "/var/log");
//!
//! config.set_integer("section1.retries", 3)?;
//! let err = config.get_string("section1.retries").unwrap_err();
//! assert!(err.is_type_error());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        ConfigError, ConfigKey, ConfigType, ConfigValue, Date, DateTime, Group, Result, Time,
        TimeOffset,
    };
    pub use crate::ports::{ConfigParser, ConfigSerializer, DynamicKind, DynamicValue};
    pub use crate::service::{ConfigView, Configuration, ParameterAccess};

    pub use crate::adapters::{JsonFormat, LibconfigFormat, NullValuePolicy, TomlFormat};
    #[cfg(feature = "yaml")]
    pub use crate::adapters::YamlFormat;
}
