// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the interfaces to the collaborators of the configuration
//! tree: document parsers and serializers, and the dynamic host-value model.
//! They are implemented by adapters in the adapters layer.

pub mod dynamic;
pub mod parser;
pub mod serializer;

// Re-export commonly used types
pub use dynamic::{DynamicKind, DynamicValue};
pub use parser::ConfigParser;
pub use serializer::ConfigSerializer;
