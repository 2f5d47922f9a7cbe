// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the configuration handles.
//!
//! [`Configuration`] owns a configuration tree, [`ConfigView`] aliases a part
//! of one. Both implement [`ParameterAccess`], the typed accessor interface.

pub mod access;
pub mod configuration;
pub mod view;

// Re-export commonly used types
pub use access::ParameterAccess;
pub use configuration::Configuration;
pub use view::ConfigView;
