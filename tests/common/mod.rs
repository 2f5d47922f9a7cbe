// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for the integration tests.

use cfgtree::service::Configuration;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

/// A TOML document exercising every parameter kind.
#[allow(dead_code)]
pub const SAMPLE_TOML: &str = r#"
[section1]
my-bool = true
my-int = 42
my-float = 2.5
my-string = "hello"
my-date = 2022-12-01
my-time = 08:30:00
my-datetime = 2022-12-01T08:30:00+01:00

[values]
arr = [1, 2, 3]

[values.other]
arr2 = [1, { int2 = 2 }]
"#;

/// Parses [`SAMPLE_TOML`].
#[allow(dead_code)]
pub fn sample() -> Configuration {
    Configuration::load_toml_str(SAMPLE_TOML).expect("sample document must parse")
}

/// Writes `content` to a temporary file with the given suffix (e.g. ".toml").
#[allow(dead_code)]
pub fn temp_file_with(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("failed to create temporary file");
    write!(file, "{}", content).expect("failed to write temporary file");
    file.flush().expect("failed to flush temporary file");
    file
}
