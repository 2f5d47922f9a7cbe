// SPDX-License-Identifier: MIT OR Apache-2.0

//! libconfig format adapter.
//!
//! Supports the libconfig grammar:
//!
//! - settings `name = value;` (`:` may replace `=`, `,` or nothing may replace `;`)
//! - groups `{ ... }`, arrays `[ ... ]` (scalars of one kind) and lists `( ... )`
//! - booleans (case-insensitive), decimal/hex/binary/octal integers with an
//!   optional `L` suffix, floats, and strings with escapes; adjacent string
//!   literals are concatenated
//! - `#`, `//` and `/* */` comments
//!
//! `@include` directives are rejected. libconfig has no calendar types, so
//! dates and times are written as strings.

use crate::domain::config_key::is_valid_name;
use crate::domain::{ConfigError, ConfigValue, Group, Result};
use crate::ports::{ConfigParser, ConfigSerializer};

/// libconfig parser and serializer.
///
/// # Examples
///
/// ```rust
/// use cfgtree::adapters::LibconfigFormat;
/// use cfgtree::domain::ConfigValue;
/// use cfgtree::ports::ConfigParser;
///
/// let group = LibconfigFormat::new()
///     .parse("app = { name = \"demo\"; ports = [80, 443]; };")
///     .unwrap();
/// let app = group.get("app").unwrap().as_group().unwrap();
/// assert_eq!(app.get("name"), Some(&ConfigValue::from("demo")));
/// assert_eq!(app.get("ports").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LibconfigFormat;

impl LibconfigFormat {
    /// Creates a new libconfig format adapter.
    pub fn new() -> Self {
        LibconfigFormat
    }
}

impl ConfigParser for LibconfigFormat {
    fn name(&self) -> &str {
        "libconfig"
    }

    fn parse(&self, content: &str) -> Result<Group> {
        Parser::new(content).parse_settings(None)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["cfg", "conf", "libconfig"]
    }
}

impl ConfigSerializer for LibconfigFormat {
    fn name(&self) -> &str {
        "libconfig"
    }

    fn serialize(&self, group: &Group) -> Result<String> {
        let mut out = String::new();
        write_members(&mut out, group, 0)?;
        Ok(out)
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(content: &str) -> Self {
        Self {
            chars: content.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl AsRef<str>) -> ConfigError {
        let consumed = &self.chars[..self.pos.min(self.chars.len())];
        let line = consumed.iter().filter(|&&c| c == '\n').count() + 1;
        let column = consumed.iter().rev().take_while(|&&c| c != '\n').count() + 1;
        ConfigError::parse_error(format!(
            "Invalid libconfig document: {} (line {}, column {})",
            message.as_ref(),
            line,
            column
        ))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        loop {
            match (self.peek(), self.peek_next()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.pos += 1;
                }
                (Some('#'), _) | (Some('/'), Some('/')) => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.pos += 1;
                    }
                }
                (Some('/'), Some('*')) => {
                    self.pos += 2;
                    loop {
                        match (self.peek(), self.peek_next()) {
                            (Some('*'), Some('/')) => {
                                self.pos += 2;
                                break;
                            }
                            (Some(_), _) => self.pos += 1,
                            (None, _) => return Err(self.error("unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    // Parses settings until `closing` (or the end of input for the root).
    fn parse_settings(&mut self, closing: Option<char>) -> Result<Group> {
        let mut group = Group::new();
        loop {
            self.skip_whitespace()?;
            match self.peek() {
                None => {
                    return match closing {
                        Some(c) => Err(self.error(format!("unexpected end of input, expected `{}`", c))),
                        None => Ok(group),
                    }
                }
                Some(c) if Some(c) == closing => {
                    self.pos += 1;
                    return Ok(group);
                }
                Some('@') => return Err(self.error("include directives are not supported")),
                _ => {}
            }

            let name = self.parse_name()?;
            self.skip_whitespace()?;
            match self.bump() {
                Some('=') | Some(':') => {}
                _ => {
                    return Err(self.error(format!(
                        "expected `=` or `:` after setting name `{}`",
                        name
                    )))
                }
            }
            self.skip_whitespace()?;
            let value = self.parse_value()?;
            if group.contains_key(&name) {
                return Err(self.error(format!("duplicate setting `{}`", name)));
            }
            group.insert(name, value)?;

            self.skip_whitespace()?;
            if matches!(self.peek(), Some(';') | Some(',')) {
                self.pos += 1;
            }
        }
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || "_-*".contains(c)) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        if name.is_empty() {
            return Err(self.error("expected a setting name"));
        }
        if !is_valid_name(&name) {
            return Err(self.error(format!(
                "`{}` is not a valid parameter name! Names may only contain \
                 alphanumeric characters, `-` and `_`",
                name
            )));
        }
        Ok(name)
    }

    fn parse_value(&mut self) -> Result<ConfigValue> {
        match self.peek() {
            Some('{') => {
                self.pos += 1;
                Ok(ConfigValue::Group(self.parse_settings(Some('}'))?))
            }
            Some('[') => {
                self.pos += 1;
                Ok(ConfigValue::List(self.parse_elements(']', true)?))
            }
            Some('(') => {
                self.pos += 1;
                Ok(ConfigValue::List(self.parse_elements(')', false)?))
            }
            Some('"') => Ok(ConfigValue::String(self.parse_string()?)),
            Some(c) if c.is_ascii_alphabetic() => self.parse_keyword(),
            Some(c) if c.is_ascii_digit() || "+-.".contains(c) => self.parse_number(),
            Some(c) => Err(self.error(format!("unexpected character `{}`", c))),
            None => Err(self.error("unexpected end of input, expected a value")),
        }
    }

    fn parse_elements(&mut self, closing: char, scalars_only: bool) -> Result<Vec<ConfigValue>> {
        let mut items: Vec<ConfigValue> = Vec::new();
        loop {
            self.skip_whitespace()?;
            if self.peek() == Some(closing) {
                self.pos += 1;
                return Ok(items);
            }
            let value = self.parse_value()?;
            if scalars_only {
                if !value.is_scalar() {
                    return Err(self.error("arrays may only contain scalar values, use a list instead"));
                }
                if let Some(first) = items.first() {
                    if first.config_type() != value.config_type() {
                        return Err(self.error(format!(
                            "array elements must all have the same type, found `{}` and `{}`",
                            first.config_type(),
                            value.config_type()
                        )));
                    }
                }
            }
            items.push(value);

            self.skip_whitespace()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == closing => {}
                Some(c) => {
                    return Err(self.error(format!("expected `,` or `{}`, found `{}`", closing, c)))
                }
                None => {
                    return Err(self.error(format!("unexpected end of input, expected `{}`", closing)))
                }
            }
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        let mut out = String::new();
        loop {
            // Opening quote
            self.pos += 1;
            loop {
                match self.bump() {
                    None => return Err(self.error("unterminated string")),
                    Some('"') => break,
                    Some('\\') => out.push(self.parse_escape()?),
                    Some(c) => out.push(c),
                }
            }
            // Adjacent literals are concatenated.
            self.skip_whitespace()?;
            if self.peek() != Some('"') {
                return Ok(out);
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char> {
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some('f') => Ok('\u{0c}'),
            Some('\\') => Ok('\\'),
            Some('"') => Ok('"'),
            Some('x') => {
                let digits: String = self.chars[self.pos..].iter().take(2).collect();
                let byte = u8::from_str_radix(&digits, 16)
                    .ok()
                    .filter(|_| digits.len() == 2)
                    .ok_or_else(|| self.error(format!("invalid escape `\\x{}`", digits)))?;
                self.pos += 2;
                Ok(char::from(byte))
            }
            Some(c) => Err(self.error(format!("invalid escape `\\{}`", c))),
            None => Err(self.error("unterminated string")),
        }
    }

    fn parse_keyword(&mut self) -> Result<ConfigValue> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.to_ascii_lowercase().as_str() {
            "true" => Ok(ConfigValue::Boolean(true)),
            "false" => Ok(ConfigValue::Boolean(false)),
            _ => {
                self.pos = start;
                Err(self.error(format!("unexpected `{}`, expected a value", word)))
            }
        }
    }

    fn parse_number(&mut self) -> Result<ConfigValue> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || "+-.".contains(c)) {
            self.pos += 1;
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        parse_number_token(&token).ok_or_else(|| {
            self.pos = start;
            self.error(format!("invalid number `{}`", token))
        })
    }
}

fn parse_number_token(token: &str) -> Option<ConfigValue> {
    let (negative, unsigned) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let lower = unsigned.to_ascii_lowercase();

    let radix = match lower.get(..2) {
        Some("0x") => Some(16),
        Some("0b") => Some(2),
        Some("0o") => Some(8),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = strip_integer_suffix(&lower[2..]);
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        // Values outside the signed 64-bit range are rejected, not wrapped.
        let signed = if negative {
            format!("-{}", digits)
        } else {
            digits.to_string()
        };
        return i64::from_str_radix(&signed, radix).ok().map(ConfigValue::Integer);
    }

    if lower.contains('.') || lower.contains('e') {
        if !lower.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        let value: f64 = unsigned.parse().ok()?;
        return Some(ConfigValue::FloatingPoint(if negative { -value } else { value }));
    }

    let digits = strip_integer_suffix(&lower);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let signed = if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    };
    signed.parse::<i64>().ok().map(ConfigValue::Integer)
}

fn strip_integer_suffix(digits: &str) -> &str {
    digits
        .strip_suffix("ll")
        .or_else(|| digits.strip_suffix('l'))
        .unwrap_or(digits)
}

const INDENT: &str = "  ";

fn write_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_members(out: &mut String, group: &Group, depth: usize) -> Result<()> {
    for (name, value) in group.iter() {
        write_indent(out, depth);
        out.push_str(name);
        out.push_str(" = ");
        write_value(out, value, depth)?;
        out.push_str(";\n");
    }
    Ok(())
}

fn write_value(out: &mut String, value: &ConfigValue, depth: usize) -> Result<()> {
    match value {
        ConfigValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        ConfigValue::Integer(i) => {
            out.push_str(&i.to_string());
            if i32::try_from(*i).is_err() {
                out.push('L');
            }
        }
        ConfigValue::FloatingPoint(f) => {
            if !f.is_finite() {
                return Err(ConfigError::value_error(format!(
                    "Cannot represent the floating point value {} in libconfig!",
                    f
                )));
            }
            // Debug formatting always keeps a fraction or an exponent.
            out.push_str(&format!("{:?}", f));
        }
        ConfigValue::String(s) => write_string(out, s),
        ConfigValue::Date(d) => write_string(out, &d.to_string()),
        ConfigValue::Time(t) => write_string(out, &t.to_string()),
        ConfigValue::DateTime(dt) => write_string(out, &dt.to_string()),
        ConfigValue::List(items) => {
            let is_array = items.iter().all(ConfigValue::is_scalar)
                && items
                    .windows(2)
                    .all(|w| w[0].config_type() == w[1].config_type());
            let (open, close) = if is_array { ("[ ", " ]") } else { ("( ", " )") };
            out.push_str(open);
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_value(out, item, depth)?;
            }
            out.push_str(close);
        }
        ConfigValue::Group(group) => {
            out.push_str("{\n");
            write_members(out, group, depth + 1)?;
            write_indent(out, depth);
            out.push('}');
        }
    }
    Ok(())
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigType;

    fn parse(content: &str) -> Group {
        LibconfigFormat::new().parse(content).unwrap()
    }

    fn parse_err(content: &str) -> ConfigError {
        LibconfigFormat::new().parse(content).unwrap_err()
    }

    #[test]
    fn test_libconfig_scalars() {
        let group = parse(
            r#"
            flag = TRUE;
            off: false
            int = -42;
            hex = 0x1F;
            big = 9223372036854775807L;
            ratio = 1.5e3;
            small = .25;
            name = "hello";
            "#,
        );
        assert_eq!(group.get("flag"), Some(&ConfigValue::Boolean(true)));
        assert_eq!(group.get("off"), Some(&ConfigValue::Boolean(false)));
        assert_eq!(group.get("int"), Some(&ConfigValue::Integer(-42)));
        assert_eq!(group.get("hex"), Some(&ConfigValue::Integer(31)));
        assert_eq!(group.get("big"), Some(&ConfigValue::Integer(i64::MAX)));
        assert_eq!(group.get("ratio"), Some(&ConfigValue::FloatingPoint(1500.0)));
        assert_eq!(group.get("small"), Some(&ConfigValue::FloatingPoint(0.25)));
        assert_eq!(group.get("name"), Some(&ConfigValue::from("hello")));
    }

    #[test]
    fn test_libconfig_comments_and_separators() {
        let group = parse(
            "# hash comment\n// line comment\n/* block\n comment */ a = 1, b : 2\nc = 3;",
        );
        assert_eq!(group.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_libconfig_strings() {
        let group = parse(r#"s = "line\n" "tab\t" "quote\"" "\x41";"#);
        assert_eq!(group.get("s"), Some(&ConfigValue::from("line\ntab\tquote\"A")));
    }

    #[test]
    fn test_libconfig_structures() {
        let group = parse(
            r#"
            application: {
              window: { title = "My Application"; size = { w = 640; h = 480; }; };
              list = ( ( "abc", 123, true ), 1.234, ( /* an empty list */ ) );
              books = ( { title = "Treasure Island"; price = 29.95; },
                        { title = "Snow Crash"; price = 9.99; } );
              misc: { pi = 3.141592654; columns = [ "Last Name", "First Name" ]; };
            };
            "#,
        );
        let app = group.get("application").unwrap().as_group().unwrap();
        let list = app.get("list").unwrap().as_list().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].config_type(), ConfigType::List);
        assert!(list[2].is_empty());
        let books = app.get("books").unwrap().as_list().unwrap();
        assert_eq!(books[1].as_group().unwrap().get("price"), Some(&ConfigValue::from(9.99)));
    }

    #[test]
    fn test_libconfig_array_rules() {
        assert!(parse_err("a = [1, \"two\"];").is_parse_error());
        assert!(parse_err("a = [ { x = 1; } ];").is_parse_error());
        assert_eq!(parse("a = [1, 2, ];").get("a").unwrap().len(), 2);
    }

    #[test]
    fn test_libconfig_errors_report_location() {
        let err = parse_err("a = 1;\nb = ;");
        assert!(err.to_string().contains("line 2"), "{}", err);
        assert!(parse_err("a = 1; a = 2;").to_string().contains("duplicate"));
        assert!(parse_err("a = { b = 1;").is_parse_error());
        assert!(parse_err("a = \"open").is_parse_error());
        assert!(parse_err("@include \"other.cfg\"").is_parse_error());
        assert!(parse_err("a = 99999999999999999999;").is_parse_error());
        assert!(parse_err("a* = 1;").is_parse_error());
    }

    #[test]
    fn test_libconfig_serializer_round_trip() {
        let original = parse(
            r#"
            name = "demo \"quoted\"";
            big = 5000000000L;
            ratio = 0.1;
            values = { arr = [1, 2, 3]; mixed = ( 1, "a", { x = true; } ); empty = [ ]; };
            "#,
        );
        let text = LibconfigFormat::new().serialize(&original).unwrap();
        assert!(text.contains("big = 5000000000L;"));
        assert_eq!(parse(&text), original);
    }

    #[test]
    fn test_libconfig_serializer_rejects_nan() {
        let mut group = Group::new();
        group.insert("x", ConfigValue::from(f64::NAN)).unwrap();
        assert!(LibconfigFormat::new().serialize(&group).unwrap_err().is_value_error());
    }

    #[test]
    fn test_number_tokens() {
        assert_eq!(parse_number_token("0b101"), Some(ConfigValue::Integer(5)));
        assert_eq!(parse_number_token("-0x10"), Some(ConfigValue::Integer(-16)));
        assert_eq!(parse_number_token("12LL"), Some(ConfigValue::Integer(12)));
        assert_eq!(parse_number_token("1e-3"), Some(ConfigValue::FloatingPoint(0.001)));
        assert_eq!(parse_number_token("-"), None);
        assert_eq!(parse_number_token("."), None);
        assert_eq!(parse_number_token("12abc"), None);
        assert_eq!(parse_number_token("0x"), None);
        assert_eq!(parse_number_token("0x-5"), None);
    }

    #[test]
    fn test_radix_integers_out_of_range_are_rejected() {
        assert_eq!(
            parse_number_token("0x7FFFFFFFFFFFFFFF"),
            Some(ConfigValue::Integer(i64::MAX))
        );
        assert_eq!(
            parse_number_token("-0x8000000000000000"),
            Some(ConfigValue::Integer(i64::MIN))
        );
        assert_eq!(parse_number_token("0xFFFFFFFFFFFFFFFF"), None);
        assert_eq!(parse_number_token("0x8000000000000000L"), None);
        assert!(parse_err("mask = 0xFFFFFFFFFFFFFFFF;").is_parse_error());
    }
}
