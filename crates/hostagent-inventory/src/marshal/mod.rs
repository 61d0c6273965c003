//! Gatherer output parsers
//!
//! Pure functions, one per fact category. Three grammars are understood:
//! whitespace-separated columns ([`Fields`]), `Key: value` lines
//! ([`KeyValues`]) and comma-separated guest listings.

mod filesystem;
mod host;
mod vms;

use std::collections::HashMap;
use std::str::{FromStr, SplitWhitespace};

pub use filesystem::filesystems;
pub use host::host;
pub use vms::{ovm_vms, vms, vmware_vms};

use crate::error::MarshalError;

/// Cursor over the whitespace-separated columns of one line
///
/// Columns are consumed strictly left to right. Reading past the last
/// column yields an empty token.
#[derive(Debug)]
pub struct Fields<'a> {
    tokens: SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    #[must_use]
    pub fn new(line: &'a str) -> Self {
        Self {
            tokens: line.split_whitespace(),
        }
    }

    /// Next column as text
    pub fn text(&mut self) -> &'a str {
        self.tokens.next().unwrap_or("")
    }

    /// Discard the next column without looking at it
    pub fn skip(&mut self) {
        self.tokens.next();
    }

    /// Next column as an integer
    ///
    /// # Errors
    /// Returns `MarshalError::Conversion` naming the token if it is not an integer.
    pub fn int(&mut self, field: &'static str) -> Result<i64, MarshalError> {
        convert(field, self.text())
    }
}

/// `Key: value` pairs of one gatherer report
///
/// Keys are unique, the last occurrence wins. Lines without a colon are
/// ignored. Lookups of absent keys return the zero value of the field type.
#[derive(Debug, Default)]
pub struct KeyValues {
    entries: HashMap<String, String>,
}

impl KeyValues {
    #[must_use]
    pub fn parse(output: &str) -> Self {
        let entries = output
            .lines()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
        Self { entries }
    }

    /// Value of `key`, or an empty string when absent
    #[must_use]
    pub fn text(&self, key: &str) -> String {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    /// Value of `key` as an integer, 0 when absent or empty
    ///
    /// # Errors
    /// Returns `MarshalError::Conversion` when a value is present but not an integer.
    pub fn int(&self, key: &'static str) -> Result<i64, MarshalError> {
        self.number(key)
    }

    /// Value of `key` as a float, 0.0 when absent or empty
    ///
    /// # Errors
    /// Returns `MarshalError::Conversion` when a value is present but not a number.
    pub fn float(&self, key: &'static str) -> Result<f64, MarshalError> {
        self.number(key)
    }

    fn number<T>(&self, key: &'static str) -> Result<T, MarshalError>
    where
        T: FromStr + Default,
        T::Err: std::fmt::Display,
    {
        match self.entries.get(key).map(String::as_str) {
            None | Some("") => Ok(T::default()),
            Some(value) => convert(key, value),
        }
    }
}

/// Interpret a boolean column
///
/// `y`, `yes`, `true`, `1` and `on` (any case) are true. Every other token,
/// including unrecognized ones, is false.
#[must_use]
pub fn parse_bool(token: &str) -> bool {
    matches!(
        token.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "true" | "1" | "on"
    )
}

fn convert<T>(field: &'static str, token: &str) -> Result<T, MarshalError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    token
        .trim()
        .parse()
        .map_err(|e: T::Err| MarshalError::Conversion {
            field,
            token: token.to_string(),
            reason: e.to_string(),
        })
}
