//! Compound parameter strings
//!
//! Commands such as `qr`, `barcode` and `image` accept a single string that
//! packs a primary value and named options:
//!
//! ```text
//! https://example.com, size=4, ec=0, center=true
//! ```
//!
//! Segments are separated by `", "` (comma followed by one space). The first
//! segment is the content; every later segment is `key=value`, split on the
//! first `=`. Segments without `=` are ignored.

use std::collections::HashMap;
use std::fmt;

use crate::error::ParamError;

/// Separator between segments of a compound string
pub const SEPARATOR: &str = ", ";

/// Coerced value of one named parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ParamValue {
    /// Coerce a trimmed raw value
    ///
    /// `true`/`false` (any case) are booleans, plain digit strings that fit an
    /// `i64` are integers, a value wrapped in matching quotes loses them, and
    /// everything else stays a string. A leading `-` is not numeric.
    pub fn coerce(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if !raw.is_empty()
            && raw.bytes().all(|b| b.is_ascii_digit())
            && let Ok(n) = raw.parse::<i64>()
        {
            return Self::Int(n);
        }
        for quote in ['\'', '"'] {
            if raw.starts_with(quote) && raw.ends_with(quote) {
                // A lone quote is both ends of itself and leaves nothing
                let inner = raw.get(1..raw.len() - 1).unwrap_or("");
                return Self::Str(inner.to_string());
            }
        }
        Self::Str(raw.to_string())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Str(_) => "string",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Parsed compound string: content plus named parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMap {
    content: ParamValue,
    params: HashMap<String, ParamValue>,
}

impl ParameterMap {
    /// Parse a compound string. Never fails.
    pub fn parse(input: &str) -> Self {
        let mut segments = input.split(SEPARATOR);
        let mut content = segments.next().map(|s| ParamValue::Str(s.trim().to_string()));
        let mut params = HashMap::new();

        for segment in segments {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = ParamValue::coerce(value.trim());
            if key == "content" {
                content = Some(value);
            } else {
                params.insert(key.to_string(), value);
            }
        }

        Self {
            content: content.unwrap_or_else(|| ParamValue::Str(input.trim().to_string())),
            params,
        }
    }

    /// Primary value, rendered as text
    pub fn content(&self) -> String {
        self.content.to_string()
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        if key == "content" {
            return Some(&self.content);
        }
        self.params.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of named parameters, content excluded
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, ParamError> {
        match self.get(key) {
            None => Ok(default),
            Some(ParamValue::Bool(b)) => Ok(*b),
            Some(other) => Err(wrong_type(key, "boolean", other)),
        }
    }

    pub fn int_or(&self, key: &str, default: i64) -> Result<i64, ParamError> {
        match self.get(key) {
            None => Ok(default),
            Some(ParamValue::Int(n)) => Ok(*n),
            Some(other) => Err(wrong_type(key, "integer", other)),
        }
    }

    /// Integer within `min..=max`
    pub fn int_in(&self, key: &str, default: i64, min: i64, max: i64) -> Result<i64, ParamError> {
        let value = self.int_or(key, default)?;
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(ParamError::OutOfRange {
                key: key.to_string(),
                value,
                min,
                max,
            })
        }
    }

    pub fn str_or(&self, key: &str, default: &str) -> Result<String, ParamError> {
        Ok(self.opt_str(key)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<String>, ParamError> {
        match self.get(key) {
            None => Ok(None),
            Some(ParamValue::Str(s)) => Ok(Some(s.clone())),
            Some(other) => Err(wrong_type(key, "string", other)),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &ParamValue) -> ParamError {
    ParamError::WrongType {
        key: key.to_string(),
        expected,
        found: format!("{} {}", found.type_name(), found),
    }
}
