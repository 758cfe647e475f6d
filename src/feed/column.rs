//! Sanitized column identifiers.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::feed::FeedError;

/// Identifier substituted for a header field named `-`.
pub const DASH_PLACEHOLDER: &str = "dash";

fn column_pattern() -> &'static Regex {
    static COLUMN_REGEX: OnceLock<Regex> = OnceLock::new();
    COLUMN_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("failed to compile column regex"))
}

/// A column name taken from the feed header.
///
/// Only ASCII alphanumerics, `_` and `-` are accepted, which is what makes it
/// safe to interpolate into DDL text. Values never take this path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnName(String);

impl ColumnName {
    /// Validate a raw header field.
    ///
    /// # Errors
    /// Returns [`FeedError::IllegalColumnName`] carrying the offending field.
    pub fn parse(raw: &str) -> Result<Self, FeedError> {
        if !column_pattern().is_match(raw) {
            return Err(FeedError::IllegalColumnName(raw.to_string()));
        }
        if raw == "-" {
            return Ok(Self(DASH_PLACEHOLDER.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// The identifier as declared in the store.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bracket-quoted SQL identifier.
    ///
    /// SQLite never reinterprets a bracketed identifier as a string literal,
    /// so a missing column always fails the statement.
    pub fn quoted(&self) -> String {
        quote_identifier(&self.0)
    }
}

impl AsRef<str> for ColumnName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bracket-quote an identifier that is already known to be safe.
fn quote_identifier(name: &str) -> String {
    format!("[{name}]")
}
