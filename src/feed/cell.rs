//! Typed feed cells.

use std::fmt;

/// A single value from a feed record or a store result row.
///
/// Typing is positional and column-name independent: the same rule is
/// applied to every field of every record.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Empty field.
    Null,
    /// Field that parses as a 64-bit integer.
    Integer(i64),
    /// Field that parses as a float but not as an integer.
    Float(f64),
    /// Anything else, kept verbatim.
    Text(String),
}

impl Cell {
    /// Cast a raw field: empty → null, then integer, then float, else text.
    ///
    /// # Examples
    ///
    /// ```
    /// use haproxy_check::feed::Cell;
    ///
    /// assert_eq!(Cell::cast(""), Cell::Null);
    /// assert_eq!(Cell::cast("5"), Cell::Integer(5));
    /// assert_eq!(Cell::cast("5.5"), Cell::Float(5.5));
    /// assert_eq!(Cell::cast("abc"), Cell::Text("abc".to_string()));
    /// ```
    pub fn cast(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Null;
        }
        if let Ok(value) = raw.parse::<i64>() {
            return Self::Integer(value);
        }
        if let Ok(value) = raw.parse::<f64>() {
            return Self::Float(value);
        }
        Self::Text(raw.to_string())
    }

    /// Whether this cell is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the cell; `None` for null and text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Null | Self::Text(_) => None,
        }
    }

    /// Integer view of the cell; `None` unless it holds an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}
