//! Evaluated cell values and their display formatting.

use std::fmt;

/// The result of evaluating a formula or interpreting a literal cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Empty,
    Number(f64),
    Text(String),
}

impl Value {
    /// Interpret the raw text of a literal (non-formula) cell.
    /// - Empty string or whitespace -> Empty
    /// - Valid number -> Number
    /// - Otherwise -> Text (untrimmed)
    pub fn from_literal(raw: &str) -> Value {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Display string for the grid.
    pub fn to_display(&self) -> String {
        match self {
            Value::Empty => String::new(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

/// Format a number for display.
///
/// Integral values print without a fractional part; everything else uses
/// the shortest representation that round-trips, after snapping away
/// binary noise such as `0.30000000000000004`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        let snapped: f64 = format!("{:.12}", n).parse().unwrap_or(n);
        let text = snapped.to_string();
        if text == "-0" { "0".to_string() } else { text }
    }
}
