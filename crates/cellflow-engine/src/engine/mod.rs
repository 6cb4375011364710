//! Formula engine API.
//!
//! This module provides the pure, grid-agnostic half of the spreadsheet:
//!
//! - [`CellRef`] - Cell identifier parsing (A1 notation ↔ column/row indices)
//! - [`extract_references`] - Find the cells a formula mentions
//! - [`parse_formula`] - Tokenize and parse formula text into an [`Expr`]
//! - [`evaluate`] - Evaluate an [`Expr`] against a [`CellResolver`]
//! - [`Value`], [`format_number`] - Evaluated values and their display text

mod cell_ref;
mod deps;
mod eval;
mod expr;
mod value;

pub use cell_ref::CellRef;
pub use deps::{extract_reference_names, extract_references};
pub use eval::{CellResolver, EvalError, evaluate, evaluate_constant};
pub use expr::{BinaryOp, Expr, ExprError, MAX_NESTING_DEPTH, parse_formula};
pub use value::{Value, format_number};

/// Prefix marking a cell's raw text as a formula.
pub const FORMULA_PREFIX: char = '=';

/// Return the formula body if `raw` is a formula (`=A1+1` -> `A1+1`).
///
/// Leading whitespace before the sentinel is tolerated.
pub fn formula_body(raw: &str) -> Option<&str> {
    raw.trim_start().strip_prefix(FORMULA_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::formula_body;

    #[test]
    fn test_formula_body() {
        assert_eq!(formula_body("=A1+1"), Some("A1+1"));
        assert_eq!(formula_body("  =1"), Some("1"));
        assert_eq!(formula_body("5"), None);
        assert_eq!(formula_body(""), None);
        assert_eq!(formula_body("a=b"), None);
    }
}
