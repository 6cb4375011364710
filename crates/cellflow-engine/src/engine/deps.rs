//! Reference extraction from formula strings.
//!
//! Finds every cell identifier (e.g., `A1`, `C12`) a formula mentions.
//! The result feeds the reverse-dependency graph: each extracted
//! reference gains the formula's cell as a dependent.
//!
//! Handles:
//! - Simple cell references: `A1`, `B2`
//! - Duplicate mentions (`A1*A1`) collapse to one reference
//! - Ignores references inside string literals (`"A1"`)
//!
//! A token only counts when it stands alone: `XA1_` or `2A1` contain no
//! reference, matching how the expression lexer splits the same text.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::cell_ref::CellRef;

/// Extract the distinct cell references in a formula, in order of first
/// appearance.
pub fn extract_references(formula: &str) -> Vec<CellRef> {
    let formula = strip_string_literals(formula);
    let mut seen = HashSet::new();
    let mut refs = Vec::new();

    for caps in cell_ref_re().captures_iter(&formula) {
        if let Some(cr) = CellRef::from_str(&caps[0])
            && seen.insert(cr.clone())
        {
            refs.push(cr);
        }
    }

    refs
}

/// Extract references as raw identifier strings, including ones that do
/// not name a valid cell (such as `A0`). Used to report unknown references
/// by the name the user typed.
pub fn extract_reference_names(formula: &str) -> Vec<String> {
    let formula = strip_string_literals(formula);
    let mut names: Vec<String> = Vec::new();
    for m in cell_ref_re().find_iter(&formula) {
        if !names.iter().any(|n| n == m.as_str()) {
            names.push(m.as_str().to_string());
        }
    }
    names
}

fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"\b[A-Z]+[0-9]+\b").expect("reference regex must compile")
    })
}

fn strip_string_literals(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in formula.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(' ');
                continue;
            }
            if ch == '\\' {
                escaped = true;
                out.push(' ');
                continue;
            }
            if ch == '"' {
                in_string = false;
                out.push('"');
            } else {
                out.push(' ');
            }
        } else if ch == '"' {
            in_string = true;
            out.push('"');
        } else {
            out.push(ch);
        }
    }

    out
}
