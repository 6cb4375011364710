//! Line-oriented command session over a document.
//!
//! Commands, one per line:
//!
//! ```text
//! A1 5            commit a literal
//! B1 =A1+1        commit a formula
//! A1              clear a cell
//! get B1          print the display value
//! raw B1          print the raw text
//! deps A1         print the cells that depend on A1
//! formulas        list every formula cell
//! eval 2*(3+4)    evaluate a constant expression
//! show            print the populated part of the grid
//! ```

use regex::Regex;
use std::collections::BTreeSet;
use std::io::Write;
use std::sync::OnceLock;

use crate::error::{Result, SessionError};
use cellflow_core::Document;
use cellflow_engine::engine::{CellRef, evaluate_constant};

pub struct Session {
    pub doc: Document,
}

impl Session {
    pub fn new(doc: Document) -> Self {
        Session { doc }
    }

    /// Execute one command line, writing any output to `out`.
    pub fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<()> {
        let line = line.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim_start()),
            None => (trimmed, ""),
        };

        match command {
            "show" => write!(out, "{}", render_grid(&self.doc))?,
            "formulas" => {
                for (cell, formula) in self.doc.list_formula_cells() {
                    writeln!(out, "{}: {}", cell, formula)?;
                }
            }
            "get" => {
                let cell = required(rest, "get")?;
                writeln!(out, "{}", self.doc.get_display(cell)?)?;
            }
            "raw" => {
                let cell = required(rest, "raw")?;
                writeln!(out, "{}", self.doc.get_raw(cell)?)?;
            }
            "deps" => {
                let cell = self.doc.config().parse_cell(required(rest, "deps")?)?;
                let deps = self.doc.dependents(&cell);
                writeln!(out, "{}", join_cells(&deps))?;
            }
            "eval" => {
                let expr = required(rest, "eval")?;
                writeln!(out, "{}", evaluate_constant(expr)?)?;
            }
            cell if cell_token_re().is_match(cell) => self.doc.commit(cell, rest)?,
            other => return Err(SessionError::UnknownCommand(other.to_string())),
        }
        Ok(())
    }
}

fn required<'a>(arg: &'a str, command: &'static str) -> Result<&'a str> {
    let arg = arg.trim();
    if arg.is_empty() {
        Err(SessionError::MissingArgument(command))
    } else {
        Ok(arg)
    }
}

fn cell_token_re() -> &'static Regex {
    static CELL_TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    CELL_TOKEN_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z]+[0-9]+$").expect("cell token regex must compile")
    })
}

fn join_cells(cells: &[CellRef]) -> String {
    if cells.is_empty() {
        return "(none)".to_string();
    }
    cells
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the display values as an aligned text table.
///
/// Only rows and columns holding at least one populated cell are shown, so
/// the cost follows the number of cells entered, not the grid size.
pub fn render_grid(doc: &Document) -> String {
    let rows: BTreeSet<usize> = doc.store().iter().map(|(cell, _)| cell.row).collect();
    let cols: BTreeSet<usize> = doc.store().iter().map(|(cell, _)| cell.col).collect();
    let Some(&last_row) = rows.last() else {
        return String::new();
    };
    let label_width = (last_row + 1).to_string().len();

    let widths: Vec<(usize, usize)> = cols
        .iter()
        .map(|&col| {
            let header = CellRef::col_to_letters(col).len();
            let width = rows
                .iter()
                .map(|&row| doc.display(&CellRef::new(col, row)).chars().count())
                .fold(header, usize::max);
            (col, width)
        })
        .collect();

    let mut out = String::new();
    let mut line = " ".repeat(label_width);
    for &(col, width) in &widths {
        line.push_str(&format!(" | {:<width$}", CellRef::col_to_letters(col)));
    }
    out.push_str(line.trim_end());
    out.push('\n');

    for &row in &rows {
        let mut line = format!("{:>label_width$}", row + 1);
        for &(col, width) in &widths {
            let value = doc.display(&CellRef::new(col, row));
            line.push_str(&format!(" | {:<width$}", value));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellflow_core::{CellflowError, GridConfig};
    use pretty_assertions::assert_eq;

    fn run(session: &mut Session, line: &str) -> String {
        let mut out = Vec::new();
        session.execute(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_commit_and_get() {
        let mut session = Session::new(Document::new());
        run(&mut session, "A1 5");
        run(&mut session, "B1 =A1 + 1");
        assert_eq!(run(&mut session, "get B1"), "6\n");
        assert_eq!(run(&mut session, "raw B1"), "=A1 + 1\n");
    }

    #[test]
    fn test_bare_cell_clears() {
        let mut session = Session::new(Document::new());
        run(&mut session, "A1 hello");
        run(&mut session, "A1");
        assert_eq!(run(&mut session, "get A1"), "\n");
    }

    #[test]
    fn test_formulas_and_deps() {
        let mut session = Session::new(Document::new());
        run(&mut session, "A1 2");
        run(&mut session, "C1 =A1*A1");
        run(&mut session, "B1 =A1+1");
        assert_eq!(run(&mut session, "formulas"), "B1: =A1+1\nC1: =A1*A1\n");
        assert_eq!(run(&mut session, "deps A1"), "B1, C1\n");
        assert_eq!(run(&mut session, "deps B1"), "(none)\n");
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let mut session = Session::new(Document::new());
        assert_eq!(run(&mut session, ""), "");
        assert_eq!(run(&mut session, "   # note"), "");
    }

    #[test]
    fn test_eval_constant() {
        let mut session = Session::new(Document::new());
        assert_eq!(run(&mut session, "eval 2 * (3 + 4)"), "14\n");
    }

    #[test]
    fn test_errors() {
        let mut session = Session::new(Document::new());
        let mut out = Vec::new();
        assert!(matches!(
            session.execute("frobnicate", &mut out),
            Err(SessionError::UnknownCommand(_))
        ));
        assert!(matches!(
            session.execute("get", &mut out),
            Err(SessionError::MissingArgument("get"))
        ));
        assert!(matches!(
            session.execute("A1 =Z99", &mut out),
            Err(SessionError::Cellflow(CellflowError::UnknownReference(_)))
        ));
        assert!(matches!(
            session.execute("a1 5", &mut out),
            Err(SessionError::Cellflow(CellflowError::UnknownReference(_)))
        ));
    }

    #[test]
    fn test_render_grid() {
        let mut doc = Document::with_config(GridConfig::new(2, 3)).unwrap();
        doc.commit("A1", "5").unwrap();
        doc.commit("B1", "=A1*100").unwrap();
        doc.commit("C2", "x").unwrap();
        assert_eq!(
            render_grid(&doc),
            "  | A | B   | C\n1 | 5 | 500 |\n2 |   |     | x\n"
        );
    }

    #[test]
    fn test_render_grid_skips_empty_rows_and_columns() {
        let mut doc = Document::with_config(GridConfig::new(1_000_000, 18_278)).unwrap();
        assert_eq!(render_grid(&doc), "");

        doc.commit("C1", "7").unwrap();
        doc.commit("ZZZ1000000", "=C1*6").unwrap();
        assert_eq!(
            render_grid(&doc),
            "        | C | ZZZ\n      1 | 7 |\n1000000 |   | 42\n"
        );
    }
}
