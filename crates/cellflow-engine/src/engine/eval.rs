//! Expression evaluation.
//!
//! Walks an [`Expr`] tree, asking a [`CellResolver`] for the value of each
//! referenced cell. The resolver owns everything cell-related (recursion
//! into other formulas, memoization, cycle tracking); this module only
//! knows arithmetic.

use super::cell_ref::CellRef;
use super::expr::{BinaryOp, Expr, ExprError};
use super::value::Value;

/// Supplies the current value of a referenced cell.
pub trait CellResolver {
    type Error;

    fn resolve(&mut self, cell: &CellRef) -> Result<Value, Self::Error>;
}

/// Failure while evaluating: either the expression itself is invalid, or
/// the resolver could not produce a referenced value.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError<E> {
    Expr(ExprError),
    Resolve(E),
}

impl<E> From<ExprError> for EvalError<E> {
    fn from(err: ExprError) -> Self {
        EvalError::Expr(err)
    }
}

/// Evaluate an expression tree.
pub fn evaluate<R: CellResolver>(
    expr: &Expr,
    resolver: &mut R,
) -> Result<Value, EvalError<R::Error>> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),
        Expr::Ref(cell) => resolver.resolve(cell).map_err(EvalError::Resolve),
        Expr::Neg(inner) => {
            let value = evaluate(inner, resolver)?;
            let n = as_number('-', &value)?;
            Ok(Value::Number(-n))
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, resolver)?;
            let right = evaluate(right, resolver)?;
            Ok(apply_binary(*op, &left, &right)?)
        }
    }
}

/// Evaluate formula text that contains no cell references.
pub fn evaluate_constant(formula: &str) -> Result<Value, ExprError> {
    struct NoCells;

    impl CellResolver for NoCells {
        type Error = ExprError;

        fn resolve(&mut self, cell: &CellRef) -> Result<Value, ExprError> {
            Err(ExprError::UnknownIdentifier(cell.to_string()))
        }
    }

    let expr = super::expr::parse_formula(formula)?;
    evaluate(&expr, &mut NoCells).map_err(|err| match err {
        EvalError::Expr(e) | EvalError::Resolve(e) => e,
    })
}

fn as_number(op: char, value: &Value) -> Result<f64, ExprError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Empty => Err(ExprError::NonNumericOperand {
            op,
            found: "an empty cell".to_string(),
        }),
        Value::Text(s) => Err(ExprError::NonNumericOperand {
            op,
            found: format!("text \"{}\"", s),
        }),
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExprError> {
    if op == BinaryOp::Concat {
        return Ok(Value::Text(format!(
            "{}{}",
            left.to_display(),
            right.to_display()
        )));
    }

    let symbol = op.symbol();
    let a = as_number(symbol, left)?;
    let b = as_number(symbol, right)?;

    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div | BinaryOp::Rem if b == 0.0 => return Err(ExprError::DivisionByZero),
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::Pow => a.powf(b),
        BinaryOp::Concat => unreachable!("handled above"),
    };

    if result.is_finite() {
        Ok(Value::Number(result))
    } else {
        Err(ExprError::NotFinite)
    }
}
