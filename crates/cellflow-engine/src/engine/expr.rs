//! Formula expression parser.
//!
//! Converts formula text (sentinel already stripped) into an [`Expr`] tree.
//! Supports: numbers, string literals, cell refs (A1), parentheses,
//! unary `+`/`-`, arithmetic (`+ - * / % ^`) and text concatenation (`&`).
//!
//! Precedence, lowest first:
//!
//! ```text
//! &            left associative
//! + -          left associative
//! * / %        left associative
//! unary + -
//! ^            right associative, so -2^2 == -(2^2)
//! ```

use thiserror::Error;

use super::cell_ref::CellRef;

/// Deepest expression tree the parser builds. Counts parentheses, unary
/// signs and operator chains, so `((1))`, `--1` and `1+1+1` all nest.
/// Evaluation recurses over the tree, so this also bounds evaluation depth.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Errors raised while tokenizing, parsing or evaluating an expression.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("empty formula")]
    Empty,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("malformed number '{0}'")]
    MalformedNumber(String),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("operator '{op}' needs numbers, found {found}")]
    NonNumericOperand { op: char, found: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NotFinite,

    #[error("formula nests deeper than {} levels", MAX_NESTING_DEPTH)]
    TooDeeplyNested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Concat,
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Rem => '%',
            BinaryOp::Pow => '^',
            BinaryOp::Concat => '&',
        }
    }
}

/// Parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Text(String),
    Ref(CellRef),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Text(String),
    Ref(CellRef),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Ampersand,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::Text(s) => format!("string \"{}\"", s),
            Token::Ref(r) => format!("reference {}", r),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Caret => "'^'".to_string(),
            Token::Ampersand => "'&'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
        }
    }
}

/// Parse formula text into an expression tree.
pub fn parse_formula(formula: &str) -> Result<Expr, ExprError> {
    let tokens = tokenize(formula)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let (expr, _) = parser.parse_concat()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(ExprError::UnexpectedToken(tok.describe())),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '+' | '-' | '*' | '/' | '%' | '^' | '&' | '(' | ')' => {
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '^' => Token::Caret,
                    '&' => Token::Ampersand,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
                chars.next();
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some(ch) = chars.next() {
                    match ch {
                        '\\' => match chars.next() {
                            Some(escaped) => text.push(escaped),
                            None => break,
                        },
                        '"' => {
                            closed = true;
                            break;
                        }
                        _ => text.push(ch),
                    }
                }
                if !closed {
                    return Err(ExprError::UnterminatedString);
                }
                tokens.push(Token::Text(text));
            }
            c if c.is_ascii_digit() || c == '.' => {
                let mut num = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        num.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                // Numbers must not run into identifiers: `2A1` is not `2 * A1`.
                if let Some(&next) = chars.peek()
                    && is_word_char(next)
                {
                    while let Some(&d) = chars.peek() {
                        if !is_word_char(d) && d != '.' {
                            break;
                        }
                        num.push(d);
                        chars.next();
                    }
                    return Err(ExprError::MalformedNumber(num));
                }
                let value = num
                    .parse::<f64>()
                    .map_err(|_| ExprError::MalformedNumber(num.clone()))?;
                tokens.push(Token::Number(value));
            }
            c if is_word_char(c) => {
                let mut word = String::new();
                while let Some(&d) = chars.peek() {
                    if !is_word_char(d) {
                        break;
                    }
                    word.push(d);
                    chars.next();
                }
                match CellRef::from_str(&word) {
                    Some(cell) => tokens.push(Token::Ref(cell)),
                    None => return Err(ExprError::UnknownIdentifier(word)),
                }
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

/// Parsed subtree together with its height.
type Parsed = (Expr, usize);

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Current recursion depth through `parse_unary`.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn node(expr: Expr, height: usize) -> Result<Parsed, ExprError> {
        if height > MAX_NESTING_DEPTH {
            return Err(ExprError::TooDeeplyNested);
        }
        Ok((expr, height))
    }

    fn binary(op: BinaryOp, left: Parsed, right: Parsed) -> Result<Parsed, ExprError> {
        let height = left.1.max(right.1) + 1;
        let expr = Expr::Binary {
            op,
            left: Box::new(left.0),
            right: Box::new(right.0),
        };
        Self::node(expr, height)
    }

    fn parse_concat(&mut self) -> Result<Parsed, ExprError> {
        let mut left = self.parse_add_sub()?;
        while let Some(Token::Ampersand) = self.peek() {
            self.pos += 1;
            let right = self.parse_add_sub()?;
            left = Self::binary(BinaryOp::Concat, left, right)?;
        }
        Ok(left)
    }

    fn parse_add_sub(&mut self) -> Result<Parsed, ExprError> {
        let mut left = self.parse_mul_div()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_mul_div()?;
            left = Self::binary(op, left, right)?;
        }
        Ok(left)
    }

    fn parse_mul_div(&mut self) -> Result<Parsed, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right)?;
        }
        Ok(left)
    }

    // Every recursive path of the grammar passes through here.
    fn parse_unary(&mut self) -> Result<Parsed, ExprError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ExprError::TooDeeplyNested);
        }
        self.depth += 1;
        let parsed = self.parse_signed();
        self.depth -= 1;
        parsed
    }

    fn parse_signed(&mut self) -> Result<Parsed, ExprError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                let (inner, height) = self.parse_unary()?;
                Self::node(Expr::Neg(Box::new(inner)), height + 1)
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Parsed, ExprError> {
        let base = self.parse_primary()?;
        if let Some(Token::Caret) = self.peek() {
            self.pos += 1;
            let exponent = self.parse_unary()?;
            return Self::binary(BinaryOp::Pow, base, exponent);
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Parsed, ExprError> {
        match self.next() {
            Some(Token::Number(n)) => Ok((Expr::Number(n), 1)),
            Some(Token::Text(s)) => Ok((Expr::Text(s), 1)),
            Some(Token::Ref(cell)) => Ok((Expr::Ref(cell), 1)),
            Some(Token::LParen) => {
                let inner = self.parse_concat()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(tok) => Err(ExprError::UnexpectedToken(tok.describe())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(tok) => Err(ExprError::UnexpectedToken(tok.describe())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}
