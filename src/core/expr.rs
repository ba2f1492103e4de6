//! # Expressions
//!
//! Single-variable functions carried by functional chain nodes.
//!
//! Functions are parsed into a small AST and evaluated numerically; there is
//! no simplification, no symbolic manipulation beyond substitution, and no
//! dynamic code evaluation.
//!
//! ## Grammar
//!
//! ```text
//! kmr     := sum (('⊙' | '⊘') sum)*
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := '-' unary | power
//! power   := primary (('^' | '**') unary)?
//! primary := number | var | 'pi' | 'e' | builtin '(' kmr ')' | '(' kmr ')'
//! ```
//!
//! KMR operators bind loosest, so `x + 1 ⊙ 2` is `(x + 1) ⊙ 2`.

use std::f64::consts;
use std::fmt;

use thiserror::Error;

use crate::core::operator::BinaryOp;

/// Built-in single-argument functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Builtin {
    Sqrt,
    Exp,
    /// Natural logarithm
    Ln,
    /// Natural logarithm, alias of `ln`
    Log,
    Sin,
    Cos,
    Tan,
    Abs,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Sqrt => "sqrt",
            Builtin::Exp => "exp",
            Builtin::Ln => "ln",
            Builtin::Log => "log",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
            Builtin::Abs => "abs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Builtin::Sqrt),
            "exp" => Some(Builtin::Exp),
            "ln" => Some(Builtin::Ln),
            "log" => Some(Builtin::Log),
            "sin" => Some(Builtin::Sin),
            "cos" => Some(Builtin::Cos),
            "tan" => Some(Builtin::Tan),
            "abs" => Some(Builtin::Abs),
            _ => None,
        }
    }

    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Builtin::Sqrt => x.sqrt(),
            Builtin::Exp => x.exp(),
            Builtin::Ln | Builtin::Log => x.ln(),
            Builtin::Sin => x.sin(),
            Builtin::Cos => x.cos(),
            Builtin::Tan => x.tan(),
            Builtin::Abs => x.abs(),
        }
    }
}

/// Expression tree over one variable
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    /// The variable
    Var,
    Const(f64),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Builtin, Box<Expr>),
}

impl Expr {
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn pow(base: Expr, exponent: Expr) -> Self {
        Expr::Pow(Box::new(base), Box::new(exponent))
    }

    pub fn call(builtin: Builtin, arg: Expr) -> Self {
        Expr::Call(builtin, Box::new(arg))
    }

    /// Predefined functions by name
    ///
    /// `identity square cube reciprocal` plus every [`Builtin`] name.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "identity" => Some(Expr::Var),
            "square" => Some(Expr::pow(Expr::Var, Expr::Const(2.0))),
            "cube" => Some(Expr::pow(Expr::Var, Expr::Const(3.0))),
            "reciprocal" => Some(Expr::binary(BinaryOp::Div, Expr::Const(1.0), Expr::Var)),
            other => Builtin::from_name(other).map(|b| Expr::call(b, Expr::Var)),
        }
    }

    /// A predefined name, or else an expression in `x`
    pub fn resolve(src: &str) -> Result<Self, ParseError> {
        match Expr::named(src.trim()) {
            Some(expr) => Ok(expr),
            None => Expr::parse(src),
        }
    }

    /// Parse an expression in `x`
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        Expr::parse_with_var(src, "x")
    }

    /// Parse an expression in the given variable name
    pub fn parse_with_var(src: &str, var: &str) -> Result<Self, ParseError> {
        Parser::new(src, var).parse_full()
    }

    /// Evaluate at `x`
    ///
    /// Singular KMR steps and division by zero evaluate to NaN.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Var => x,
            Expr::Const(v) => *v,
            Expr::Neg(e) => -e.eval(x),
            Expr::Binary(op, l, r) => op.apply(l.eval(x), r.eval(x)),
            Expr::Pow(b, e) => b.eval(x).powf(e.eval(x)),
            Expr::Call(f, arg) => f.apply(arg.eval(x)),
        }
    }

    /// `self(inner(x))`
    pub fn compose(&self, inner: &Expr) -> Expr {
        match self {
            Expr::Var => inner.clone(),
            Expr::Const(v) => Expr::Const(*v),
            Expr::Neg(e) => Expr::Neg(Box::new(e.compose(inner))),
            Expr::Binary(op, l, r) => Expr::binary(*op, l.compose(inner), r.compose(inner)),
            Expr::Pow(b, e) => Expr::pow(b.compose(inner), e.compose(inner)),
            Expr::Call(f, arg) => Expr::call(*f, arg.compose(inner)),
        }
    }

    /// True if the variable does not occur
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Var => false,
            Expr::Const(_) => true,
            Expr::Neg(e) | Expr::Call(_, e) => e.is_constant(),
            Expr::Binary(_, l, r) | Expr::Pow(l, r) => l.is_constant() && r.is_constant(),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

/// Fully parenthesized, re-parseable rendering in `x`
///
/// Non-finite constants print as `nan`, `inf` and `(-inf)`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Var => f.write_str("x"),
            Expr::Const(v) if v.is_nan() => f.write_str("nan"),
            Expr::Const(v) if *v < 0.0 => write!(f, "({v})"),
            Expr::Const(v) => write!(f, "{v}"),
            Expr::Neg(e) => write!(f, "-({e})"),
            Expr::Binary(op, l, r) => write!(f, "({l} {op} {r})"),
            Expr::Pow(b, e) => write!(f, "({b} ^ {e})"),
            Expr::Call(func, arg) => write!(f, "{}({arg})", func.name()),
        }
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// Why parsing failed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("empty expression")]
    Empty,

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

/// Parse failure with its byte offset in the source
#[derive(Error, Debug, Clone, PartialEq)]
#[error("expression parse error at {position}: {kind}")]
pub struct ParseError {
    pub position: usize,
    pub kind: ParseErrorKind,
}

struct Parser<'a> {
    chars: Vec<(usize, char)>,
    pos: usize,
    len: usize,
    var: &'a str,
}

impl<'a> Parser<'a> {
    fn new(src: &str, var: &'a str) -> Self {
        Self {
            chars: src.char_indices().collect(),
            pos: 0,
            len: src.len(),
            var,
        }
    }

    fn parse_full(mut self) -> Result<Expr, ParseError> {
        self.skip_ws();
        if self.peek().is_none() {
            return Err(self.error(ParseErrorKind::Empty));
        }

        let expr = self.kmr()?;

        self.skip_ws();
        match self.peek() {
            None => Ok(expr),
            Some(c) => Err(self.error(ParseErrorKind::UnexpectedChar(c))),
        }
    }

    fn kmr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.sum()?;
        loop {
            let op = match self.peek_op() {
                Some('⊙') => BinaryOp::Direct,
                Some('⊘') => BinaryOp::Inverse,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.sum()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn sum(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek_op() {
                Some('+') => BinaryOp::Add,
                Some('-') => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.product()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn product(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek_op() {
                // `**` is power, handled further down
                Some('*') if self.peek_at(1) != Some('*') => BinaryOp::Mul,
                Some('/') => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.peek_op() == Some('-') {
            self.pos += 1;
            return Ok(match self.unary()? {
                Expr::Const(v) => Expr::Const(-v),
                other => Expr::Neg(Box::new(other)),
            });
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.primary()?;
        match self.peek_op() {
            Some('^') => self.pos += 1,
            Some('*') if self.peek_at(1) == Some('*') => self.pos += 2,
            _ => return Ok(base),
        }
        let exponent = self.unary()?;
        Ok(Expr::pow(base, exponent))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        self.skip_ws();
        let Some(c) = self.peek() else {
            return Err(self.error(ParseErrorKind::UnexpectedEnd));
        };

        if c == '(' {
            self.pos += 1;
            let inner = self.kmr()?;
            self.expect(')')?;
            return Ok(inner);
        }
        if c.is_ascii_digit() || c == '.' {
            return self.number();
        }
        if c.is_alphabetic() || c == '_' {
            return self.identifier();
        }

        Err(self.error(ParseErrorKind::UnexpectedChar(c)))
    }

    fn number(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }

        // Exponent only if digits follow, so `2e` stays `2` then `e`
        if matches!(self.peek(), Some('e' | 'E')) {
            let digit_at = match self.peek_at(1) {
                Some('+' | '-') => 2,
                _ => 1,
            };
            if matches!(self.peek_at(digit_at), Some(c) if c.is_ascii_digit()) {
                self.pos += digit_at;
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }

        let text = self.slice(start, self.pos);
        text.parse::<f64>().map(Expr::Const).map_err(|_| ParseError {
            position: self.offset(start),
            kind: ParseErrorKind::InvalidNumber(text),
        })
    }

    fn identifier(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let name = self.slice(start, self.pos);

        if name == self.var {
            return Ok(Expr::Var);
        }
        if let Some(builtin) = Builtin::from_name(&name) {
            if self.peek_op() == Some('(') {
                self.pos += 1;
                let arg = self.kmr()?;
                self.expect(')')?;
                return Ok(Expr::call(builtin, arg));
            }
        }
        if name == "pi" {
            return Ok(Expr::Const(consts::PI));
        }
        if name == "e" {
            return Ok(Expr::Const(consts::E));
        }
        if name == "nan" {
            return Ok(Expr::Const(f64::NAN));
        }
        if name == "inf" {
            return Ok(Expr::Const(f64::INFINITY));
        }
        Err(ParseError {
            position: self.offset(start),
            kind: ParseErrorKind::UnknownIdentifier(name),
        })
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek_op() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(ParseErrorKind::UnexpectedChar(c))),
            None => Err(self.error(ParseErrorKind::UnexpectedEnd)),
        }
    }

    /// Next non-whitespace character
    fn peek_op(&mut self) -> Option<char> {
        self.skip_ws();
        self.peek()
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|&(_, c)| c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().map(|&(_, c)| c).collect()
    }

    /// Byte offset of a char index
    fn offset(&self, index: usize) -> usize {
        self.chars.get(index).map_or(self.len, |&(offset, _)| offset)
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            position: self.offset(self.pos),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, x: f64) -> f64 {
        Expr::parse(src).unwrap().eval(x)
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("x**2 + 2*x + 1", 3.0), 16.0);
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("8 / 4 / 2", 0.0), 1.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval("2 ** 3 ** 2", 0.0), 512.0);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-x", 2.0), -2.0);
        assert_eq!(eval("-2 ^ 2", 0.0), -4.0);
        assert_eq!(eval("(-2) ^ 2", 0.0), 4.0);
        assert_eq!(eval("3 - -2", 0.0), 5.0);
        assert_eq!(Expr::parse("-2").unwrap(), Expr::Const(-2.0));
    }

    #[test]
    fn test_kmr_operators() {
        // Binds loosest, left to right
        assert_eq!(eval("x ⊙ 3", 2.0), 2.0 / 7.0);
        assert_eq!(eval("x + 1 ⊙ 2", 1.0), 2.0 / 5.0);
        let chained = eval("2 ⊙ 3 ⊘ 3", 0.0);
        assert!((chained - 2.0).abs() < 1e-12);
        assert!(eval("2 ⊙ -0.5", 0.0).is_nan());
    }

    #[test]
    fn test_builtins_and_constants() {
        assert!((eval("sin(pi / 2)", 0.0) - 1.0).abs() < 1e-15);
        assert!((eval("ln(e)", 0.0) - 1.0).abs() < 1e-15);
        assert_eq!(eval("sqrt(x)", 16.0), 4.0);
        assert_eq!(eval("abs(x - 5)", 2.0), 3.0);
        assert!((eval("exp(0) + cos(0)", 0.0) - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(eval("1.5e3", 0.0), 1500.0);
        assert_eq!(eval("2E-2", 0.0), 0.02);
        // No exponent digits, so `e` is left over
        assert!(Expr::parse("2e").is_err());
        assert_eq!(eval("2*e", 0.0), 2.0 * consts::E);
    }

    #[test]
    fn test_custom_variable() {
        let expr = Expr::parse_with_var("t^2 + 1", "t").unwrap();
        assert_eq!(expr.eval(3.0), 10.0);
        assert!(Expr::parse("t^2").is_err());
    }

    #[test]
    fn test_named_functions() {
        assert_eq!(Expr::named("identity").unwrap().eval(7.0), 7.0);
        assert_eq!(Expr::named("square").unwrap().eval(3.0), 9.0);
        assert_eq!(Expr::named("cube").unwrap().eval(2.0), 8.0);
        assert_eq!(Expr::named("reciprocal").unwrap().eval(4.0), 0.25);
        assert_eq!(Expr::named("sqrt").unwrap().eval(9.0), 3.0);
        assert!(Expr::named("frobnicate").is_none());

        assert_eq!(Expr::resolve("square").unwrap(), Expr::named("square").unwrap());
        assert_eq!(Expr::resolve("x + 1").unwrap().eval(1.0), 2.0);
    }

    #[test]
    fn test_parse_errors() {
        let err = Expr::parse("").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Empty);

        let err = Expr::parse("x +").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEnd);
        assert_eq!(err.position, 3);

        let err = Expr::parse("x + y").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownIdentifier("y".to_string()));
        assert_eq!(err.position, 4);

        let err = Expr::parse("(x + 1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEnd);

        let err = Expr::parse("x $ 2").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedChar('$'));

        let err = Expr::parse("1.2.3").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber("1.2.3".to_string()));
    }

    #[test]
    fn test_error_position_is_byte_offset() {
        // '⊙' is three bytes wide
        let err = Expr::parse("x ⊙ y").unwrap_err();
        assert_eq!(err.position, 6);
    }

    #[test]
    fn test_compose() {
        let square = Expr::named("square").unwrap();
        let sin = Expr::named("sin").unwrap();

        // square(sin(x))
        let composed = square.compose(&sin);
        let x = 0.7_f64;
        assert!((composed.eval(x) - x.sin().powi(2)).abs() < 1e-15);
    }

    #[test]
    fn test_display_reparses() {
        for src in [
            "x**2 + 2*x + 1",
            "-2 ^ x",
            "sin(x ⊙ 2) ⊘ 0.5",
            "(x - -3) / abs(x)",
            "1e-7 * x",
        ] {
            let expr = Expr::parse(src).unwrap();
            let again = Expr::parse(&expr.to_string()).unwrap();
            assert_eq!(again, expr, "{src} -> {expr}");
        }
    }

    #[test]
    fn test_display_reparses_non_finite() {
        let with_nan = Expr::binary(BinaryOp::Add, Expr::Var, Expr::Const(f64::NAN));
        assert_eq!(with_nan.to_string(), "(x + nan)");
        let again = Expr::parse(&with_nan.to_string()).unwrap();
        assert!(again.eval(1.0).is_nan());

        for v in [f64::INFINITY, f64::NEG_INFINITY] {
            let expr = Expr::binary(BinaryOp::Mul, Expr::Var, Expr::Const(v));
            assert_eq!(Expr::parse(&expr.to_string()).unwrap(), expr, "{expr}");
        }
    }

    #[test]
    fn test_is_constant() {
        assert!(Expr::parse("2 * pi").unwrap().is_constant());
        assert!(!Expr::parse("2 * x").unwrap().is_constant());
    }
}
