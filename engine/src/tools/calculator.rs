//! Arithmetic calculator tool
//!
//! Evaluates plain arithmetic with a small recursive-descent parser.
//! Supported: `+ - * / // % **`, unary sign and parentheses. Integer
//! arithmetic stays integral except for `/`, which always produces a
//! float. `//` and `%` floor toward negative infinity.
//!
//! Input is restricted to digits, operators, parentheses, `.` and spaces.
//! Every failure is reported as text so the participant can still use it.

use async_trait::async_trait;
use sdk::tool::Tool;
use sdk::types::{ToolError, ToolOutput};
use std::fmt;

const ALLOWED_CHARS: &str = "0123456789+-*/()% .";

/// Deepest nesting of parentheses, unary signs and exponents accepted
const MAX_DEPTH: usize = 256;

/// Calculator tool
#[derive(Debug, Default, Clone)]
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate an expression into the text shown to the participant
    pub fn calculate(&self, expression: &str) -> String {
        if !expression.chars().all(|c| ALLOWED_CHARS.contains(c)) {
            return "Error: Invalid characters in expression".to_string();
        }

        match evaluate(expression) {
            Ok(value) => format!("Result: {}", value),
            Err(CalcError::DivisionByZero) => "Error: Division by zero".to_string(),
            Err(e) => {
                tracing::warn!("Calculation failed: {}", e);
                format!("Calculation error: {}", e)
            }
        }
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Evaluate an arithmetic expression (+ - * / // % ** and parentheses)"
    }

    async fn execute(&self, query: &str) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(self.calculate(query)))
    }
}

/// Evaluation failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalcError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid syntax: {0}")]
    Syntax(String),

    #[error("integer overflow")]
    Overflow,
}

/// Numeric value: integers until a float enters the computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
}

/// Parse and evaluate an expression
pub fn evaluate(expression: &str) -> Result<Number, CalcError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    match parser.peek() {
        None => Ok(value),
        Some(token) => Err(CalcError::Syntax(format!("unexpected {:?}", token))),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' => {
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_number(&literal)?));
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::DoubleStar);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::DoubleSlash);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => return Err(CalcError::Syntax(format!("unexpected character '{}'", other))),
        }
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> Result<Number, CalcError> {
    if literal.contains('.') {
        if literal == "." || literal.matches('.').count() > 1 {
            return Err(CalcError::Syntax(format!("invalid number '{}'", literal)));
        }
        literal
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| CalcError::Syntax(format!("invalid number '{}'", literal)))
    } else {
        literal.parse::<i64>().map(Number::Int).map_err(|_| CalcError::Overflow)
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Number, CalcError> {
        let mut left = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.advance();
            let right = self.term()?;
            left = apply(op, left, right)?;
        }
        Ok(left)
    }

    // term := factor (('*' | '/' | '//' | '%') factor)*
    fn term(&mut self) -> Result<Number, CalcError> {
        let mut left = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)) =
            self.peek()
        {
            self.advance();
            let right = self.factor()?;
            left = apply(op, left, right)?;
        }
        Ok(left)
    }

    // Every recursive path re-enters through here, so this bounds the stack
    fn factor(&mut self) -> Result<Number, CalcError> {
        if self.depth >= MAX_DEPTH {
            return Err(CalcError::Syntax("expression too deeply nested".to_string()));
        }

        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    // factor := ('+' | '-') factor | power
    fn signed(&mut self) -> Result<Number, CalcError> {
        match self.peek() {
            Some(Token::Plus) => {
                self.advance();
                self.factor()
            }
            Some(Token::Minus) => {
                self.advance();
                negate(self.factor()?)
            }
            _ => self.power(),
        }
    }

    // power := atom ('**' factor)?
    fn power(&mut self) -> Result<Number, CalcError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::DoubleStar) {
            self.advance();
            let exponent = self.factor()?;
            return pow(base, exponent);
        }
        Ok(base)
    }

    // atom := number | '(' expr ')'
    fn atom(&mut self) -> Result<Number, CalcError> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(CalcError::Syntax("missing ')'".to_string())),
                }
            }
            Some(token) => Err(CalcError::Syntax(format!("unexpected {:?}", token))),
            None => Err(CalcError::Syntax("unexpected end of expression".to_string())),
        }
    }
}

fn negate(value: Number) -> Result<Number, CalcError> {
    match value {
        Number::Int(i) => i.checked_neg().map(Number::Int).ok_or(CalcError::Overflow),
        Number::Float(f) => Ok(Number::Float(-f)),
    }
}

fn apply(op: Token, left: Number, right: Number) -> Result<Number, CalcError> {
    if matches!(op, Token::Slash | Token::DoubleSlash | Token::Percent) && right.is_zero() {
        return Err(CalcError::DivisionByZero);
    }

    match (left, right) {
        (Number::Int(a), Number::Int(b)) => {
            let result = match op {
                Token::Plus => a.checked_add(b),
                Token::Minus => a.checked_sub(b),
                Token::Star => a.checked_mul(b),
                Token::Slash => return Ok(Number::Float(a as f64 / b as f64)),
                Token::DoubleSlash => floor_div(a, b),
                Token::Percent => floor_mod(a, b),
                _ => return Err(CalcError::Syntax(format!("unexpected {:?}", op))),
            };
            result.map(Number::Int).ok_or(CalcError::Overflow)
        }
        _ => {
            let (a, b) = (left.as_f64(), right.as_f64());
            let result = match op {
                Token::Plus => a + b,
                Token::Minus => a - b,
                Token::Star => a * b,
                Token::Slash => a / b,
                Token::DoubleSlash => (a / b).floor(),
                Token::Percent => a - b * (a / b).floor(),
                _ => return Err(CalcError::Syntax(format!("unexpected {:?}", op))),
            };
            Ok(Number::Float(result))
        }
    }
}

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        r.checked_add(b)
    } else {
        Some(r)
    }
}

fn pow(base: Number, exponent: Number) -> Result<Number, CalcError> {
    match (base, exponent) {
        (Number::Int(b), Number::Int(e)) if e >= 0 => {
            let e = u32::try_from(e).map_err(|_| CalcError::Overflow)?;
            b.checked_pow(e).map(Number::Int).ok_or(CalcError::Overflow)
        }
        _ => {
            if base.is_zero() && exponent.as_f64() < 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            Ok(Number::Float(base.as_f64().powf(exponent.as_f64())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc(expr: &str) -> String {
        CalculatorTool::new().calculate(expr)
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(calc("5 + 3"), "Result: 8");
        assert_eq!(calc("2 + 3 * 4"), "Result: 14");
        assert_eq!(calc("(2 + 3) * 4"), "Result: 20");
        assert_eq!(calc("10 - 2 - 3"), "Result: 5");
    }

    #[test]
    fn test_true_division_yields_float() {
        assert_eq!(calc("7 / 2"), "Result: 3.5");
        assert_eq!(calc("4 / 2"), "Result: 2.0");
    }

    #[test]
    fn test_floor_division_and_modulo() {
        assert_eq!(calc("7 // 2"), "Result: 3");
        assert_eq!(calc("-7 // 2"), "Result: -4");
        assert_eq!(calc("7 % 3"), "Result: 1");
        assert_eq!(calc("-7 % 3"), "Result: 2");
        assert_eq!(calc("7.5 // 2"), "Result: 3.0");
    }

    #[test]
    fn test_power_and_unary() {
        assert_eq!(calc("2 ** 10"), "Result: 1024");
        assert_eq!(calc("-2 ** 2"), "Result: -4");
        assert_eq!(calc("2 ** 3 ** 2"), "Result: 512");
        assert_eq!(calc("2 ** -1"), "Result: 0.5");
        assert_eq!(calc("--3"), "Result: 3");
    }

    #[test]
    fn test_float_literals() {
        assert_eq!(calc("1.5 + 1.5"), "Result: 3.0");
        assert_eq!(calc("0.1 * 3"), "Result: 0.30000000000000004");
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(calc("1 / 0"), "Error: Division by zero");
        assert_eq!(calc("1 // 0"), "Error: Division by zero");
        assert_eq!(calc("5 % 0"), "Error: Division by zero");
        assert_eq!(calc("1 / 0.0"), "Error: Division by zero");
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(calc("2 + x"), "Error: Invalid characters in expression");
        assert_eq!(calc("__import__"), "Error: Invalid characters in expression");
    }

    #[test]
    fn test_syntax_errors() {
        assert!(calc("2 +").starts_with("Calculation error:"));
        assert!(calc("(1 + 2").starts_with("Calculation error:"));
        assert!(calc("1 2").starts_with("Calculation error:"));
        assert!(calc("").starts_with("Calculation error:"));
        assert!(calc("1..2").starts_with("Calculation error:"));
    }

    #[test]
    fn test_overflow_is_reported() {
        assert_eq!(calc("9999999999 * 9999999999"), "Calculation error: integer overflow");
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let depth = 20_000;
        let nested = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(
            calc(&nested),
            "Calculation error: invalid syntax: expression too deeply nested"
        );

        let signs = format!("{}1", "-".repeat(depth));
        assert!(calc(&signs).starts_with("Calculation error:"));

        let tower = vec!["2"; depth].join("**");
        assert!(calc(&tower).starts_with("Calculation error:"));
    }

    #[test]
    fn test_moderate_nesting_still_evaluates() {
        let nested = format!("{}1 + 1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(calc(&nested), "Result: 2");
    }

    #[tokio::test]
    async fn test_tool_execute() {
        let tool = CalculatorTool::new();
        assert_eq!(tool.name(), "calculate");
        let output = tool.execute("6 * 7").await.unwrap();
        assert_eq!(output, ToolOutput::text("Result: 42"));
    }
}
