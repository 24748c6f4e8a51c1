//! The built-in evaluator: a small expression language good enough to
//! author runnable documentation examples against. Assignments persist in
//! a per-instance environment, `print(...)` writes to the captured output,
//! and a final bare expression reports its value representation.

use std::collections::HashMap;
use std::fmt;

use crate::evaluator::{Evaluator, Execution};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Number(f64),
    Boolean(bool),
    Str(String),
    Unit,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Boolean(_) => "Boolean",
            Value::Str(_) => "String",
            Value::Unit => "Unit",
        }
    }

    /// REPL-style representation; Unit is silent.
    fn repr(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(format!("{:?}", s)),
            Value::Unit => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.is_finite() && *n == n.floor() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Unit => write!(f, "()"),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum CalcError {
    Syntax(String),
    UndefinedVariable(String),
    UndefinedFunction(String),
    Type {
        expected: &'static str,
        got: &'static str,
    },
    DivisionByZero,
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::Syntax(msg) => write!(f, "syntax error: {}", msg),
            CalcError::UndefinedVariable(name) => write!(f, "undefined variable: {}", name),
            CalcError::UndefinedFunction(name) => write!(f, "undefined function: {}", name),
            CalcError::Type { expected, got } => {
                write!(f, "type error: expected {}, got {}", expected, got)
            }
            CalcError::DivisionByZero => write!(f, "division by zero"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    True,
    False,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    AndAnd,
    OrOr,
    Bang,
    Question,
    Colon,
    Comma,
    LParen,
    RParen,
    Newline,
}

fn tokenize(source: &str) -> Result<Vec<Token>, CalcError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\r' => i += 1,
            '\n' => {
                // Newlines separate statements only outside brackets.
                if depth == 0 && tokens.last() != Some(&Token::Newline) {
                    tokens.push(Token::Newline);
                }
                i += 1;
            }
            '#' => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '"' => {
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None | Some('\n') => {
                            return Err(CalcError::Syntax("unterminated string".into()));
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            let escaped = match chars.get(i + 1) {
                                Some('n') => '\n',
                                Some('t') => '\t',
                                Some('"') => '"',
                                Some('\\') => '\\',
                                other => {
                                    return Err(CalcError::Syntax(format!(
                                        "unknown escape '\\{}'",
                                        other.copied().map(String::from).unwrap_or_default()
                                    )));
                                }
                            };
                            s.push(escaped);
                            i += 2;
                        }
                        Some(&c) => {
                            s.push(c);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token::Str(s));
            }
            '0'..='9' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| CalcError::Syntax(format!("bad number '{}'", text)))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(word),
                });
            }
            '(' => {
                depth += 1;
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                depth = depth.saturating_sub(1);
                tokens.push(Token::RParen);
                i += 1;
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
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '?' => {
                tokens.push(Token::Question);
                i += 1;
            }
            ':' => {
                tokens.push(Token::Colon);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '=' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::EqEq);
                    i += 2;
                } else {
                    tokens.push(Token::Eq);
                    i += 1;
                }
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::BangEq);
                    i += 2;
                } else {
                    tokens.push(Token::Bang);
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::LtEq);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::GtEq);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::AndAnd);
                    i += 2;
                } else {
                    return Err(CalcError::Syntax("expected '&&'".into()));
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::OrOr);
                    i += 2;
                } else {
                    return Err(CalcError::Syntax("expected '||'".into()));
                }
            }
            other => {
                return Err(CalcError::Syntax(format!("unexpected character '{}'", other)));
            }
        }
    }

    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Expr {
    Number(f64),
    Str(String),
    Boolean(bool),
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy)]
enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy)]
enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
}

#[derive(Debug, Clone)]
enum Stmt {
    Assign { name: String, expr: Expr },
    Expr(Expr),
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser {
    fn new(tokens: Vec<Token>) -> Self {
        ExprParser { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(&Token::Newline) {}
    }

    fn parse_program(mut self) -> Result<Vec<Stmt>, CalcError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_newlines();
            if self.peek().is_none() {
                return Ok(stmts);
            }
            stmts.push(self.parse_stmt()?);
            match self.peek() {
                None => {}
                Some(Token::Newline) => {}
                Some(other) => {
                    return Err(CalcError::Syntax(format!(
                        "unexpected token after statement: {:?}",
                        other
                    )));
                }
            }
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, CalcError> {
        if let (Some(Token::Ident(name)), Some(Token::Eq)) =
            (self.tokens.get(self.pos), self.tokens.get(self.pos + 1))
        {
            let name = name.clone();
            self.pos += 2;
            let expr = self.parse_expr(0)?;
            return Ok(Stmt::Assign { name, expr });
        }
        Ok(Stmt::Expr(self.parse_expr(0)?))
    }

    /// Pratt expression parsing; `min_bp` is the lowest binding power the
    /// caller will accept.
    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, CalcError> {
        let mut left = self.parse_prefix()?;

        loop {
            let Some(op) = self.peek().and_then(binary_op) else {
                break;
            };
            let bp = binding_power(op);
            if bp < min_bp {
                break;
            }
            self.pos += 1;
            let right = self.parse_expr(bp + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        // Ternary binds loosest and associates to the right.
        if min_bp == 0 && self.eat(&Token::Question) {
            let then = self.parse_expr(1)?;
            if !self.eat(&Token::Colon) {
                return Err(CalcError::Syntax("expected ':' in conditional".into()));
            }
            let otherwise = self.parse_expr(0)?;
            left = Expr::Ternary {
                condition: Box::new(left),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, CalcError> {
        match self.bump() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::True) => Ok(Expr::Boolean(true)),
            Some(Token::False) => Ok(Expr::Boolean(false)),
            Some(Token::Minus) => Ok(Expr::Unary {
                op: UnaryOp::Negate,
                operand: Box::new(self.parse_prefix()?),
            }),
            Some(Token::Bang) => Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(self.parse_prefix()?),
            }),
            Some(Token::LParen) => {
                let inner = self.parse_expr(0)?;
                if !self.eat(&Token::RParen) {
                    return Err(CalcError::Syntax("expected ')'".into()));
                }
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let mut args = Vec::new();
                    if !self.eat(&Token::RParen) {
                        loop {
                            args.push(self.parse_expr(0)?);
                            if self.eat(&Token::Comma) {
                                continue;
                            }
                            if self.eat(&Token::RParen) {
                                break;
                            }
                            return Err(CalcError::Syntax("expected ',' or ')'".into()));
                        }
                    }
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(other) => Err(CalcError::Syntax(format!("unexpected token: {:?}", other))),
            None => Err(CalcError::Syntax("unexpected end of input".into())),
        }
    }
}

fn binary_op(token: &Token) -> Option<BinaryOp> {
    match token {
        Token::Plus => Some(BinaryOp::Add),
        Token::Minus => Some(BinaryOp::Subtract),
        Token::Star => Some(BinaryOp::Multiply),
        Token::Slash => Some(BinaryOp::Divide),
        Token::Percent => Some(BinaryOp::Modulo),
        Token::EqEq => Some(BinaryOp::Equal),
        Token::BangEq => Some(BinaryOp::NotEqual),
        Token::Lt => Some(BinaryOp::Less),
        Token::Gt => Some(BinaryOp::Greater),
        Token::LtEq => Some(BinaryOp::LessEq),
        Token::GtEq => Some(BinaryOp::GreaterEq),
        Token::AndAnd => Some(BinaryOp::And),
        Token::OrOr => Some(BinaryOp::Or),
        _ => None,
    }
}

fn binding_power(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 2,
        BinaryOp::And => 3,
        BinaryOp::Equal | BinaryOp::NotEqual => 4,
        BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEq | BinaryOp::GreaterEq => 5,
        BinaryOp::Add | BinaryOp::Subtract => 6,
        BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 7,
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// The shipped `Evaluator`. One instance holds one persistent environment;
/// drop it and build another for a fresh context.
#[derive(Debug, Default)]
pub struct CalcEvaluator {
    env: HashMap<String, Value>,
}

impl CalcEvaluator {
    pub fn new() -> Self {
        CalcEvaluator::default()
    }

    fn run(&mut self, source: &str, out: &mut String) -> Result<Option<Value>, CalcError> {
        let tokens = tokenize(source)?;
        let stmts = ExprParser::new(tokens).parse_program()?;

        let mut last = None;
        for stmt in stmts {
            last = match stmt {
                Stmt::Assign { name, expr } => {
                    let value = self.eval(&expr, out)?;
                    self.env.insert(name, value);
                    None
                }
                Stmt::Expr(expr) => Some(self.eval(&expr, out)?),
            };
        }
        Ok(last)
    }

    fn eval(&mut self, expr: &Expr, out: &mut String) -> Result<Value, CalcError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),

            Expr::Var(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| CalcError::UndefinedVariable(name.clone())),

            Expr::Unary { op, operand } => {
                let value = self.eval(operand, out)?;
                match op {
                    UnaryOp::Negate => Ok(Value::Number(-expect_number(&value)?)),
                    UnaryOp::Not => Ok(Value::Boolean(!expect_boolean(&value)?)),
                }
            }

            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right, out),

            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => {
                let cond = self.eval(condition, out)?;
                if expect_boolean(&cond)? {
                    self.eval(then, out)
                } else {
                    self.eval(otherwise, out)
                }
            }

            Expr::Call { name, args } => {
                if name != "print" {
                    return Err(CalcError::UndefinedFunction(name.clone()));
                }
                let mut rendered = Vec::new();
                for arg in args {
                    rendered.push(self.eval(arg, out)?.to_string());
                }
                out.push_str(&rendered.join(" "));
                out.push('\n');
                Ok(Value::Unit)
            }
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        out: &mut String,
    ) -> Result<Value, CalcError> {
        // Logic short-circuits; everything else evaluates both sides.
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            let l = expect_boolean(&self.eval(left, out)?)?;
            return match (op, l) {
                (BinaryOp::And, false) => Ok(Value::Boolean(false)),
                (BinaryOp::Or, true) => Ok(Value::Boolean(true)),
                _ => Ok(Value::Boolean(expect_boolean(&self.eval(right, out)?)?)),
            };
        }

        let l = self.eval(left, out)?;
        let r = self.eval(right, out)?;

        match op {
            BinaryOp::Add => match (&l, &r) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),
                _ => Err(CalcError::Type {
                    expected: l.type_name(),
                    got: r.type_name(),
                }),
            },
            BinaryOp::Subtract => Ok(Value::Number(expect_number(&l)? - expect_number(&r)?)),
            BinaryOp::Multiply => Ok(Value::Number(expect_number(&l)? * expect_number(&r)?)),
            BinaryOp::Divide => {
                let divisor = expect_number(&r)?;
                if divisor == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                Ok(Value::Number(expect_number(&l)? / divisor))
            }
            BinaryOp::Modulo => {
                let divisor = expect_number(&r)?;
                if divisor == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                Ok(Value::Number(expect_number(&l)? % divisor))
            }
            BinaryOp::Equal => Ok(Value::Boolean(l == r)),
            BinaryOp::NotEqual => Ok(Value::Boolean(l != r)),
            BinaryOp::Less => Ok(Value::Boolean(expect_number(&l)? < expect_number(&r)?)),
            BinaryOp::Greater => Ok(Value::Boolean(expect_number(&l)? > expect_number(&r)?)),
            BinaryOp::LessEq => Ok(Value::Boolean(expect_number(&l)? <= expect_number(&r)?)),
            BinaryOp::GreaterEq => Ok(Value::Boolean(expect_number(&l)? >= expect_number(&r)?)),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }
}

fn expect_number(value: &Value) -> Result<f64, CalcError> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(CalcError::Type {
            expected: "Number",
            got: other.type_name(),
        }),
    }
}

fn expect_boolean(value: &Value) -> Result<bool, CalcError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        other => Err(CalcError::Type {
            expected: "Boolean",
            got: other.type_name(),
        }),
    }
}

impl Evaluator for CalcEvaluator {
    fn execute(&mut self, source: &str) -> Execution {
        let mut output = String::new();
        match self.run(source, &mut output) {
            Ok(last) => Execution {
                output,
                value: last.and_then(|v| v.repr()),
                error: None,
            },
            Err(err) => Execution {
                output,
                value: None,
                error: Some(err.to_string()),
            },
        }
    }
}
