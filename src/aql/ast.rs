//! Typed expression tree for attribute queries.

use std::fmt;

use super::value::Value;

/// A translated WHERE clause, evaluable against one record at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Constant value.
    Literal(Value),

    /// Field lookup: `pop`
    Identifier(String),

    /// Constant list, evaluated once at translation time: `('A', 'C')`
    ArrayLiteral(Vec<Value>),

    /// `left <op> right`
    Comparison {
        left: Box<Expression>,
        op: CompareOp,
        right: Box<Expression>,
    },

    /// `left AND right`
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// `left OR right`
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// `NOT inner`
    Not(Box<Expression>),

    /// `left [NOT] IN right`; `right` is an `ArrayLiteral`
    In {
        left: Box<Expression>,
        right: Box<Expression>,
        negate: bool,
    },

    /// `left [NOT] LIKE right`
    Like {
        left: Box<Expression>,
        right: Box<Expression>,
        negate: bool,
    },

    /// `(inner)`
    Parentheses(Box<Expression>),

    /// `upper(x)`, `lower(x)`, `date(x)`
    FunctionCall {
        function: Function,
        params: Vec<Expression>,
    },
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,    // = == ===
    NotEq, // != !==
    Gt,    // >
    GtEq,  // >=
    Lt,    // <
    LtEq,  // <=
}

impl CompareOp {
    /// Map an operator token; several equality spellings are accepted.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" | "==" | "===" => Some(CompareOp::Eq),
            "!=" | "!==" => Some(CompareOp::NotEq),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::GtEq),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::LtEq),
            _ => None,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::NotEq => write!(f, "!="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::GtEq => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::LtEq => write!(f, "<="),
        }
    }
}

/// Supported scalar functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Upper,
    Lower,
    Date,
}

impl Function {
    /// Case-insensitive lookup against the allow-list.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "upper" => Some(Function::Upper),
            "lower" => Some(Function::Lower),
            "date" => Some(Function::Date),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Upper => "upper",
            Function::Lower => "lower",
            Function::Date => "date",
        }
    }

    pub fn arity(self) -> usize {
        1
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        Value::Array(items) => {
            write!(f, "(")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_literal(f, item)?;
            }
            write!(f, ")")
        }
        other => write!(f, "{}", other),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write_literal(f, value),
            Expression::Identifier(name) => write!(f, "{}", name),
            Expression::ArrayLiteral(values) => write_literal(f, &Value::Array(values.clone())),
            Expression::Comparison { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expression::And { left, right } => write!(f, "{} AND {}", left, right),
            Expression::Or { left, right } => write!(f, "{} OR {}", left, right),
            Expression::Not(inner) => write!(f, "NOT {}", inner),
            Expression::In {
                left,
                right,
                negate,
            } => {
                let not = if *negate { "NOT " } else { "" };
                write!(f, "{} {}IN {}", left, not, right)
            }
            Expression::Like {
                left,
                right,
                negate,
            } => {
                let not = if *negate { "NOT " } else { "" };
                write!(f, "{} {}LIKE {}", left, not, right)
            }
            Expression::Parentheses(inner) => write!(f, "({})", inner),
            Expression::FunctionCall { function, params } => {
                write!(f, "{}(", function.name().to_ascii_uppercase())?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ")")
            }
        }
    }
}
