//! Untyped parse tree produced by the SQL parser.
//!
//! Node kinds follow the usual SQL grammar names; the translator decides
//! which of them it can evaluate.

/// One node of a parsed WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseNode {
    /// `left OR right`
    OrExpression {
        left: Box<ParseNode>,
        right: Box<ParseNode>,
    },

    /// `left AND right`
    AndExpression {
        left: Box<ParseNode>,
        right: Box<ParseNode>,
    },

    /// `NOT value`
    NotExpression { value: Box<ParseNode> },

    /// `value IS [NOT] NULL`
    IsNullBooleanPrimary { value: Box<ParseNode>, has_not: bool },

    /// `left <op> right`, operator kept exactly as written
    ComparisonBooleanPrimary {
        left: Box<ParseNode>,
        operator: String,
        right: Box<ParseNode>,
    },

    /// `left [NOT] IN (list)`; `right` is always an `ExpressionList`
    InExpressionListPredicate {
        left: Box<ParseNode>,
        right: Box<ParseNode>,
        has_not: bool,
    },

    /// `left [NOT] BETWEEN low AND high`
    BetweenPredicate {
        left: Box<ParseNode>,
        low: Box<ParseNode>,
        high: Box<ParseNode>,
        has_not: bool,
    },

    /// `left [NOT] LIKE right`
    LikePredicate {
        left: Box<ParseNode>,
        right: Box<ParseNode>,
        has_not: bool,
    },

    /// Arithmetic: `left + right`, `left * right`, ...
    BitExpression {
        operator: char,
        left: Box<ParseNode>,
        right: Box<ParseNode>,
    },

    /// `name(params...)`
    FunctionCall { name: String, params: Vec<ParseNode> },

    /// `( ... )`; `value` is always an `ExpressionList`
    SimpleExprParentheses { value: Box<ParseNode> },

    /// Comma-separated expressions.
    ExpressionList { value: Vec<ParseNode> },

    Identifier { value: String },

    /// Numeric literal, verbatim.
    Number { value: String },

    /// String literal, delimiters included.
    String { value: String },

    /// `TRUE` / `FALSE`, verbatim.
    Boolean { value: String },

    Null,
}

impl ParseNode {
    /// Grammar name of this node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ParseNode::OrExpression { .. } => "OrExpression",
            ParseNode::AndExpression { .. } => "AndExpression",
            ParseNode::NotExpression { .. } => "NotExpression",
            ParseNode::IsNullBooleanPrimary { .. } => "IsNullBooleanPrimary",
            ParseNode::ComparisonBooleanPrimary { .. } => "ComparisonBooleanPrimary",
            ParseNode::InExpressionListPredicate { .. } => "InExpressionListPredicate",
            ParseNode::BetweenPredicate { .. } => "BetweenPredicate",
            ParseNode::LikePredicate { .. } => "LikePredicate",
            ParseNode::BitExpression { .. } => "BitExpression",
            ParseNode::FunctionCall { .. } => "FunctionCall",
            ParseNode::SimpleExprParentheses { .. } => "SimpleExprParentheses",
            ParseNode::ExpressionList { .. } => "ExpressionList",
            ParseNode::Identifier { .. } => "Identifier",
            ParseNode::Number { .. } => "Number",
            ParseNode::String { .. } => "String",
            ParseNode::Boolean { .. } => "Boolean",
            ParseNode::Null => "Null",
        }
    }
}
