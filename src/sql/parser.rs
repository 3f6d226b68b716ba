//! Parser for WHERE clauses.
//!
//! Grammar (in rough EBNF):
//!
//! clause     = or_expr
//! or_expr    = and_expr ("OR" and_expr)*
//! and_expr   = not_expr ("AND" not_expr)*
//! not_expr   = "NOT" not_expr | predicate
//! predicate  = bit_expr ( COMPARE bit_expr
//!                       | "IS" ["NOT"] "NULL"
//!                       | ["NOT"] "IN" "(" expr_list ")"
//!                       | ["NOT"] "LIKE" bit_expr
//!                       | ["NOT"] "BETWEEN" bit_expr "AND" bit_expr )?
//! bit_expr   = term (("+" | "-") term)*
//! term       = unary (("*" | "/") unary)*
//! unary      = "-" unary | primary
//! primary    = NUMBER | STRING | "TRUE" | "FALSE" | "NULL"
//!            | WORD "(" [expr_list] ")" | WORD | QUOTED_IDENT
//!            | "(" expr_list ")"
//! expr_list  = or_expr ("," or_expr)*
//!
//! OR and AND chains are joined into balanced trees, so a clause with
//! thousands of terms stays shallow. Everything that nests by recursion
//! (NOT, unary minus, parentheses, function calls) is capped at
//! [`MAX_DEPTH`] levels.

use super::lexer::{Token, tokenize};
use super::node::ParseNode;

const KEYWORDS: &[&str] = &[
    "AND", "OR", "NOT", "IN", "LIKE", "IS", "NULL", "BETWEEN", "TRUE", "FALSE",
];

fn is_keyword(word: &str, keyword: &str) -> bool {
    word.eq_ignore_ascii_case(keyword)
}

/// Deepest NOT / unary / parenthesis nesting the parser accepts.
pub const MAX_DEPTH: usize = 64;

fn boxed(node: ParseNode) -> Box<ParseNode> {
    Box::new(node)
}

/// Join operands pairwise, level by level, keeping their order.
fn balanced(
    mut level: Vec<ParseNode>,
    join: fn(Box<ParseNode>, Box<ParseNode>) -> ParseNode,
) -> Option<ParseNode> {
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut nodes = level.into_iter();
        while let Some(left) = nodes.next() {
            match nodes.next() {
                Some(right) => next.push(join(boxed(left), boxed(right))),
                None => next.push(left),
            }
        }
        level = next;
    }
    level.pop()
}

/// Parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Run `f` one nesting level deeper, failing past `MAX_DEPTH`.
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, String>,
    ) -> Result<T, String> {
        if self.depth >= MAX_DEPTH {
            return Err(format!("Expression nested deeper than {} levels", MAX_DEPTH));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<(), String> {
        let tok = self.advance();
        if tok == expected {
            Ok(())
        } else {
            Err(format!("Expected {:?}, got {:?}", expected, tok))
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.keyword_at(0, keyword)
    }

    fn keyword_at(&self, offset: usize, keyword: &str) -> bool {
        matches!(self.peek_at(offset), Token::Word(w) if is_keyword(w, keyword))
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), String> {
        match self.advance() {
            Token::Word(w) if is_keyword(&w, keyword) => Ok(()),
            other => Err(format!("Expected {}, got {:?}", keyword, other)),
        }
    }

    /// Parse OR expression: and_expr ("OR" and_expr)*
    fn parse_or_expr(&mut self) -> Result<ParseNode, String> {
        let mut terms = vec![self.parse_and_expr()?];

        while self.peek_keyword("OR") {
            self.advance(); // consume OR
            terms.push(self.parse_and_expr()?);
        }

        balanced(terms, |left, right| ParseNode::OrExpression { left, right })
            .ok_or_else(|| "Empty OR expression".to_string())
    }

    /// Parse AND expression: not_expr ("AND" not_expr)*
    fn parse_and_expr(&mut self) -> Result<ParseNode, String> {
        let mut terms = vec![self.parse_not_expr()?];

        while self.peek_keyword("AND") {
            self.advance(); // consume AND
            terms.push(self.parse_not_expr()?);
        }

        balanced(terms, |left, right| ParseNode::AndExpression { left, right })
            .ok_or_else(|| "Empty AND expression".to_string())
    }

    /// Parse NOT expression: "NOT" not_expr | predicate
    fn parse_not_expr(&mut self) -> Result<ParseNode, String> {
        if self.peek_keyword("NOT") {
            self.advance(); // consume NOT
            let value = self.nested(Self::parse_not_expr)?;
            return Ok(ParseNode::NotExpression { value: boxed(value) });
        }
        self.parse_predicate()
    }

    /// Parse a predicate: a value optionally followed by a comparison,
    /// IS NULL, IN, LIKE or BETWEEN tail.
    fn parse_predicate(&mut self) -> Result<ParseNode, String> {
        let left = self.parse_bit_expr()?;

        if let Token::Compare(op) = self.peek().clone() {
            self.advance(); // consume operator
            let right = self.parse_bit_expr()?;
            return Ok(ParseNode::ComparisonBooleanPrimary {
                left: boxed(left),
                operator: op,
                right: boxed(right),
            });
        }

        if self.peek_keyword("IS") {
            self.advance(); // consume IS
            let has_not = self.peek_keyword("NOT");
            if has_not {
                self.advance();
            }
            self.expect_keyword("NULL")?;
            return Ok(ParseNode::IsNullBooleanPrimary {
                value: boxed(left),
                has_not,
            });
        }

        // "NOT" only belongs to the predicate when IN/LIKE/BETWEEN follows
        let has_not = self.peek_keyword("NOT")
            && ["IN", "LIKE", "BETWEEN"]
                .iter()
                .any(|kw| self.keyword_at(1, kw));
        let offset = usize::from(has_not);

        if self.keyword_at(offset, "IN") {
            self.pos += offset + 1;
            self.expect(Token::LParen)?;
            let list = self.nested(Self::parse_expr_list)?;
            self.expect(Token::RParen)?;
            return Ok(ParseNode::InExpressionListPredicate {
                left: boxed(left),
                right: boxed(list),
                has_not,
            });
        }

        if self.keyword_at(offset, "LIKE") {
            self.pos += offset + 1;
            let right = self.parse_bit_expr()?;
            return Ok(ParseNode::LikePredicate {
                left: boxed(left),
                right: boxed(right),
                has_not,
            });
        }

        if self.keyword_at(offset, "BETWEEN") {
            self.pos += offset + 1;
            let low = self.parse_bit_expr()?;
            self.expect_keyword("AND")?;
            let high = self.parse_bit_expr()?;
            return Ok(ParseNode::BetweenPredicate {
                left: boxed(left),
                low: boxed(low),
                high: boxed(high),
                has_not,
            });
        }

        Ok(left)
    }

    /// Parse additive arithmetic: term (("+" | "-") term)*
    fn parse_bit_expr(&mut self) -> Result<ParseNode, String> {
        let mut left = self.parse_term()?;

        loop {
            let operator = match self.peek() {
                Token::Plus => '+',
                Token::Minus => '-',
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = ParseNode::BitExpression {
                operator,
                left: boxed(left),
                right: boxed(right),
            };
        }

        Ok(left)
    }

    /// Parse multiplicative arithmetic: unary (("*" | "/") unary)*
    fn parse_term(&mut self) -> Result<ParseNode, String> {
        let mut left = self.parse_unary()?;

        loop {
            let operator = match self.peek() {
                Token::Star => '*',
                Token::Slash => '/',
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = ParseNode::BitExpression {
                operator,
                left: boxed(left),
                right: boxed(right),
            };
        }

        Ok(left)
    }

    /// Parse unary minus. A minus directly before a number folds into it.
    fn parse_unary(&mut self) -> Result<ParseNode, String> {
        if !matches!(self.peek(), Token::Minus) {
            return self.parse_primary();
        }
        self.advance(); // consume -

        if let Token::Number(n) = self.peek().clone() {
            self.advance();
            return Ok(ParseNode::Number {
                value: format!("-{}", n),
            });
        }

        let operand = self.nested(Self::parse_unary)?;
        Ok(ParseNode::BitExpression {
            operator: '-',
            left: boxed(ParseNode::Number { value: "0".into() }),
            right: boxed(operand),
        })
    }

    /// Parse a primary value.
    fn parse_primary(&mut self) -> Result<ParseNode, String> {
        match self.advance() {
            Token::Number(value) => Ok(ParseNode::Number { value }),
            Token::Str(value) => Ok(ParseNode::String { value }),
            Token::QuotedIdent(value) => Ok(ParseNode::Identifier { value }),
            Token::LParen => {
                let list = self.nested(Self::parse_expr_list)?;
                self.expect(Token::RParen)?;
                Ok(ParseNode::SimpleExprParentheses { value: boxed(list) })
            }
            Token::Word(word) => self.parse_word(word),
            other => Err(format!("Unexpected token: {:?}", other)),
        }
    }

    /// Parse a word: literal keyword, function call or identifier.
    fn parse_word(&mut self, word: String) -> Result<ParseNode, String> {
        if is_keyword(&word, "TRUE") || is_keyword(&word, "FALSE") {
            return Ok(ParseNode::Boolean { value: word });
        }
        if is_keyword(&word, "NULL") {
            return Ok(ParseNode::Null);
        }
        if KEYWORDS.iter().any(|kw| is_keyword(&word, kw)) {
            return Err(format!("Unexpected keyword: {}", word));
        }

        if matches!(self.peek(), Token::LParen) {
            self.advance(); // consume (
            let params = if matches!(self.peek(), Token::RParen) {
                Vec::new()
            } else {
                match self.nested(Self::parse_expr_list)? {
                    ParseNode::ExpressionList { value } => value,
                    other => vec![other],
                }
            };
            self.expect(Token::RParen)?;
            return Ok(ParseNode::FunctionCall { name: word, params });
        }

        Ok(ParseNode::Identifier { value: word })
    }

    /// Parse a comma-separated list: or_expr ("," or_expr)*
    fn parse_expr_list(&mut self) -> Result<ParseNode, String> {
        let mut value = vec![self.parse_or_expr()?];

        while matches!(self.peek(), Token::Comma) {
            self.advance(); // consume ,
            value.push(self.parse_or_expr()?);
        }

        Ok(ParseNode::ExpressionList { value })
    }
}

/// Parse a WHERE clause into an untyped parse tree.
pub fn parse_where(input: &str) -> Result<ParseNode, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty clause".to_string());
    }

    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let node = parser.parse_or_expr()?;

    // Ensure we consumed all tokens
    if !matches!(parser.peek(), Token::Eof) {
        return Err(format!(
            "Unexpected token after expression: {:?}",
            parser.peek()
        ));
    }

    Ok(node)
}
