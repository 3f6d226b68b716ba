//! SQL WHERE-clause parser.
//!
//! Produces an untyped [`ParseNode`] tree. The grammar covers more than the
//! expression engine evaluates (IS NULL, BETWEEN, arithmetic), so that
//! unsupported constructs are reported by the translator rather than as
//! syntax errors.

mod lexer;
mod node;
mod parser;

pub use node::ParseNode;

use crate::error::{AqlError, Result};

/// Parse a WHERE clause into a parse tree.
pub fn parse(clause: &str) -> Result<ParseNode> {
    parser::parse_where(clause).map_err(AqlError::Syntax)
}
