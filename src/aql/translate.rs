//! Translation from the SQL parse tree to the typed expression tree.

use super::ast::{CompareOp, Expression, Function};
use super::value::{EmptyRecord, Value};
use crate::error::{AqlError, Result};
use crate::sql::ParseNode;

fn boxed(node: &ParseNode) -> Result<Box<Expression>> {
    translate(node).map(Box::new)
}

/// Translate a parse tree into an expression tree.
///
/// Fails on any node kind, operator or function the evaluator does not
/// support; no partial tree is ever returned.
pub fn translate(node: &ParseNode) -> Result<Expression> {
    match node {
        ParseNode::AndExpression { left, right } => Ok(Expression::And {
            left: boxed(left)?,
            right: boxed(right)?,
        }),

        ParseNode::OrExpression { left, right } => Ok(Expression::Or {
            left: boxed(left)?,
            right: boxed(right)?,
        }),

        ParseNode::NotExpression { value } => Ok(Expression::Not(boxed(value)?)),

        ParseNode::InExpressionListPredicate {
            left,
            right,
            has_not,
        } => Ok(Expression::In {
            left: boxed(left)?,
            right: boxed(right)?,
            negate: *has_not,
        }),

        ParseNode::LikePredicate {
            left,
            right,
            has_not,
        } => Ok(Expression::Like {
            left: boxed(left)?,
            right: boxed(right)?,
            negate: *has_not,
        }),

        ParseNode::ComparisonBooleanPrimary {
            left,
            operator,
            right,
        } => {
            let op = CompareOp::from_token(operator)
                .ok_or_else(|| AqlError::UnsupportedOperator(operator.clone()))?;
            Ok(Expression::Comparison {
                left: boxed(left)?,
                op,
                right: boxed(right)?,
            })
        }

        ParseNode::FunctionCall { name, params } => {
            let function = Function::from_name(name)
                .ok_or_else(|| AqlError::UnsupportedFunction(name.clone()))?;
            if params.len() != function.arity() {
                return Err(AqlError::FunctionArity {
                    name: function.name().to_string(),
                    expected: function.arity(),
                    actual: params.len(),
                });
            }
            let params = params.iter().map(translate).collect::<Result<Vec<_>>>()?;
            Ok(Expression::FunctionCall { function, params })
        }

        ParseNode::Identifier { value } => Ok(Expression::Identifier(value.clone())),

        ParseNode::Number { value } => Ok(Expression::Literal(Value::Number(
            value.parse().unwrap_or(f64::NAN),
        ))),

        ParseNode::String { value } => Ok(Expression::Literal(Value::String(unquote(value)))),

        ParseNode::Boolean { value } => Ok(Expression::Literal(Value::Boolean(
            value.eq_ignore_ascii_case("true"),
        ))),

        ParseNode::ExpressionList { value } => {
            // Items are evaluated now, so only constants keep their meaning
            let mut values = Vec::with_capacity(value.len());
            for item in value {
                values.push(translate(item)?.evaluate(&EmptyRecord));
            }
            Ok(Expression::ArrayLiteral(values))
        }

        ParseNode::SimpleExprParentheses { value } => match &**value {
            ParseNode::ExpressionList { value: items } => {
                let Some(first) = items.first() else {
                    return Err(AqlError::UnsupportedQuery("empty parentheses".into()));
                };
                if items.len() > 1 {
                    tracing::warn!(
                        "Parenthesized list has {} elements; only the first is used",
                        items.len()
                    );
                }
                Ok(Expression::Parentheses(boxed(first)?))
            }
            other => Ok(Expression::Parentheses(boxed(other)?)),
        },

        other => Err(AqlError::UnsupportedQuery(other.kind().to_string())),
    }
}

/// Strip one leading and one trailing delimiter, collapsing doubled
/// delimiters inside.
fn unquote(raw: &str) -> String {
    let Some(quote) = raw.chars().next().filter(|c| *c == '\'' || *c == '"') else {
        return raw.to_string();
    };
    if raw.len() < 2 || !raw.ends_with(quote) {
        return raw.to_string();
    }

    let inner = &raw[1..raw.len() - 1];
    let doubled = format!("{quote}{quote}");
    inner.replace(&doubled, &quote.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::parse;

    fn translate_str(clause: &str) -> Result<Expression> {
        translate(&parse(clause).unwrap())
    }

    fn ident(name: &str) -> Box<Expression> {
        Box::new(Expression::Identifier(name.into()))
    }

    fn lit(value: impl Into<Value>) -> Box<Expression> {
        Box::new(Expression::Literal(value.into()))
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            translate_str("pop > 150").unwrap(),
            Expression::Comparison {
                left: ident("pop"),
                op: CompareOp::Gt,
                right: lit(150.0),
            }
        );
    }

    #[test]
    fn test_equality_spellings() {
        for clause in ["a = 1", "a == 1", "a === 1"] {
            let expr = translate_str(clause).unwrap();
            assert!(matches!(expr, Expression::Comparison { op: CompareOp::Eq, .. }));
        }
        for clause in ["a != 1", "a !== 1"] {
            let expr = translate_str(clause).unwrap();
            assert!(matches!(expr, Expression::Comparison { op: CompareOp::NotEq, .. }));
        }
    }

    #[test]
    fn test_unsupported_operator() {
        assert_eq!(
            translate_str("a <> 1"),
            Err(AqlError::UnsupportedOperator("<>".into()))
        );
        assert_eq!(
            translate_str("a <=> 1"),
            Err(AqlError::UnsupportedOperator("<=>".into()))
        );
    }

    #[test]
    fn test_unsupported_function() {
        assert_eq!(
            translate_str("trim(name) = 'x'"),
            Err(AqlError::UnsupportedFunction("trim".into()))
        );
    }

    #[test]
    fn test_function_name_is_case_insensitive() {
        let expr = translate_str("UpPeR(name) = 'X'").unwrap();
        let Expression::Comparison { left, .. } = expr else {
            panic!("expected comparison");
        };
        assert_eq!(
            *left,
            Expression::FunctionCall {
                function: Function::Upper,
                params: vec![Expression::Identifier("name".into())],
            }
        );
    }

    #[test]
    fn test_function_arity() {
        assert_eq!(
            translate_str("upper(a, b) = 'X'"),
            Err(AqlError::FunctionArity {
                name: "upper".into(),
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_unsupported_node_kinds() {
        assert_eq!(
            translate_str("a IS NULL"),
            Err(AqlError::UnsupportedQuery("IsNullBooleanPrimary".into()))
        );
        assert_eq!(
            translate_str("a BETWEEN 1 AND 2"),
            Err(AqlError::UnsupportedQuery("BetweenPredicate".into()))
        );
        assert_eq!(
            translate_str("a + 1 > 2"),
            Err(AqlError::UnsupportedQuery("BitExpression".into()))
        );
        assert_eq!(
            translate_str("a = NULL"),
            Err(AqlError::UnsupportedQuery("Null".into()))
        );
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(translate_str("'abc'").unwrap(), *lit("abc"));
        assert_eq!(translate_str("\"abc\"").unwrap(), *lit("abc"));
        assert_eq!(translate_str("'O''Brien'").unwrap(), *lit("O'Brien"));
        assert_eq!(translate_str("''").unwrap(), *lit(""));
    }

    #[test]
    fn test_boolean_literals() {
        assert_eq!(translate_str("TRUE").unwrap(), *lit(true));
        assert_eq!(translate_str("False").unwrap(), *lit(false));
    }

    #[test]
    fn test_in_list_is_evaluated_at_translation() {
        assert_eq!(
            translate_str("cat NOT IN ('A', 'C')").unwrap(),
            Expression::In {
                left: ident("cat"),
                right: Box::new(Expression::ArrayLiteral(vec![
                    Value::from("A"),
                    Value::from("C"),
                ])),
                negate: true,
            }
        );
    }

    #[test]
    fn test_in_list_identifiers_read_as_absent() {
        let expr = translate_str("a IN (b, 1)").unwrap();
        let Expression::In { right, .. } = expr else {
            panic!("expected IN");
        };
        assert_eq!(
            *right,
            Expression::ArrayLiteral(vec![Value::Null, Value::Number(1.0)])
        );
    }

    #[test]
    fn test_parentheses_keep_first_element() {
        let expr = translate_str("(a = 1, b = 2)").unwrap();
        assert_eq!(
            expr,
            Expression::Parentheses(Box::new(Expression::Comparison {
                left: ident("a"),
                op: CompareOp::Eq,
                right: lit(1.0),
            }))
        );
    }

    #[test]
    fn test_display_round_trips_shape() {
        let expr = translate_str("(a = 'x' OR b >= 2) AND NOT c LIKE '%y'").unwrap();
        assert_eq!(expr.to_string(), "(a = 'x' OR b >= 2) AND NOT c LIKE '%y'");
    }
}
