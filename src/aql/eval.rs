//! Evaluator for the expression tree.

use std::cmp::Ordering;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use super::ast::{CompareOp, Expression, Function};
use super::value::{Fields, Value};

impl Expression {
    /// Evaluate against a single record.
    ///
    /// Never fails: missing fields read as `Null` and mismatched types
    /// simply compare false.
    pub fn evaluate<F: Fields + ?Sized>(&self, record: &F) -> Value {
        match self {
            Expression::Literal(value) => value.clone(),

            Expression::Identifier(name) => record.field(name).unwrap_or(Value::Null),

            Expression::ArrayLiteral(values) => Value::Array(values.clone()),

            Expression::Comparison { left, op, right } => {
                let left = left.evaluate(record);
                let right = right.evaluate(record);
                Value::Boolean(compare(*op, &left, &right))
            }

            Expression::And { left, right } => {
                let left = left.evaluate(record).is_truthy();
                let right = right.evaluate(record).is_truthy();
                Value::Boolean(left && right)
            }

            Expression::Or { left, right } => {
                let left = left.evaluate(record).is_truthy();
                let right = right.evaluate(record).is_truthy();
                Value::Boolean(left || right)
            }

            Expression::Not(inner) => Value::Boolean(!inner.evaluate(record).is_truthy()),

            Expression::In {
                left,
                right,
                negate,
            } => {
                let needle = left.evaluate(record);
                let found = match &**right {
                    Expression::ArrayLiteral(values) => values.iter().any(|v| needle.strict_eq(v)),
                    other => match other.evaluate(record) {
                        Value::Array(values) => values.iter().any(|v| needle.strict_eq(v)),
                        _ => false,
                    },
                };
                Value::Boolean(found != *negate)
            }

            Expression::Like {
                left,
                right,
                negate,
            } => {
                let text = left.evaluate(record);
                let pattern = right.evaluate(record);
                let matched = match (&text, &pattern) {
                    (Value::Null, _) | (_, Value::Null) => false,
                    (text, pattern) => like_match(&pattern.to_string(), &text.to_string()),
                };
                Value::Boolean(matched != *negate)
            }

            Expression::Parentheses(inner) => inner.evaluate(record),

            Expression::FunctionCall { function, params } => {
                let args: Vec<Value> = params.iter().map(|p| p.evaluate(record)).collect();
                call(*function, &args)
            }
        }
    }
}

fn compare(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::Eq => left.strict_eq(right),
        CompareOp::NotEq => !left.strict_eq(right),
        CompareOp::Gt => left.compare(right) == Some(Ordering::Greater),
        CompareOp::GtEq => matches!(
            left.compare(right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CompareOp::Lt => left.compare(right) == Some(Ordering::Less),
        CompareOp::LtEq => matches!(left.compare(right), Some(Ordering::Less | Ordering::Equal)),
    }
}

/// Dispatch on evaluated arguments. Arity is checked at translation, so
/// a mismatched argument list only arises from a hand-built tree.
fn call(function: Function, args: &[Value]) -> Value {
    match (function, args) {
        (Function::Upper, [Value::String(s)]) => Value::String(s.to_uppercase()),
        (Function::Lower, [Value::String(s)]) => Value::String(s.to_lowercase()),
        (Function::Upper | Function::Lower, [other]) => other.clone(),
        (Function::Date, [arg]) => Value::Number(
            arg.as_str()
                .and_then(parse_date_millis)
                .unwrap_or(f64::NAN),
        ),
        _ => Value::Null,
    }
}

/// Unanchored LIKE: the `%`-separated fragments must appear in order
/// somewhere in `text`. `_` is an ordinary character.
///
/// Only `%` is special. A regex built from the pattern would also give
/// `.`, `[` and the other metacharacters their regex meaning; here they
/// match themselves, and no pattern can fail to compile.
fn like_match(pattern: &str, text: &str) -> bool {
    let mut remaining = text;

    for part in pattern.split('%').filter(|p| !p.is_empty()) {
        match remaining.find(part) {
            Some(idx) => {
                remaining = &remaining[idx + part.len()..];
            }
            None => return false,
        }
    }

    true
}

fn epoch_millis(dt: OffsetDateTime) -> f64 {
    (dt.unix_timestamp_nanos() / 1_000_000) as f64
}

/// Parse a calendar date or timestamp to epoch milliseconds.
///
/// Forms without an explicit offset are read as UTC.
pub fn parse_date_millis(text: &str) -> Option<f64> {
    let text = text.trim();

    if let Ok(dt) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(epoch_millis(dt));
    }

    let datetime = PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            text,
            format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        )
    });
    if let Ok(dt) = datetime {
        return Some(epoch_millis(dt.assume_utc()));
    }

    let date = Date::parse(text, format_description!("[year]-[month]-[day]"))
        .or_else(|_| {
            Date::parse(
                text,
                format_description!("[year]/[month padding:none]/[day padding:none]"),
            )
        })
        .or_else(|_| {
            Date::parse(
                text,
                format_description!("[month padding:none]/[day padding:none]/[year]"),
            )
        });

    date.ok().map(|d| epoch_millis(d.midnight().assume_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aql::{preprocess::standardize, translate::translate};
    use crate::sql::parse;
    use serde_json::json;

    const Y2K_MILLIS: f64 = 946_684_800_000.0;

    fn compile(clause: &str) -> Expression {
        translate(&parse(&standardize(clause)).unwrap()).unwrap()
    }

    fn matches(clause: &str, record: serde_json::Value) -> bool {
        let record = record.as_object().unwrap().clone();
        compile(clause).evaluate(&record).is_truthy()
    }

    #[test]
    fn test_numeric_comparison() {
        assert!(matches("pop > 150", json!({"pop": 200})));
        assert!(!matches("pop > 150", json!({"pop": 100})));
        assert!(matches("pop >= 150", json!({"pop": 150})));
        assert!(matches("pop <= 150", json!({"pop": 150})));
        assert!(!matches("pop < 150", json!({"pop": 150})));
    }

    #[test]
    fn test_equality_is_strict() {
        assert!(matches("code = 1", json!({"code": 1})));
        assert!(!matches("code = 1", json!({"code": "1"})));
        assert!(matches("code != 1", json!({"code": "1"})));
        assert!(matches("name = 'Ottawa'", json!({"name": "Ottawa"})));
    }

    #[test]
    fn test_string_ordering_is_lexicographic() {
        assert!(matches("name > 'B'", json!({"name": "Calgary"})));
        assert!(matches("name > 'B'", json!({"name": "Banff"})));
        assert!(!matches("name > 'C'", json!({"name": "Banff"})));
        assert!(!matches("code > 5", json!({"code": "9"})));
    }

    #[test]
    fn test_missing_field_is_falsy() {
        assert!(!matches("popp > 150", json!({"pop": 200})));
        assert!(!matches("popp = 'x'", json!({"pop": 200})));
        assert!(matches("NOT popp = 'x'", json!({"pop": 200})));
    }

    #[test]
    fn test_boolean_logic() {
        let record = json!({"a": 1, "b": 2, "c": 4});
        assert!(matches("a=1 OR b=2 AND c=3", record.clone()));
        assert!(!matches("(a=1 OR b=2) AND c=3", record.clone()));
        assert!(matches("NOT (a = 2)", record.clone()));
        assert!(matches("flag = TRUE", json!({"flag": true})));
    }

    #[test]
    fn test_in() {
        assert!(matches("cat IN ('A', 'C')", json!({"cat": "A"})));
        assert!(!matches("cat IN ('A', 'C')", json!({"cat": "B"})));
        assert!(matches("cat NOT IN ('A', 'C')", json!({"cat": "B"})));
        assert!(!matches("code IN ('1', '2')", json!({"code": 1})));
        assert!(matches("code IN (1, 2)", json!({"code": 1})));
    }

    #[test]
    fn test_like_is_unanchored() {
        assert!(matches("n LIKE 'Al%'", json!({"n": "Alberta"})));
        assert!(!matches("n LIKE 'Al%'", json!({"n": "Quebec"})));
        // Fragment match, not a full-string match
        assert!(matches("n LIKE 'Al%'", json!({"n": "Nepal Lake"})));
        assert!(matches("n LIKE 'ber'", json!({"n": "Alberta"})));
        assert!(matches("n LIKE '%'", json!({"n": ""})));
        assert!(matches("n LIKE 'A%t%a'", json!({"n": "Alberta"})));
        assert!(!matches("n LIKE 'a%A'", json!({"n": "Alberta"})));
    }

    #[test]
    fn test_like_literal_characters() {
        assert!(!matches("n LIKE 'A_b'", json!({"n": "Alberta"})));
        assert!(matches("n LIKE 'A_b'", json!({"n": "xA_by"})));
        assert!(matches("n LIKE 'a.b'", json!({"n": "a.b"})));
        assert!(!matches("n LIKE 'a.b'", json!({"n": "axb"})));
    }

    #[test]
    fn test_like_negated_and_missing() {
        assert!(matches("n NOT LIKE 'Al%'", json!({"n": "Quebec"})));
        assert!(!matches("n LIKE 'Al%'", json!({})));
        assert!(matches("n NOT LIKE 'Al%'", json!({})));
        assert!(matches("code LIKE '12%'", json!({"code": 123})));
    }

    #[test]
    fn test_upper_lower() {
        assert!(matches("UPPER(n) = 'ALBERTA'", json!({"n": "Alberta"})));
        assert!(matches("lower(n) = 'alberta'", json!({"n": "AlBeRtA"})));
        assert!(matches("upper(code) = 5", json!({"code": 5})));
        assert!(!matches("upper(missing) = 'X'", json!({})));
    }

    #[test]
    fn test_date_boundary() {
        assert!(!matches("d < DATE '2000-01-01'", json!({"d": 946684800000_i64})));
        assert!(matches("d <= DATE '2000-01-01'", json!({"d": 946684800000_i64})));
        assert!(matches("d = date '2000-01-01'", json!({"d": 946684800000_i64})));
        assert!(matches("d < DATE('2000-01-02')", json!({"d": 946684800000_i64})));
    }

    #[test]
    fn test_date_from_field() {
        assert!(matches("DATE(s) > 0", json!({"s": "2000-01-01"})));
        assert!(!matches("DATE(s) > 0", json!({"s": "not a date"})));
        assert!(!matches("DATE(s) = DATE(s)", json!({"s": "not a date"})));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date_millis("2000-01-01"), Some(Y2K_MILLIS));
        assert_eq!(parse_date_millis("2000/1/1"), Some(Y2K_MILLIS));
        assert_eq!(parse_date_millis("01/01/2000"), Some(Y2K_MILLIS));
        assert_eq!(parse_date_millis("2000-01-01T00:00:00Z"), Some(Y2K_MILLIS));
        assert_eq!(
            parse_date_millis("2000-01-01 00:00:01"),
            Some(Y2K_MILLIS + 1000.0)
        );
        assert_eq!(
            parse_date_millis("2000-01-01T01:00:00+01:00"),
            Some(Y2K_MILLIS)
        );
        assert_eq!(parse_date_millis("yesterday"), None);
        assert_eq!(parse_date_millis("2000-13-01"), None);
    }

    #[test]
    fn test_call_uses_every_argument() {
        assert_eq!(
            call(Function::Lower, &[Value::from("AbC")]),
            Value::from("abc")
        );
        assert_eq!(
            call(Function::Date, &[Value::from("2000-01-01")]),
            Value::Number(Y2K_MILLIS)
        );
        assert_eq!(call(Function::Upper, &[]), Value::Null);
        assert_eq!(
            call(Function::Upper, &[Value::from("a"), Value::from("b")]),
            Value::Null
        );
    }

    #[test]
    fn test_balanced_chain_evaluates_every_term() {
        let clause = (0..2000)
            .map(|i| format!("id = {i}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let expr = compile(&clause);
        let record = |id: i64| json!({"id": id}).as_object().unwrap().clone();
        assert!(expr.evaluate(&record(0)).is_truthy());
        assert!(expr.evaluate(&record(1999)).is_truthy());
        assert!(!expr.evaluate(&record(2000)).is_truthy());
    }

    #[test]
    fn test_like_match() {
        assert!(like_match("", "anything"));
        assert!(like_match("%%", "anything"));
        assert!(like_match("%link", "motorway_link"));
        assert!(!like_match("link%link", "motorway_link"));
    }
}
