//! Client-side attribute filtering for layers without a query service.
//!
//! Two entry points: [`sql_attribute_filter`] selects matching attribute
//! records, and [`sql_graphics_visibility`] shows or hides graphics.
//! Both translate the clause once, up front, so a clause that is not
//! understood fails before any record or graphic is touched.

mod graphics;

pub use graphics::{Graphic, MATCH_NOTHING, sql_graphics_visibility};

use crate::aql::{Expression, Fields, Record, Value, standardize, translate};
use crate::error::Result;
use crate::sql;

/// A translated WHERE clause, reusable across any number of records.
#[derive(Debug, Clone)]
pub struct Query {
    root: Expression,
    source: String,
}

impl Query {
    /// Translate a WHERE clause.
    pub fn compile(where_clause: &str) -> Result<Self> {
        let node = sql::parse(&standardize(where_clause))?;
        let root = translate(&node)?;
        tracing::debug!("Translated '{}' into {}", where_clause, root);

        Ok(Query {
            root,
            source: where_clause.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.root
    }

    pub fn evaluate<F: Fields + ?Sized>(&self, record: &F) -> Value {
        self.root.evaluate(record)
    }

    /// Whether the record satisfies the clause.
    pub fn matches<F: Fields + ?Sized>(&self, record: &F) -> bool {
        self.evaluate(record).is_truthy()
    }

    /// Attribute filter over JSON records; see [`sql_attribute_filter`].
    pub fn filter_json(
        &self,
        records: &[serde_json::Value],
        attrib_as_property: bool,
    ) -> Vec<serde_json::Value> {
        records
            .iter()
            .filter(|record| {
                attribute_record(record, attrib_as_property).is_some_and(|r| self.matches(r))
            })
            .cloned()
            .collect()
    }
}

/// The flat record to evaluate: the object itself, or its `attributes`
/// object when `attrib_as_property` is set.
fn attribute_record(record: &serde_json::Value, attrib_as_property: bool) -> Option<&Record> {
    if attrib_as_property {
        record.get("attributes")?.as_object()
    } else {
        record.as_object()
    }
}

/// Return the records matching `where_clause`, in input order.
///
/// Fields are read from each record directly, or from its `attributes`
/// object when `attrib_as_property` is set. Records that are not JSON
/// objects never match. The input is left untouched.
pub fn sql_attribute_filter(
    records: &[serde_json::Value],
    where_clause: &str,
    attrib_as_property: bool,
) -> Result<Vec<serde_json::Value>> {
    let query = Query::compile(where_clause)?;
    Ok(query.filter_json(records, attrib_as_property))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AqlError;
    use serde_json::{Value as Json, json};

    fn records(values: Json) -> Vec<Json> {
        values.as_array().unwrap().clone()
    }

    #[test]
    fn test_filters_bare_records() {
        let input = records(json!([{"pop": 100}, {"pop": 200}]));
        let result = sql_attribute_filter(&input, "pop > 150", false).unwrap();
        assert_eq!(result, records(json!([{"pop": 200}])));
    }

    #[test]
    fn test_filters_wrapped_records() {
        let input = records(json!([
            {"attributes": {"cat": "A"}, "geometry": {"x": 1, "y": 2}},
            {"attributes": {"cat": "B"}, "geometry": {"x": 3, "y": 4}},
        ]));
        let result = sql_attribute_filter(&input, "cat = 'A'", true).unwrap();
        assert_eq!(result, vec![input[0].clone()]);
    }

    #[test]
    fn test_shape_flag_selects_lookup() {
        let input = records(json!([{"attributes": {"cat": "A"}, "cat": "Z"}]));
        assert!(sql_attribute_filter(&input, "cat = 'A'", false).unwrap().is_empty());
        assert_eq!(sql_attribute_filter(&input, "cat = 'A'", true).unwrap().len(), 1);
    }

    #[test]
    fn test_non_object_records_never_match() {
        let input = records(json!([1, "x", {"attributes": 5}, {"cat": "A"}]));
        let result = sql_attribute_filter(&input, "NOT cat = 'B'", true).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_translation_error_is_returned() {
        let input = records(json!([{"a": 1}]));
        let err = sql_attribute_filter(&input, "a <> 1", false).unwrap_err();
        assert_eq!(err, AqlError::UnsupportedOperator("<>".into()));
        assert!(matches!(
            sql_attribute_filter(&input, "", false),
            Err(AqlError::Syntax(_))
        ));
    }

    #[test]
    fn test_query_is_reusable() {
        let query = Query::compile("n LIKE 'Al%'").unwrap();
        assert_eq!(query.source(), "n LIKE 'Al%'");

        let first = records(json!([{"n": "Alberta"}, {"n": "Quebec"}]));
        let second = records(json!([{"n": "Alaska"}, {"n": "Yukon"}]));
        assert_eq!(query.filter_json(&first, false), records(json!([{"n": "Alberta"}])));
        assert_eq!(query.filter_json(&second, false), records(json!([{"n": "Alaska"}])));
    }
}
