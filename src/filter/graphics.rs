//! Visibility filtering for drawn graphics.

use super::Query;
use crate::aql::Record;
use crate::error::Result;

/// Clause that matches nothing; hides every graphic without parsing.
pub const MATCH_NOTHING: &str = "1=2";

/// A drawn feature: attributes plus visibility the filter can toggle.
pub trait Graphic {
    fn attributes(&self) -> &Record;
    fn show(&mut self);
    fn hide(&mut self);
}

/// Show the graphics matching `where_clause` and hide the rest.
///
/// Returns the attributes of the shown graphics, in input order. An empty
/// clause shows everything and [`MATCH_NOTHING`] hides everything, both
/// without translation. Otherwise the clause is translated before any
/// graphic is touched, so a translation error leaves visibility as it was.
pub fn sql_graphics_visibility<G: Graphic>(
    graphics: &mut [G],
    where_clause: &str,
) -> Result<Vec<Record>> {
    if where_clause.is_empty() {
        for graphic in graphics.iter_mut() {
            graphic.show();
        }
        return Ok(graphics.iter().map(|g| g.attributes().clone()).collect());
    }

    if where_clause == MATCH_NOTHING {
        for graphic in graphics.iter_mut() {
            graphic.hide();
        }
        return Ok(Vec::new());
    }

    let query = Query::compile(where_clause)?;
    let mut shown = Vec::new();

    for graphic in graphics.iter_mut() {
        if query.matches(graphic.attributes()) {
            graphic.show();
            shown.push(graphic.attributes().clone());
        } else {
            graphic.hide();
        }
    }

    tracing::debug!(
        "'{}' shows {} of {} graphics",
        where_clause,
        shown.len(),
        graphics.len()
    );
    Ok(shown)
}
