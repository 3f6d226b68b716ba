//! Attribute query language: typed expression trees built from WHERE
//! clauses and evaluated against flat attribute records.
//!
//! Supported subset:
//!   a = 1, a == 1, a === 1   - equality (no type coercion)
//!   a != 1, a !== 1          - inequality
//!   a > 1, a >= 1, a < 1, ...- ordering within one type
//!   expr AND expr, expr OR expr, NOT expr, (expr)
//!   a [NOT] IN ('x', 'y')    - membership in a constant list
//!   a [NOT] LIKE 'Al%'       - unanchored `%` wildcard match
//!   UPPER(a), LOWER(a)       - case folding
//!   DATE('2000-01-01')       - epoch milliseconds; `DATE '...'` also accepted

mod ast;
mod eval;
mod preprocess;
mod translate;
mod value;

pub use ast::{CompareOp, Expression, Function};
pub use eval::parse_date_millis;
pub use preprocess::standardize;
pub use translate::translate;
pub use value::{EmptyRecord, Fields, Record, Value};
