//! In-memory attribute filtering for layers that have no query service.
//!
//! A WHERE clause is rewritten ([`aql::standardize`]), parsed ([`sql`]),
//! translated into a typed [`aql::Expression`] and evaluated per record.
//! [`filter`] holds the public entry points.

pub mod aql;
pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod layer;
pub mod sql;

pub use error::AqlError;
pub use filter::{Graphic, MATCH_NOTHING, Query, sql_attribute_filter, sql_graphics_visibility};
