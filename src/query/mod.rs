//! Query engine
//!
//! A small boolean filter language over resources and their ownership:
//! comparisons (`=`, `!=`, `~=`) combined with AND/OR, AND binding tighter.
//! Parse errors are fatal to the query and name the offending token; there is
//! no best-effort evaluation.

mod eval;
mod parser;

pub use eval::evaluate;
pub use parser::{Comparison, Field, Operator, QueryError, QueryExpr, parse};
