//! Row values and loose comparison
//!
//! Rows are transient: the source materialises them, the pipeline filters,
//! scores and sorts them, and they are handed back to the caller.

pub mod loose;
mod row;

pub use loose::{loose_cmp, loose_eq};
pub use row::{Fields, Record, Relevance, Row, SCORE_FIELD, SCORE_SUFFIX};
