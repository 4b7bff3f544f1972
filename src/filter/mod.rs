//! Post-fetch row filtering
//!
//! Patterns come in two kinds:
//!
//! - boolean comparisons (`=`, `<`, `LIKE`, `IN`, ...) that decide whether a
//!   row is kept, combined with AND in declaration order
//! - `FULLTEXT` patterns that never exclude a row but annotate it with a
//!   weighted relevance score
//!
//! # Invariants
//!
//! - Patterns are immutable once added and evaluated in declaration order
//! - Membership lists are parsed at most once per literal per engine
//! - Output preserves input order

mod engine;
mod errors;
pub mod fulltext;
mod matcher;
mod pattern;
mod store;

pub use engine::FilterEngine;
pub use errors::{FilterError, FilterResult};
pub use fulltext::ScoringOptions;
pub use matcher::Matcher;
pub use pattern::{Comparison, Pattern, DEFAULT_FULLTEXT_WEIGHT};
pub use store::{split_members, MembershipCache, PatternStore};
