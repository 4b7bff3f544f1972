//! Query coordination
//!
//! A [`Query`] wraps one SQL statement run against a [`Database`] and
//! applies filter patterns and sort keys to the fetched rows.

mod errors;
pub mod memory;
#[allow(clippy::module_inception)]
mod query;
mod source;

pub use errors::{QueryError, QueryResult};
pub use memory::{MemoryDatabase, ResultSet};
pub use query::{IdList, Query};
pub use source::{Database, SourceError, SourceResult, Statement};
