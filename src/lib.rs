//! rowsift - post-fetch filtering, relevance scoring and sorting of SQL
//! result rows
//!
//! A [`query::Query`] runs one statement against a [`query::Database`],
//! then narrows the fetched rows with loosely-typed filter patterns, scores
//! them against fulltext terms and orders them by column.

pub mod cli;
pub mod config;
pub mod filter;
pub mod observability;
pub mod query;
pub mod sort;
pub mod value;
