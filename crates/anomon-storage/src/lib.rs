//! Relational persistence for detection rules and analysis results.
//!
//! [`store::Store`] wraps a sea-orm connection (SQLite, PostgreSQL or MySQL)
//! and runs the schema migrations on connect. Listing is filtered by a
//! case-insensitive name substring, ordered by a whitelisted sort field and
//! paginated with 1-indexed pages.

pub mod entities;
pub mod error;
pub mod sort;
pub mod store;


pub use error::{Result, StorageError};
pub use sort::{AnalysisSortField, RuleSortField, Sort, SortOrder};
pub use store::{AnalysisFilter, NewAnalysis, PageRequest, RuleFilter, Store};
