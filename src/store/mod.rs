//! Storage layer for persisting workflow definitions, executions and files.
//!
//! Provides an abstraction over different storage backends:
//! - `MemStore`: In-memory storage for testing and embedding
//! - `PostgresStore`: PostgreSQL for production persistence

pub mod data;
mod db;
#[cfg(test)]
pub(crate) mod fakes;
pub mod query;
mod store;

use std::error::Error;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

use crate::{FilingError, Result};

use query::*;

pub use db::{MemStore, PostgresStore};
pub use store::Store;

/// Maps database errors to FilingError.
fn map_db_err(err: impl Error) -> FilingError {
    FilingError::Store(err.to_string())
}

/// Identifiers for different storage collections.
#[derive(Debug, Clone, AsRefStr, PartialEq, Hash, Eq, EnumIter)]
pub enum StoreIden {
    /// Workflow definitions.
    #[strum(serialize = "workflows")]
    Workflows,
    /// Workflow nodes.
    #[strum(serialize = "nodes")]
    Nodes,
    /// Workflow edges.
    #[strum(serialize = "edges")]
    Edges,
    /// Workflow executions.
    #[strum(serialize = "executions")]
    Executions,
    /// Execution steps.
    #[strum(serialize = "steps")]
    Steps,
    /// Files (document cases).
    #[strum(serialize = "files")]
    Files,
    /// Time extension requests.
    #[strum(serialize = "extensions")]
    Extensions,
    /// Holiday calendar.
    #[strum(serialize = "holidays")]
    Holidays,
    /// File routing history.
    #[strum(serialize = "routes")]
    Routes,
}

/// Paginated query result.
#[derive(Debug, Deserialize, Serialize)]
pub struct PageData<T> {
    /// Total number of matching records.
    pub count: usize,
    /// Current page number (1-based).
    pub page_num: usize,
    /// Total number of pages.
    pub page_count: usize,
    /// Number of records per page.
    pub page_size: usize,
    /// Records in the current page.
    pub rows: Vec<T>,
}

/// Trait for types that can identify their storage collection.
pub trait DbCollectionIden {
    /// Returns the collection identifier for this type.
    fn iden() -> StoreIden;
}

/// Trait for database collection operations.
pub trait DbCollection: Send + Sync {
    /// The type of items stored in this collection.
    type Item;

    /// Checks if a record with the given ID exists.
    fn exists(
        &self,
        id: &str,
    ) -> Result<bool>;

    /// Finds a record by ID.
    fn find(
        &self,
        id: &str,
    ) -> Result<Self::Item>;

    /// Queries records with pagination and filtering.
    fn query(
        &self,
        query: &Query,
    ) -> Result<PageData<Self::Item>>;

    /// Creates a new record.
    fn create(
        &self,
        data: &Self::Item,
    ) -> Result<bool>;

    /// Updates an existing record.
    fn update(
        &self,
        data: &Self::Item,
    ) -> Result<bool>;

    /// Updates the record only while the stored row still satisfies `guard`.
    ///
    /// Returns false when the row is gone or no longer matches, so callers can
    /// use it as a compare-and-set on a version or status column.
    fn update_if(
        &self,
        data: &Self::Item,
        guard: &Expr,
    ) -> Result<bool>;

    /// Deletes a record by ID.
    fn delete(
        &self,
        id: &str,
    ) -> Result<bool>;
}

/// Trait for database store initialization.
pub trait DbStore {
    /// Initializes the database and registers collections with the store.
    fn init(
        &self,
        s: &Store,
    ) -> Result<()>;
}
