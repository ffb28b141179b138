use sea_query::SimpleExpr;
use sqlx::{Error as DbError, postgres::PgRow};

mod collection;
mod database;
mod synclient;

pub use database::PostgresStore;

pub trait DbRow {
    fn id(&self) -> &str;
    fn from_row(row: &PgRow) -> std::result::Result<Self, DbError>
    where
        Self: Sized;
}

/// Table layout of a record type.
///
/// `COLUMNS[0]` is the primary key and `values` yields one expression per
/// column, in `COLUMNS` order.
pub trait DbTable: DbRow + Clone + Send + Sync {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn values(&self) -> Vec<SimpleExpr>;

    /// DDL for the table and its indexes.
    fn schema() -> Vec<String>;
}

pub trait DbInit {
    fn init(&self) -> crate::Result<()>;
}
