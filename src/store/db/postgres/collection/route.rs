use sea_query::{Alias as SeaAlias, ColumnDef, Index, PostgresQueryBuilder, SimpleExpr, Table};
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::store::{
    data,
    db::postgres::{DbRow, DbTable},
};

impl DbTable for data::Route {
    const TABLE: &'static str = "routes";
    const COLUMNS: &'static [&'static str] = &["id", "file_id", "from_user", "to_user", "action", "timestamp"];

    fn values(&self) -> Vec<SimpleExpr> {
        let data = self.clone();
        vec![data.id.into(), data.file_id.into(), data.from_user.into(), data.to_user.into(), data.action.into(), data.timestamp.into()]
    }

    fn schema() -> Vec<String> {
        let t = || SeaAlias::new(Self::TABLE);
        let c = |name: &str| SeaAlias::new(name);
        vec![
            Table::create()
                .table(t())
                .if_not_exists()
                .col(ColumnDef::new(c("id")).string().not_null().primary_key())
                .col(ColumnDef::new(c("file_id")).string().not_null())
                .col(ColumnDef::new(c("from_user")).string().not_null())
                .col(ColumnDef::new(c("to_user")).string().not_null())
                .col(ColumnDef::new(c("action")).string().not_null())
                .col(ColumnDef::new(c("timestamp")).big_integer().not_null())
                .build(PostgresQueryBuilder),
            Index::create().name("idx_routes_file_to_user").if_not_exists().table(t()).col(c("file_id")).col(c("to_user")).build(PostgresQueryBuilder),
        ]
    }
}

impl DbRow for data::Route {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &PgRow) -> std::result::Result<Self, DbError>
    where
        Self: Sized,
    {
        Ok(Self {
            id: row.try_get("id")?,
            file_id: row.try_get("file_id")?,
            from_user: row.try_get("from_user")?,
            to_user: row.try_get("to_user")?,
            action: row.try_get("action")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}
