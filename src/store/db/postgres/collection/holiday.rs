use sea_query::{Alias as SeaAlias, ColumnDef, PostgresQueryBuilder, SimpleExpr, Table};
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::store::{
    data,
    db::postgres::{DbRow, DbTable},
};

impl DbTable for data::Holiday {
    const TABLE: &'static str = "holidays";
    const COLUMNS: &'static [&'static str] = &["id", "date", "name"];

    fn values(&self) -> Vec<SimpleExpr> {
        let data = self.clone();
        vec![data.id.into(), data.date.into(), data.name.into()]
    }

    fn schema() -> Vec<String> {
        let c = |name: &str| SeaAlias::new(name);
        vec![
            Table::create()
                .table(SeaAlias::new(Self::TABLE))
                .if_not_exists()
                .col(ColumnDef::new(c("id")).string().not_null().primary_key())
                .col(ColumnDef::new(c("date")).string().not_null().unique_key())
                .col(ColumnDef::new(c("name")).string().not_null())
                .build(PostgresQueryBuilder),
        ]
    }
}

impl DbRow for data::Holiday {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &PgRow) -> std::result::Result<Self, DbError>
    where
        Self: Sized,
    {
        Ok(Self {
            id: row.try_get("id")?,
            date: row.try_get("date")?,
            name: row.try_get("name")?,
        })
    }
}
