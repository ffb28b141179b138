use sea_query::{Alias as SeaAlias, ColumnDef, Index, PostgresQueryBuilder, SimpleExpr, Table};
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::store::{
    data,
    db::postgres::{DbRow, DbTable},
};

use super::{json_col, json_text};

impl DbTable for data::Edge {
    const TABLE: &'static str = "edges";
    const COLUMNS: &'static [&'static str] = &["id", "wid", "source", "target", "label", "condition", "priority", "style", "seq", "create_time"];

    fn values(&self) -> Vec<SimpleExpr> {
        let data = self.clone();
        vec![
            data.id.into(),
            data.wid.into(),
            data.source.into(),
            data.target.into(),
            data.label.into(),
            json_text(&data.condition).into(),
            data.priority.into(),
            json_text(&data.style).into(),
            data.seq.into(),
            data.create_time.into(),
        ]
    }

    fn schema() -> Vec<String> {
        let t = || SeaAlias::new(Self::TABLE);
        let c = |name: &str| SeaAlias::new(name);
        vec![
            Table::create()
                .table(t())
                .if_not_exists()
                .col(ColumnDef::new(c("id")).string().not_null().primary_key())
                .col(ColumnDef::new(c("wid")).string().not_null())
                .col(ColumnDef::new(c("source")).string().not_null())
                .col(ColumnDef::new(c("target")).string().not_null())
                .col(ColumnDef::new(c("label")).string())
                .col(ColumnDef::new(c("condition")).text().not_null().default("null"))
                .col(ColumnDef::new(c("priority")).big_integer().not_null().default(0))
                .col(ColumnDef::new(c("style")).text().not_null().default("{}"))
                .col(ColumnDef::new(c("seq")).big_integer().not_null().default(0))
                .col(ColumnDef::new(c("create_time")).big_integer().default(0))
                .build(PostgresQueryBuilder),
            Index::create().name("idx_edges_wid").if_not_exists().table(t()).col(c("wid")).build(PostgresQueryBuilder),
            Index::create().name("idx_edges_source").if_not_exists().table(t()).col(c("source")).build(PostgresQueryBuilder),
        ]
    }
}

impl DbRow for data::Edge {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &PgRow) -> std::result::Result<Self, DbError>
    where
        Self: Sized,
    {
        Ok(Self {
            id: row.try_get("id")?,
            wid: row.try_get("wid")?,
            source: row.try_get("source")?,
            target: row.try_get("target")?,
            label: row.try_get("label")?,
            condition: json_col(row, "condition")?,
            priority: row.try_get("priority")?,
            style: json_col(row, "style")?,
            seq: row.try_get("seq")?,
            create_time: row.try_get("create_time")?,
        })
    }
}
