use sea_query::{Alias as SeaAlias, ColumnDef, Index, PostgresQueryBuilder, SimpleExpr, Table};
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::store::{
    data,
    db::postgres::{DbRow, DbTable},
};

use super::{json_col, json_text};

impl DbTable for data::Step {
    const TABLE: &'static str = "steps";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "eid",
        "seq",
        "nid",
        "node_name",
        "action",
        "performed_by",
        "result",
        "output",
        "remarks",
        "started_at",
        "completed_at",
        "duration",
    ];

    fn values(&self) -> Vec<SimpleExpr> {
        let data = self.clone();
        vec![
            data.id.into(),
            data.eid.into(),
            data.seq.into(),
            data.nid.into(),
            data.node_name.into(),
            data.action.into(),
            data.performed_by.into(),
            data.result.into(),
            json_text(&data.output).into(),
            data.remarks.into(),
            data.started_at.into(),
            data.completed_at.into(),
            data.duration.into(),
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
                .col(ColumnDef::new(c("eid")).string().not_null())
                .col(ColumnDef::new(c("seq")).big_integer().not_null())
                .col(ColumnDef::new(c("nid")).string().not_null())
                .col(ColumnDef::new(c("node_name")).string().not_null())
                .col(ColumnDef::new(c("action")).string().not_null())
                .col(ColumnDef::new(c("performed_by")).string())
                .col(ColumnDef::new(c("result")).string())
                .col(ColumnDef::new(c("output")).text().not_null().default("{}"))
                .col(ColumnDef::new(c("remarks")).text())
                .col(ColumnDef::new(c("started_at")).big_integer().not_null())
                .col(ColumnDef::new(c("completed_at")).big_integer())
                .col(ColumnDef::new(c("duration")).big_integer())
                .build(PostgresQueryBuilder),
            Index::create().name("idx_steps_eid_seq").if_not_exists().unique().table(t()).col(c("eid")).col(c("seq")).build(PostgresQueryBuilder),
        ]
    }
}

impl DbRow for data::Step {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &PgRow) -> std::result::Result<Self, DbError>
    where
        Self: Sized,
    {
        Ok(Self {
            id: row.try_get("id")?,
            eid: row.try_get("eid")?,
            seq: row.try_get("seq")?,
            nid: row.try_get("nid")?,
            node_name: row.try_get("node_name")?,
            action: row.try_get("action")?,
            performed_by: row.try_get("performed_by")?,
            result: row.try_get("result")?,
            output: json_col(row, "output")?,
            remarks: row.try_get("remarks")?,
            started_at: row.try_get("started_at")?,
            completed_at: row.try_get("completed_at")?,
            duration: row.try_get("duration")?,
        })
    }
}
