use sea_query::{Alias as SeaAlias, ColumnDef, Index, PostgresQueryBuilder, SimpleExpr, Table};
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::store::{
    data,
    db::postgres::{DbRow, DbTable},
};

use super::{enum_col, json_col, json_text};

impl DbTable for data::Execution {
    const TABLE: &'static str = "executions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "wid",
        "file_id",
        "current_nid",
        "status",
        "variables",
        "version",
        "started_at",
        "entered_at",
        "completed_at",
        "paused_at",
        "timestamp",
    ];

    fn values(&self) -> Vec<SimpleExpr> {
        let data = self.clone();
        vec![
            data.id.into(),
            data.wid.into(),
            data.file_id.into(),
            data.current_nid.into(),
            data.status.as_ref().to_string().into(),
            json_text(&data.variables).into(),
            data.version.into(),
            data.started_at.into(),
            data.entered_at.into(),
            data.completed_at.into(),
            data.paused_at.into(),
            data.timestamp.into(),
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
                .col(ColumnDef::new(c("file_id")).string().not_null())
                .col(ColumnDef::new(c("current_nid")).string())
                .col(ColumnDef::new(c("status")).string().not_null())
                .col(ColumnDef::new(c("variables")).text().not_null().default("{}"))
                .col(ColumnDef::new(c("version")).big_integer().not_null().default(0))
                .col(ColumnDef::new(c("started_at")).big_integer().not_null())
                .col(ColumnDef::new(c("entered_at")).big_integer().not_null())
                .col(ColumnDef::new(c("completed_at")).big_integer())
                .col(ColumnDef::new(c("paused_at")).big_integer())
                .col(ColumnDef::new(c("timestamp")).big_integer().default(0))
                .build(PostgresQueryBuilder),
            Index::create().name("idx_executions_file_status").if_not_exists().table(t()).col(c("file_id")).col(c("status")).build(PostgresQueryBuilder),
            Index::create().name("idx_executions_wid_status").if_not_exists().table(t()).col(c("wid")).col(c("status")).build(PostgresQueryBuilder),
            // at most one running execution per file
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_executions_running_file ON executions (file_id) WHERE status = 'running'".to_string(),
        ]
    }
}

impl DbRow for data::Execution {
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
            file_id: row.try_get("file_id")?,
            current_nid: row.try_get("current_nid")?,
            status: enum_col(row, "status")?,
            variables: json_col(row, "variables")?,
            version: row.try_get("version")?,
            started_at: row.try_get("started_at")?,
            entered_at: row.try_get("entered_at")?,
            completed_at: row.try_get("completed_at")?,
            paused_at: row.try_get("paused_at")?,
            timestamp: row.try_get("timestamp")?,
        })
    }
}
