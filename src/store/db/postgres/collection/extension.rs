use sea_query::{Alias as SeaAlias, ColumnDef, Index, PostgresQueryBuilder, SimpleExpr, Table};
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::store::{
    data,
    db::postgres::{DbRow, DbTable},
};

use super::enum_col;

impl DbTable for data::Extension {
    const TABLE: &'static str = "extensions";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "file_id",
        "requested_by",
        "reason",
        "additional_time",
        "approver_id",
        "status",
        "approved_by",
        "approved_at",
        "approval_remarks",
        "create_time",
    ];

    fn values(&self) -> Vec<SimpleExpr> {
        let data = self.clone();
        vec![
            data.id.into(),
            data.file_id.into(),
            data.requested_by.into(),
            data.reason.into(),
            data.additional_time.into(),
            data.approver_id.into(),
            data.status.as_ref().to_string().into(),
            data.approved_by.into(),
            data.approved_at.into(),
            data.approval_remarks.into(),
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
                .col(ColumnDef::new(c("file_id")).string().not_null())
                .col(ColumnDef::new(c("requested_by")).string().not_null())
                .col(ColumnDef::new(c("reason")).text().not_null())
                .col(ColumnDef::new(c("additional_time")).big_integer().not_null())
                .col(ColumnDef::new(c("approver_id")).string().not_null())
                .col(ColumnDef::new(c("status")).string().not_null())
                .col(ColumnDef::new(c("approved_by")).string())
                .col(ColumnDef::new(c("approved_at")).big_integer())
                .col(ColumnDef::new(c("approval_remarks")).text())
                .col(ColumnDef::new(c("create_time")).big_integer().default(0))
                .build(PostgresQueryBuilder),
            Index::create().name("idx_extensions_file_id").if_not_exists().table(t()).col(c("file_id")).build(PostgresQueryBuilder),
        ]
    }
}

impl DbRow for data::Extension {
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
            requested_by: row.try_get("requested_by")?,
            reason: row.try_get("reason")?,
            additional_time: row.try_get("additional_time")?,
            approver_id: row.try_get("approver_id")?,
            status: enum_col(row, "status")?,
            approved_by: row.try_get("approved_by")?,
            approved_at: row.try_get("approved_at")?,
            approval_remarks: row.try_get("approval_remarks")?,
            create_time: row.try_get("create_time")?,
        })
    }
}
