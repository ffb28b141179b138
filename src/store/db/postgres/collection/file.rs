use sea_query::{Alias as SeaAlias, ColumnDef, Index, PostgresQueryBuilder, SimpleExpr, Table};
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::store::{
    data,
    db::postgres::{DbRow, DbTable},
};

use super::enum_col;

impl DbTable for data::File {
    const TABLE: &'static str = "files";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "file_number",
        "subject",
        "department_id",
        "created_by",
        "assigned_to",
        "status",
        "due_date",
        "desk_due_date",
        "allotted_time",
        "time_remaining",
        "timer_percentage",
        "is_red_listed",
        "red_listed_at",
        "is_on_hold",
        "hold_reason",
        "version",
        "create_time",
        "update_time",
    ];

    fn values(&self) -> Vec<SimpleExpr> {
        let data = self.clone();
        vec![
            data.id.into(),
            data.file_number.into(),
            data.subject.into(),
            data.department_id.into(),
            data.created_by.into(),
            data.assigned_to.into(),
            data.status.as_ref().to_string().into(),
            data.due_date.into(),
            data.desk_due_date.into(),
            data.allotted_time.into(),
            data.time_remaining.into(),
            data.timer_percentage.into(),
            data.is_red_listed.into(),
            data.red_listed_at.into(),
            data.is_on_hold.into(),
            data.hold_reason.into(),
            data.version.into(),
            data.create_time.into(),
            data.update_time.into(),
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
                .col(ColumnDef::new(c("file_number")).string().not_null())
                .col(ColumnDef::new(c("subject")).text().not_null().default(""))
                .col(ColumnDef::new(c("department_id")).string().not_null())
                .col(ColumnDef::new(c("created_by")).string().not_null())
                .col(ColumnDef::new(c("assigned_to")).string())
                .col(ColumnDef::new(c("status")).string().not_null())
                .col(ColumnDef::new(c("due_date")).big_integer())
                .col(ColumnDef::new(c("desk_due_date")).big_integer())
                .col(ColumnDef::new(c("allotted_time")).big_integer().not_null().default(0))
                .col(ColumnDef::new(c("time_remaining")).big_integer())
                .col(ColumnDef::new(c("timer_percentage")).big_integer().not_null().default(100))
                .col(ColumnDef::new(c("is_red_listed")).boolean().not_null().default(false))
                .col(ColumnDef::new(c("red_listed_at")).big_integer())
                .col(ColumnDef::new(c("is_on_hold")).boolean().not_null().default(false))
                .col(ColumnDef::new(c("hold_reason")).text())
                .col(ColumnDef::new(c("version")).big_integer().not_null().default(0))
                .col(ColumnDef::new(c("create_time")).big_integer().default(0))
                .col(ColumnDef::new(c("update_time")).big_integer().default(0))
                .build(PostgresQueryBuilder),
            Index::create().name("idx_files_status").if_not_exists().table(t()).col(c("status")).build(PostgresQueryBuilder),
            Index::create().name("idx_files_red_listed").if_not_exists().table(t()).col(c("is_red_listed")).build(PostgresQueryBuilder),
        ]
    }
}

impl DbRow for data::File {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &PgRow) -> std::result::Result<Self, DbError>
    where
        Self: Sized,
    {
        Ok(Self {
            id: row.try_get("id")?,
            file_number: row.try_get("file_number")?,
            subject: row.try_get("subject")?,
            department_id: row.try_get("department_id")?,
            created_by: row.try_get("created_by")?,
            assigned_to: row.try_get("assigned_to")?,
            status: enum_col(row, "status")?,
            due_date: row.try_get("due_date")?,
            desk_due_date: row.try_get("desk_due_date")?,
            allotted_time: row.try_get("allotted_time")?,
            time_remaining: row.try_get("time_remaining")?,
            timer_percentage: row.try_get("timer_percentage")?,
            is_red_listed: row.try_get("is_red_listed")?,
            red_listed_at: row.try_get("red_listed_at")?,
            is_on_hold: row.try_get("is_on_hold")?,
            hold_reason: row.try_get("hold_reason")?,
            version: row.try_get("version")?,
            create_time: row.try_get("create_time")?,
            update_time: row.try_get("update_time")?,
        })
    }
}
