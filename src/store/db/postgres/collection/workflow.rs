use sea_query::{Alias as SeaAlias, ColumnDef, Index, PostgresQueryBuilder, SimpleExpr, Table};
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::store::{
    data,
    db::postgres::{DbRow, DbTable},
};

impl DbTable for data::Workflow {
    const TABLE: &'static str = "workflows";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "code",
        "desc",
        "department_id",
        "file_type",
        "priority_category",
        "is_draft",
        "is_active",
        "is_published",
        "version",
        "created_by",
        "published_by",
        "published_at",
        "create_time",
        "update_time",
    ];

    fn values(&self) -> Vec<SimpleExpr> {
        let data = self.clone();
        vec![
            data.id.into(),
            data.name.into(),
            data.code.into(),
            data.desc.into(),
            data.department_id.into(),
            data.file_type.into(),
            data.priority_category.into(),
            data.is_draft.into(),
            data.is_active.into(),
            data.is_published.into(),
            data.version.into(),
            data.created_by.into(),
            data.published_by.into(),
            data.published_at.into(),
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
                .col(ColumnDef::new(c("name")).string().not_null())
                .col(ColumnDef::new(c("code")).string().not_null().unique_key())
                .col(ColumnDef::new(c("desc")).text().not_null().default(""))
                .col(ColumnDef::new(c("department_id")).string())
                .col(ColumnDef::new(c("file_type")).string())
                .col(ColumnDef::new(c("priority_category")).string())
                .col(ColumnDef::new(c("is_draft")).boolean().not_null().default(true))
                .col(ColumnDef::new(c("is_active")).boolean().not_null().default(false))
                .col(ColumnDef::new(c("is_published")).boolean().not_null().default(false))
                .col(ColumnDef::new(c("version")).big_integer().not_null().default(1))
                .col(ColumnDef::new(c("created_by")).string().not_null())
                .col(ColumnDef::new(c("published_by")).string())
                .col(ColumnDef::new(c("published_at")).big_integer())
                .col(ColumnDef::new(c("create_time")).big_integer().default(0))
                .col(ColumnDef::new(c("update_time")).big_integer().default(0))
                .build(PostgresQueryBuilder),
            Index::create().name("idx_workflows_department").if_not_exists().table(t()).col(c("department_id")).build(PostgresQueryBuilder),
        ]
    }
}

impl DbRow for data::Workflow {
    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &PgRow) -> std::result::Result<Self, DbError>
    where
        Self: Sized,
    {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            code: row.try_get("code")?,
            desc: row.try_get("desc")?,
            department_id: row.try_get("department_id")?,
            file_type: row.try_get("file_type")?,
            priority_category: row.try_get("priority_category")?,
            is_draft: row.try_get("is_draft")?,
            is_active: row.try_get("is_active")?,
            is_published: row.try_get("is_published")?,
            version: row.try_get("version")?,
            created_by: row.try_get("created_by")?,
            published_by: row.try_get("published_by")?,
            published_at: row.try_get("published_at")?,
            create_time: row.try_get("create_time")?,
            update_time: row.try_get("update_time")?,
        })
    }
}
