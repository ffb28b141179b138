use sea_query::{Alias as SeaAlias, ColumnDef, Index, PostgresQueryBuilder, SimpleExpr, Table};
use sqlx::{Error as DbError, Row, postgres::PgRow};

use crate::store::{
    data,
    db::postgres::{DbRow, DbTable},
};

use super::{enum_col, json_col, json_text, opt_enum_col};

impl DbTable for data::Node {
    const TABLE: &'static str = "nodes";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "wid",
        "nid",
        "node_type",
        "label",
        "desc",
        "assignee_type",
        "assignee_value",
        "time_limit",
        "time_unit",
        "available_actions",
        "conditions",
        "position_x",
        "position_y",
        "config",
        "seq",
        "create_time",
    ];

    fn values(&self) -> Vec<SimpleExpr> {
        let data = self.clone();
        vec![
            data.id.into(),
            data.wid.into(),
            data.nid.into(),
            data.node_type.as_ref().to_string().into(),
            data.label.into(),
            data.desc.into(),
            data.assignee_type.map(|t| t.as_ref().to_string()).into(),
            data.assignee_value.into(),
            data.time_limit.into(),
            data.time_unit.map(|u| u.as_ref().to_string()).into(),
            json_text(&data.available_actions).into(),
            json_text(&data.conditions).into(),
            data.position_x.into(),
            data.position_y.into(),
            json_text(&data.config).into(),
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
                .col(ColumnDef::new(c("nid")).string().not_null())
                .col(ColumnDef::new(c("node_type")).string().not_null())
                .col(ColumnDef::new(c("label")).string().not_null())
                .col(ColumnDef::new(c("desc")).text().not_null().default(""))
                .col(ColumnDef::new(c("assignee_type")).string())
                .col(ColumnDef::new(c("assignee_value")).string())
                .col(ColumnDef::new(c("time_limit")).big_integer())
                .col(ColumnDef::new(c("time_unit")).string())
                .col(ColumnDef::new(c("available_actions")).text().not_null().default("[]"))
                .col(ColumnDef::new(c("conditions")).text().not_null().default("[]"))
                .col(ColumnDef::new(c("position_x")).double().not_null().default(0.0))
                .col(ColumnDef::new(c("position_y")).double().not_null().default(0.0))
                .col(ColumnDef::new(c("config")).text().not_null().default("{}"))
                .col(ColumnDef::new(c("seq")).big_integer().not_null().default(0))
                .col(ColumnDef::new(c("create_time")).big_integer().default(0))
                .build(PostgresQueryBuilder),
            Index::create().name("idx_nodes_wid_nid").if_not_exists().unique().table(t()).col(c("wid")).col(c("nid")).build(PostgresQueryBuilder),
        ]
    }
}

impl DbRow for data::Node {
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
            nid: row.try_get("nid")?,
            node_type: enum_col(row, "node_type")?,
            label: row.try_get("label")?,
            desc: row.try_get("desc")?,
            assignee_type: opt_enum_col(row, "assignee_type")?,
            assignee_value: row.try_get("assignee_value")?,
            time_limit: row.try_get("time_limit")?,
            time_unit: opt_enum_col(row, "time_unit")?,
            available_actions: json_col(row, "available_actions")?,
            conditions: json_col(row, "conditions")?,
            position_x: row.try_get("position_x")?,
            position_y: row.try_get("position_y")?,
            config: json_col(row, "config")?,
            seq: row.try_get("seq")?,
            create_time: row.try_get("create_time")?,
        })
    }
}
