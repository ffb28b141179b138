mod edge;
mod execution;
mod extension;
mod file;
mod holiday;
mod node;
mod route;
mod step;
mod workflow;

use std::{marker::PhantomData, str::FromStr, sync::Arc};

use sea_query::{
    Alias as SeaAlias, Cond, Condition, ConditionExpression, Expr as SeaExpr, Func as SeaFunc, Order as SeaOrder, PostgresQueryBuilder, Query as SeaQuery, SimpleExpr,
    Value as SeaValue,
};
use sea_query_binder::SqlxBinder;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;
use sqlx::{Error as DbError, Row, postgres::PgRow};
use tracing::trace;

use crate::{
    FilingError, Result,
    store::{
        DbCollection, PageData,
        db::postgres::{DbInit, DbTable},
        query::{Expr, Query},
    },
};

use super::synclient::SynClient;

pub type DbConnection = Arc<SynClient>;

fn map_db_err(err: DbError) -> FilingError {
    match err {
        DbError::RowNotFound => FilingError::NotFound(err.to_string()),
        _ => FilingError::Store(err.to_string()),
    }
}

fn col(name: &str) -> SeaExpr {
    SeaExpr::col(SeaAlias::new(name))
}

fn into_value(value: &JsonValue) -> SeaValue {
    match value {
        JsonValue::String(s) => s.clone().into(),
        JsonValue::Bool(b) => (*b).into(),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => i.into(),
            None => n.as_f64().unwrap_or_default().into(),
        },
        JsonValue::Null => SeaValue::String(None),
        other => other.to_string().into(),
    }
}

fn into_expr(expr: &Expr) -> ConditionExpression {
    let leaf = |e: SimpleExpr| ConditionExpression::SimpleExpr(e);
    match expr {
        Expr::Eq(key, value) => leaf(col(key).eq(into_value(value))),
        Expr::Ne(key, value) => leaf(col(key).ne(into_value(value))),
        Expr::Lt(key, value) => leaf(col(key).lt(into_value(value))),
        Expr::Le(key, value) => leaf(col(key).lte(into_value(value))),
        Expr::Gt(key, value) => leaf(col(key).gt(into_value(value))),
        Expr::Ge(key, value) => leaf(col(key).gte(into_value(value))),
        Expr::In(key, values) => leaf(col(key).is_in(values.iter().map(into_value))),
        Expr::IsNull(key) => leaf(col(key).is_null()),
        Expr::NotNull(key) => leaf(col(key).is_not_null()),
        Expr::And(exprs) => ConditionExpression::Condition(exprs.iter().fold(Cond::all(), |cond, e| cond.add(into_expr(e)))),
        Expr::Or(exprs) => ConditionExpression::Condition(exprs.iter().fold(Cond::any(), |cond, e| cond.add(into_expr(e)))),
    }
}

pub fn into_query(q: &Query) -> Condition {
    q.filters().iter().fold(Cond::all(), |cond, e| cond.add(into_expr(e)))
}

/// Serializes a structured field into a text column.
pub(super) fn json_text<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Reads a structured field back from a text column.
pub(super) fn json_col<T: DeserializeOwned>(
    row: &PgRow,
    name: &str,
) -> std::result::Result<T, DbError> {
    let text: String = row.try_get(name)?;
    serde_json::from_str(&text).map_err(|e| DbError::Decode(Box::new(e)))
}

/// Reads an enum stored by its string form.
pub(super) fn enum_col<T>(
    row: &PgRow,
    name: &str,
) -> std::result::Result<T, DbError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.try_get(name)?;
    text.parse().map_err(|e: T::Err| DbError::Decode(Box::new(e)))
}

pub(super) fn opt_enum_col<T>(
    row: &PgRow,
    name: &str,
) -> std::result::Result<Option<T>, DbError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: Option<String> = row.try_get(name)?;
    text.map(|t| t.parse().map_err(|e: T::Err| DbError::Decode(Box::new(e)))).transpose()
}

/// A postgres table holding records of type `T`.
#[derive(Debug)]
pub struct Collection<T> {
    conn: DbConnection,
    _item: PhantomData<fn() -> T>,
}

impl<T: DbTable> Collection<T> {
    pub fn new(conn: &DbConnection) -> Self {
        Self {
            conn: conn.clone(),
            _item: PhantomData,
        }
    }

    fn table() -> SeaAlias {
        SeaAlias::new(T::TABLE)
    }

    fn columns() -> impl Iterator<Item = SeaAlias> {
        T::COLUMNS.iter().map(|c| SeaAlias::new(*c))
    }

    fn key() -> &'static str {
        T::COLUMNS[0]
    }
}

impl<T: DbTable> DbCollection for Collection<T> {
    type Item = T;

    fn exists(
        &self,
        id: &str,
    ) -> Result<bool> {
        let (sql, values) = SeaQuery::select()
            .from(Self::table())
            .expr(SeaFunc::count(col(Self::key())))
            .and_where(col(Self::key()).eq(id))
            .build_sqlx(PostgresQueryBuilder);

        let count = self.conn.query_one(sql.as_str(), values).and_then(|row| row.try_get::<i64, usize>(0)).map_err(map_db_err)?;

        Ok(count > 0)
    }

    fn find(
        &self,
        id: &str,
    ) -> Result<Self::Item> {
        let (sql, values) = SeaQuery::select().from(Self::table()).columns(Self::columns()).and_where(col(Self::key()).eq(id)).build_sqlx(PostgresQueryBuilder);

        let row = self.conn.query_one(&sql, values).map_err(|e| match e {
            DbError::RowNotFound => FilingError::NotFound(format!("{} {} not found", T::TABLE, id)),
            e => map_db_err(e),
        })?;
        T::from_row(&row).map_err(map_db_err)
    }

    fn query(
        &self,
        q: &Query,
    ) -> Result<PageData<Self::Item>> {
        trace!("postgres::{}::query({:?})", T::TABLE, q);
        let filter = into_query(q);

        let mut count_query = SeaQuery::select();
        count_query.from(Self::table()).expr(SeaFunc::count(col(Self::key())));

        let mut query = SeaQuery::select();
        query.columns(Self::columns()).from(Self::table());

        if !filter.is_empty() {
            count_query.cond_where(filter.clone());
            query.cond_where(filter);
        }

        for (order, rev) in q.orders().iter() {
            query.order_by(
                SeaAlias::new(order.as_str()),
                if *rev {
                    SeaOrder::Desc
                } else {
                    SeaOrder::Asc
                },
            );
        }
        let (sql, values) = query.limit(q.get_limit() as u64).offset(q.get_offset() as u64).build_sqlx(PostgresQueryBuilder);

        let (count_sql, count_values) = count_query.build_sqlx(PostgresQueryBuilder);
        let count = self.conn.query_one(count_sql.as_str(), count_values).and_then(|row| row.try_get::<i64, usize>(0)).map_err(map_db_err)? as usize;
        let rows = self.conn.query(&sql, values).map_err(map_db_err)?.iter().map(T::from_row).collect::<std::result::Result<Vec<_>, _>>().map_err(map_db_err)?;

        Ok(PageData {
            count,
            page_size: q.get_limit(),
            page_num: q.get_offset() / q.get_limit() + 1,
            page_count: count.div_ceil(q.get_limit()),
            rows,
        })
    }

    fn create(
        &self,
        data: &Self::Item,
    ) -> Result<bool> {
        let (sql, sql_values) = SeaQuery::insert()
            .into_table(Self::table())
            .columns(Self::columns())
            .values(data.values())
            .map_err(|e| FilingError::Store(e.to_string()))?
            .build_sqlx(PostgresQueryBuilder);

        let result = self.conn.execute(sql.as_str(), sql_values).map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    fn update(
        &self,
        data: &Self::Item,
    ) -> Result<bool> {
        let values: Vec<(SeaAlias, SimpleExpr)> = Self::columns().zip(data.values()).skip(1).collect();
        let (sql, sql_values) = SeaQuery::update().table(Self::table()).values(values).and_where(col(Self::key()).eq(data.id())).build_sqlx(PostgresQueryBuilder);

        let result = self.conn.execute(sql.as_str(), sql_values).map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    fn update_if(
        &self,
        data: &Self::Item,
        guard: &Expr,
    ) -> Result<bool> {
        let values: Vec<(SeaAlias, SimpleExpr)> = Self::columns().zip(data.values()).skip(1).collect();
        let (sql, sql_values) = SeaQuery::update()
            .table(Self::table())
            .values(values)
            .cond_where(Cond::all().add(col(Self::key()).eq(data.id())).add(into_expr(guard)))
            .build_sqlx(PostgresQueryBuilder);

        let result = self.conn.execute(sql.as_str(), sql_values).map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    fn delete(
        &self,
        id: &str,
    ) -> Result<bool> {
        let (sql, values) = SeaQuery::delete().from_table(Self::table()).and_where(col(Self::key()).eq(id)).build_sqlx(PostgresQueryBuilder);

        let result = self.conn.execute(sql.as_str(), values).map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

impl<T: DbTable> DbInit for Collection<T> {
    fn init(&self) -> Result<()> {
        self.conn.batch_execute(&T::schema()).map_err(map_db_err)
    }
}
