//! Backend-neutral query description.
//!
//! A `Query` is a filter tree over record fields plus ordering and paging.
//! Field names are the serialized field names of the record, which are also
//! the column names of the postgres tables.

use serde_json::Value;

/// Default page size when a query does not set one.
pub const DEFAULT_LIMIT: usize = 10_000;

/// Filter expression over record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Eq(String, Value),
    Ne(String, Value),
    Lt(String, Value),
    Le(String, Value),
    Gt(String, Value),
    Ge(String, Value),
    In(String, Vec<Value>),
    IsNull(String),
    NotNull(String),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn eq(
        key: &str,
        value: impl Into<Value>,
    ) -> Self {
        Expr::Eq(key.to_string(), value.into())
    }

    pub fn ne(
        key: &str,
        value: impl Into<Value>,
    ) -> Self {
        Expr::Ne(key.to_string(), value.into())
    }

    pub fn lt(
        key: &str,
        value: impl Into<Value>,
    ) -> Self {
        Expr::Lt(key.to_string(), value.into())
    }

    pub fn le(
        key: &str,
        value: impl Into<Value>,
    ) -> Self {
        Expr::Le(key.to_string(), value.into())
    }

    pub fn gt(
        key: &str,
        value: impl Into<Value>,
    ) -> Self {
        Expr::Gt(key.to_string(), value.into())
    }

    pub fn ge(
        key: &str,
        value: impl Into<Value>,
    ) -> Self {
        Expr::Ge(key.to_string(), value.into())
    }

    pub fn is_in<V: Into<Value>>(
        key: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Expr::In(key.to_string(), values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(key: &str) -> Self {
        Expr::IsNull(key.to_string())
    }

    pub fn not_null(key: &str) -> Self {
        Expr::NotNull(key.to_string())
    }

    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    filters: Vec<Expr>,
    order_by: Vec<(String, bool)>,
    limit: usize,
    offset: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Adds a filter; all filters must hold.
    pub fn filter(
        mut self,
        expr: Expr,
    ) -> Self {
        self.filters.push(expr);
        self
    }

    /// Orders by `key`, descending when `rev` is true.
    pub fn order_by(
        mut self,
        key: &str,
        rev: bool,
    ) -> Self {
        self.order_by.push((key.to_string(), rev));
        self
    }

    pub fn limit(
        mut self,
        limit: usize,
    ) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn offset(
        mut self,
        offset: usize,
    ) -> Self {
        self.offset = offset;
        self
    }

    pub fn filters(&self) -> &[Expr] {
        &self.filters
    }

    pub fn orders(&self) -> &[(String, bool)] {
        &self.order_by
    }

    pub fn get_limit(&self) -> usize {
        self.limit
    }

    pub fn get_offset(&self) -> usize {
        self.offset
    }
}
