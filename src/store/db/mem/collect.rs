use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use serde_json::Value as JsonValue;
use tracing::trace;

use crate::{
    FilingError, Result,
    store::{
        DbCollection, PageData,
        query::{Expr, Query},
    },
};

use super::DbDocument;

#[derive(Debug)]
struct Entry<T> {
    seq: u64,
    item: T,
}

#[derive(Debug)]
struct Inner<T> {
    next_seq: u64,
    entries: HashMap<String, Entry<T>>,
}

/// In-memory collection; rows come back in insertion order unless the query orders them.
#[derive(Debug)]
pub struct Collect<T> {
    name: String,
    inner: RwLock<Inner<T>>,
}

impl<T> Collect<T>
where
    T: DbDocument,
{
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inner: RwLock::new(Inner {
                next_seq: 0,
                entries: HashMap::new(),
            }),
        }
    }

    fn not_found(
        &self,
        id: &str,
    ) -> FilingError {
        FilingError::NotFound(format!("{} {} not found", self.name, id))
    }
}

impl<T> DbCollection for Collect<T>
where
    T: DbDocument,
{
    type Item = T;

    fn exists(
        &self,
        id: &str,
    ) -> Result<bool> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.entries.contains_key(id))
    }

    fn find(
        &self,
        id: &str,
    ) -> Result<Self::Item> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.entries.get(id).map(|e| e.item.clone()).ok_or_else(|| self.not_found(id))
    }

    fn query(
        &self,
        q: &Query,
    ) -> Result<PageData<Self::Item>> {
        trace!("mem::{}::query({:?})", self.name, q);
        let mut matched = {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            let mut matched = Vec::new();
            for entry in inner.entries.values() {
                let doc = entry.item.doc()?;
                if q.filters().iter().all(|f| eval(&doc, f)) {
                    matched.push((entry.seq, doc, entry.item.clone()));
                }
            }
            matched
        };

        matched.sort_by(|(seq_a, doc_a, _), (seq_b, doc_b, _)| {
            for (key, rev) in q.orders() {
                let ord = compare(doc_a.get(key), doc_b.get(key));
                let ord = if *rev {
                    ord.reverse()
                } else {
                    ord
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            seq_a.cmp(seq_b)
        });

        let count = matched.len();
        let limit = q.get_limit();
        let rows = matched.into_iter().skip(q.get_offset()).take(limit).map(|(_, _, item)| item).collect::<Vec<_>>();

        Ok(PageData {
            count,
            page_num: q.get_offset() / limit + 1,
            page_count: count.div_ceil(limit),
            page_size: limit,
            rows,
        })
    }

    fn create(
        &self,
        data: &Self::Item,
    ) -> Result<bool> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.entries.contains_key(data.id()) {
            return Err(FilingError::Store(format!("{} {} already exists", self.name, data.id())));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(
            data.id().to_string(),
            Entry {
                seq,
                item: data.clone(),
            },
        );
        Ok(true)
    }

    fn update(
        &self,
        data: &Self::Item,
    ) -> Result<bool> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match inner.entries.get_mut(data.id()) {
            Some(entry) => {
                entry.item = data.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_if(
        &self,
        data: &Self::Item,
        guard: &Expr,
    ) -> Result<bool> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match inner.entries.get_mut(data.id()) {
            Some(entry) if eval(&entry.item.doc()?, guard) => {
                entry.item = data.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete(
        &self,
        id: &str,
    ) -> Result<bool> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Ok(inner.entries.remove(id).is_some())
    }
}

fn eval(
    doc: &HashMap<String, JsonValue>,
    expr: &Expr,
) -> bool {
    let field = |key: &String| doc.get(key).filter(|v| !v.is_null());
    match expr {
        Expr::Eq(key, value) => field(key).is_some_and(|v| v == value),
        Expr::Ne(key, value) => field(key).is_some_and(|v| v != value),
        Expr::Lt(key, value) => field(key).is_some_and(|v| compare(Some(v), Some(value)) == Ordering::Less),
        Expr::Le(key, value) => field(key).is_some_and(|v| compare(Some(v), Some(value)) != Ordering::Greater),
        Expr::Gt(key, value) => field(key).is_some_and(|v| compare(Some(v), Some(value)) == Ordering::Greater),
        Expr::Ge(key, value) => field(key).is_some_and(|v| compare(Some(v), Some(value)) != Ordering::Less),
        Expr::In(key, values) => field(key).is_some_and(|v| values.contains(v)),
        Expr::IsNull(key) => field(key).is_none(),
        Expr::NotNull(key) => field(key).is_some(),
        Expr::And(exprs) => exprs.iter().all(|e| eval(doc, e)),
        Expr::Or(exprs) => exprs.iter().any(|e| eval(doc, e)),
    }
}

/// Orders nulls first, then numbers, strings and booleans by value.
fn compare(
    a: Option<&JsonValue>,
    b: Option<&JsonValue>,
) -> Ordering {
    match (a, b) {
        (Some(JsonValue::Number(a)), Some(JsonValue::Number(b))) => a.as_f64().partial_cmp(&b.as_f64()).unwrap_or(Ordering::Equal),
        (Some(JsonValue::String(a)), Some(JsonValue::String(b))) => a.cmp(b),
        (Some(JsonValue::Bool(a)), Some(JsonValue::Bool(b))) => a.cmp(b),
        (None | Some(JsonValue::Null), None | Some(JsonValue::Null)) => Ordering::Equal,
        (None | Some(JsonValue::Null), _) => Ordering::Less,
        (_, None | Some(JsonValue::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Doc {
        id: String,
        group: String,
        rank: Option<i64>,
    }

    impl DbDocument for Doc {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn doc(
        id: &str,
        group: &str,
        rank: Option<i64>,
    ) -> Doc {
        Doc {
            id: id.to_string(),
            group: group.to_string(),
            rank,
        }
    }

    fn collect() -> Collect<Doc> {
        let c = Collect::new("doc");
        c.create(&doc("a", "x", Some(3))).unwrap();
        c.create(&doc("b", "y", None)).unwrap();
        c.create(&doc("c", "x", Some(-1))).unwrap();
        c.create(&doc("d", "z", Some(7))).unwrap();
        c
    }

    fn ids(page: PageData<Doc>) -> Vec<String> {
        page.rows.into_iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_insertion_order_by_default() {
        let c = collect();
        assert_eq!(ids(c.query(&Query::new()).unwrap()), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_filter_and_order() {
        let c = collect();
        let q = Query::new().filter(Expr::eq("group", "x")).order_by("rank", true);
        assert_eq!(ids(c.query(&q).unwrap()), vec!["a", "c"]);
    }

    #[test]
    fn test_null_never_compares() {
        let c = collect();
        let q = Query::new().filter(Expr::le("rank", 0));
        assert_eq!(ids(c.query(&q).unwrap()), vec!["c"]);

        let q = Query::new().filter(Expr::is_null("rank"));
        assert_eq!(ids(c.query(&q).unwrap()), vec!["b"]);
    }

    #[test]
    fn test_or_and_in() {
        let c = collect();
        let q = Query::new().filter(Expr::or(vec![Expr::ge("rank", 5), Expr::eq("group", "y")])).filter(Expr::is_in("group", ["y", "z"]));
        assert_eq!(ids(c.query(&q).unwrap()), vec!["b", "d"]);
    }

    #[test]
    fn test_paging() {
        let c = collect();
        let page = c.query(&Query::new().limit(3).offset(3)).unwrap();
        assert_eq!(page.count, 4);
        assert_eq!(page.page_num, 2);
        assert_eq!(page.page_count, 2);
        assert_eq!(ids(page), vec!["d"]);
    }

    #[test]
    fn test_find_missing_is_not_found() {
        let c = collect();
        assert!(matches!(c.find("zz"), Err(FilingError::NotFound(_))));
        assert!(c.create(&doc("a", "x", None)).is_err());
        assert!(!c.update(&doc("zz", "x", None)).unwrap());
        assert!(c.delete("a").unwrap());
        assert!(!c.exists("a").unwrap());
    }

    #[test]
    fn test_update_if_checks_stored_row() {
        let c = collect();
        assert!(c.update_if(&doc("a", "x", Some(4)), &Expr::eq("rank", 3)).unwrap());
        // the stored rank is now 4, so the same guard no longer holds
        assert!(!c.update_if(&doc("a", "x", Some(5)), &Expr::eq("rank", 3)).unwrap());
        assert_eq!(c.find("a").unwrap().rank, Some(4));
        assert!(!c.update_if(&doc("zz", "x", None), &Expr::is_null("rank")).unwrap());
    }
}
