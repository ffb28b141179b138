//! Collection wrappers that misbehave on purpose, for exercising failure paths.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    FilingError, Result,
    store::{
        DbCollection, PageData,
        data::File,
        query::{Expr, Query},
    },
};

/// Wraps a file collection: queries can be answered from an old snapshot and
/// writes to one file id can be made to fail.
pub(crate) struct ScriptedFiles {
    inner: Arc<dyn DbCollection<Item = File> + Send + Sync>,
    snapshot: Option<Vec<File>>,
    broken_id: Option<String>,
}

impl ScriptedFiles {
    pub(crate) fn new(inner: Arc<dyn DbCollection<Item = File> + Send + Sync>) -> Self {
        Self {
            inner,
            snapshot: None,
            broken_id: None,
        }
    }

    /// Answers every query with `rows`, as a reader that raced a writer would see them.
    pub(crate) fn with_snapshot(
        mut self,
        rows: Vec<File>,
    ) -> Self {
        self.snapshot = Some(rows);
        self
    }

    /// Fails every update of `id`.
    pub(crate) fn breaking(
        mut self,
        id: &str,
    ) -> Self {
        self.broken_id = Some(id.to_string());
        self
    }

    fn check(
        &self,
        data: &File,
    ) -> Result<()> {
        match &self.broken_id {
            Some(id) if *id == data.id => Err(FilingError::Store(format!("write to file {} refused", id))),
            _ => Ok(()),
        }
    }
}

impl DbCollection for ScriptedFiles {
    type Item = File;

    fn exists(
        &self,
        id: &str,
    ) -> Result<bool> {
        self.inner.exists(id)
    }

    fn find(
        &self,
        id: &str,
    ) -> Result<File> {
        self.inner.find(id)
    }

    fn query(
        &self,
        query: &Query,
    ) -> Result<PageData<File>> {
        match &self.snapshot {
            // the whole snapshot fits in the first page; later pages are empty
            Some(rows) => {
                let rows: Vec<File> = if query.get_offset() == 0 {
                    rows.clone()
                } else {
                    Vec::new()
                };
                Ok(PageData {
                    count: rows.len(),
                    page_num: 1,
                    page_count: 1,
                    page_size: query.get_limit(),
                    rows,
                })
            }
            None => self.inner.query(query),
        }
    }

    fn create(
        &self,
        data: &File,
    ) -> Result<bool> {
        self.inner.create(data)
    }

    fn update(
        &self,
        data: &File,
    ) -> Result<bool> {
        self.check(data)?;
        self.inner.update(data)
    }

    fn update_if(
        &self,
        data: &File,
        guard: &Expr,
    ) -> Result<bool> {
        self.check(data)?;
        self.inner.update_if(data, guard)
    }

    fn delete(
        &self,
        id: &str,
    ) -> Result<bool> {
        self.inner.delete(id)
    }
}

/// Wraps any collection so `find` keeps answering with the row as it was first
/// read, like a caller that loaded it just before another writer committed.
pub(crate) struct StaleReads<T> {
    inner: Arc<dyn DbCollection<Item = T> + Send + Sync>,
    seen: Mutex<HashMap<String, T>>,
}

impl<T> StaleReads<T> {
    pub(crate) fn new(inner: Arc<dyn DbCollection<Item = T> + Send + Sync>) -> Self {
        Self {
            inner,
            seen: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Clone + Send + Sync> DbCollection for StaleReads<T> {
    type Item = T;

    fn exists(
        &self,
        id: &str,
    ) -> Result<bool> {
        self.inner.exists(id)
    }

    fn find(
        &self,
        id: &str,
    ) -> Result<T> {
        let mut seen = self.seen.lock().unwrap();
        if let Some(item) = seen.get(id) {
            return Ok(item.clone());
        }
        let item = self.inner.find(id)?;
        seen.insert(id.to_string(), item.clone());
        Ok(item)
    }

    fn query(
        &self,
        query: &Query,
    ) -> Result<PageData<T>> {
        self.inner.query(query)
    }

    fn create(
        &self,
        data: &T,
    ) -> Result<bool> {
        self.inner.create(data)
    }

    fn update(
        &self,
        data: &T,
    ) -> Result<bool> {
        self.inner.update(data)
    }

    fn update_if(
        &self,
        data: &T,
        guard: &Expr,
    ) -> Result<bool> {
        self.inner.update_if(data, guard)
    }

    fn delete(
        &self,
        id: &str,
    ) -> Result<bool> {
        self.inner.delete(id)
    }
}

/// Wraps any collection and refuses every insert.
pub(crate) struct RefusingCreates<T> {
    inner: Arc<dyn DbCollection<Item = T> + Send + Sync>,
}

impl<T> RefusingCreates<T> {
    pub(crate) fn new(inner: Arc<dyn DbCollection<Item = T> + Send + Sync>) -> Self {
        Self {
            inner,
        }
    }
}

impl<T: Send + Sync> DbCollection for RefusingCreates<T> {
    type Item = T;

    fn exists(
        &self,
        id: &str,
    ) -> Result<bool> {
        self.inner.exists(id)
    }

    fn find(
        &self,
        id: &str,
    ) -> Result<T> {
        self.inner.find(id)
    }

    fn query(
        &self,
        query: &Query,
    ) -> Result<PageData<T>> {
        self.inner.query(query)
    }

    fn create(
        &self,
        _data: &T,
    ) -> Result<bool> {
        Err(FilingError::Store("insert refused".to_string()))
    }

    fn update(
        &self,
        data: &T,
    ) -> Result<bool> {
        self.inner.update(data)
    }

    fn update_if(
        &self,
        data: &T,
        guard: &Expr,
    ) -> Result<bool> {
        self.inner.update_if(data, guard)
    }

    fn delete(
        &self,
        id: &str,
    ) -> Result<bool> {
        self.inner.delete(id)
    }
}
