use std::{
    any::Any,
    collections::HashMap,
    convert::AsRef,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::trace;

use crate::{FilingError, Result, ShareLock};

use super::{
    DbCollection, DbCollectionIden, StoreIden,
    data::*,
    query::{Expr, Query},
};

/// Attempts `update_file` makes before giving up on a row that keeps changing.
const MAX_WRITE_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct DynDbSetRef<T>(Arc<dyn DbCollection<Item = T>>);

/// Registry of typed collections, filled by a `DbStore` backend on init.
pub struct Store {
    collections: ShareLock<HashMap<StoreIden, Arc<dyn Any + Send + Sync + 'static>>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the collection registered for `DATA`.
    ///
    /// Every record type is registered by both backends during `DbStore::init`,
    /// so a miss here means the store was used before initialization.
    pub fn collection<DATA>(&self) -> Result<Arc<dyn DbCollection<Item = DATA>>>
    where
        DATA: DbCollectionIden + Send + Sync + 'static,
    {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);

        collections
            .get(&DATA::iden())
            .and_then(|collection| collection.downcast_ref::<DynDbSetRef<DATA>>())
            .map(|v| v.0.clone())
            .ok_or_else(|| FilingError::Store(format!("fail to get collection: {}", DATA::iden().as_ref())))
    }

    pub fn register<DATA>(
        &self,
        collection: Arc<dyn DbCollection<Item = DATA> + Send + Sync + 'static>,
    ) where
        DATA: DbCollectionIden + 'static,
    {
        trace!("store::register({})", DATA::iden().as_ref());
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        collections.insert(DATA::iden(), Arc::new(DynDbSetRef::<DATA>(collection)));
    }

    pub fn workflows(&self) -> Result<Arc<dyn DbCollection<Item = Workflow>>> {
        self.collection()
    }

    pub fn nodes(&self) -> Result<Arc<dyn DbCollection<Item = Node>>> {
        self.collection()
    }

    pub fn edges(&self) -> Result<Arc<dyn DbCollection<Item = Edge>>> {
        self.collection()
    }

    pub fn executions(&self) -> Result<Arc<dyn DbCollection<Item = Execution>>> {
        self.collection()
    }

    pub fn steps(&self) -> Result<Arc<dyn DbCollection<Item = Step>>> {
        self.collection()
    }

    pub fn files(&self) -> Result<Arc<dyn DbCollection<Item = File>>> {
        self.collection()
    }

    pub fn extensions(&self) -> Result<Arc<dyn DbCollection<Item = Extension>>> {
        self.collection()
    }

    pub fn holidays(&self) -> Result<Arc<dyn DbCollection<Item = Holiday>>> {
        self.collection()
    }

    pub fn routes(&self) -> Result<Arc<dyn DbCollection<Item = Route>>> {
        self.collection()
    }

    /// Runs `query` against the collection for `DATA` and returns the matching rows.
    pub fn select<DATA>(
        &self,
        query: &Query,
    ) -> Result<Vec<DATA>>
    where
        DATA: DbCollectionIden + Send + Sync + 'static,
    {
        Ok(self.collection::<DATA>()?.query(query)?.rows)
    }

    /// Every row matching `query`, fetched page by page with the query's limit as page size.
    ///
    /// Rows are additionally ordered by id so pages stay stable on backends
    /// without an implicit order. All pages are read before returning, so
    /// callers may update rows that drop out of the filter.
    pub fn select_all<DATA>(
        &self,
        query: Query,
    ) -> Result<Vec<DATA>>
    where
        DATA: DbCollectionIden + Send + Sync + 'static,
    {
        let collection = self.collection::<DATA>()?;
        let page_size = query.get_limit();
        let query = query.order_by("id", false);

        let mut rows = Vec::new();
        loop {
            let page = collection.query(&query.clone().offset(rows.len()))?.rows;
            let done = page.len() < page_size;
            rows.extend(page);
            if done {
                return Ok(rows);
            }
        }
    }

    /// Re-reads a file, lets `edit` change it and writes it back only if no
    /// other writer got in between.
    ///
    /// `edit` returns false to leave the row untouched. A conflicting write
    /// makes the whole read-edit-write start over; after repeated conflicts
    /// the call fails with InvalidState.
    pub fn update_file(
        &self,
        id: &str,
        mut edit: impl FnMut(&mut File) -> bool,
    ) -> Result<File> {
        let files = self.files()?;
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let mut file = files.find(id)?;
            let read_version = file.version;
            if !edit(&mut file) {
                return Ok(file);
            }
            file.version = read_version + 1;
            if files.update_if(&file, &Expr::eq("version", read_version))? {
                return Ok(file);
            }
            trace!("store::update_file({}) conflict at version {}", id, read_version);
        }
        Err(FilingError::InvalidState(format!("file {} keeps changing, gave up after {} attempts", id, MAX_WRITE_ATTEMPTS)))
    }

    /// Like `select`, returning only the first row.
    pub fn select_one<DATA>(
        &self,
        query: Query,
    ) -> Result<Option<DATA>>
    where
        DATA: DbCollectionIden + Send + Sync + 'static,
    {
        Ok(self.select::<DATA>(&query.limit(1))?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DbStore, MemStore};

    fn store() -> Store {
        let store = Store::new();
        MemStore::new().init(&store).unwrap();
        store
    }

    #[test]
    fn test_select_all_reads_every_page() {
        let store = store();
        for i in 0..5 {
            store.holidays().unwrap().create(&Holiday {
                id: format!("h{}", i),
                date: format!("2026-01-0{}", i + 1),
                name: "holiday".to_string(),
            }).unwrap();
        }
        let rows: Vec<Holiday> = store.select_all(Query::new().limit(2)).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(), vec!["h0", "h1", "h2", "h3", "h4"]);

        let none: Vec<Holiday> = store.select_all(Query::new().filter(Expr::eq("name", "nope")).limit(2)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_update_file_bumps_version_and_skips() {
        let store = store();
        let file = File::new("F-1", "Leave", "d1", "clerk");
        store.files().unwrap().create(&file).unwrap();

        let updated = store.update_file(&file.id, |f| {
            f.is_on_hold = true;
            true
        }).unwrap();
        assert_eq!(updated.version, file.version + 1);

        let untouched = store.update_file(&file.id, |_| false).unwrap();
        assert_eq!(untouched.version, updated.version);

        // a write based on the old version no longer applies
        assert!(!store.files().unwrap().update_if(&file, &Expr::eq("version", file.version)).unwrap());
        assert!(store.files().unwrap().find(&file.id).unwrap().is_on_hold);
    }
}
