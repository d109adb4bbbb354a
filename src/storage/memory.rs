//! In-memory store backend for tests and ephemeral sessions.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::StoreError;

use super::{CategoryStore, Collection, RawRecord, StoreResult};

type Documents = BTreeMap<String, Map<String, Value>>;

/// Key-ordered in-memory document store.
///
/// Reads of individual collections can be made to fail on demand, which is
/// how the fail-closed aggregation paths are exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    collections: BTreeMap<&'static str, Documents>,
    failing: BTreeSet<&'static str>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent read of `collection` fail.
    pub fn fail_reads(&self, collection: Collection) {
        self.lock().failing.insert(collection.name());
    }

    /// Clears a failure injected by [`MemoryStore::fail_reads`].
    pub fn restore_reads(&self, collection: Collection) {
        self.lock().failing.remove(collection.name());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CategoryStore for MemoryStore {
    fn list_all(&self, collection: Collection) -> StoreResult<Vec<RawRecord>> {
        let inner = self.lock();
        if inner.failing.contains(collection.name()) {
            return Err(StoreError::Unavailable(collection.name().into()));
        }
        let records = inner
            .collections
            .get(collection.name())
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| RawRecord {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    fn write_one(&self, collection: Collection, fields: Map<String, Value>) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        self.lock()
            .collections
            .entry(collection.name())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()> {
        let mut inner = self.lock();
        let document = inner
            .collections
            .get_mut(collection.name())
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| StoreError::Missing {
                collection: collection.name().into(),
                id: id.into(),
            })?;
        document.extend(fields);
        Ok(())
    }

    fn delete_one(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let mut inner = self.lock();
        let removed = inner
            .collections
            .get_mut(collection.name())
            .and_then(|documents| documents.remove(id));
        match removed {
            Some(_) => Ok(()),
            None => Err(StoreError::Missing {
                collection: collection.name().into(),
                id: id.into(),
            }),
        }
    }
}
