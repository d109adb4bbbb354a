//! Persistence seam for the category document collections.
//!
//! The engine only ever sees untyped [`RawRecord`]s; everything about the
//! underlying persistence format belongs to the backend. Timeouts and
//! retries are a backend concern too: the engine only distinguishes
//! success-with-data, success-with-zero-records, and read failure.

pub mod json_backend;
pub mod memory;

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::category::Category;
use crate::errors::StoreError;

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Document collections managed by a store backend: one per transaction
/// category plus the budget and goal record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Category(Category),
    Budgets,
    Goals,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Category(category) => category.collection_name(),
            Collection::Budgets => "budgets",
            Collection::Goals => "goals",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An untyped stored document plus its store-assigned key.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: String,
    pub fields: Map<String, Value>,
}

/// Abstraction over key-ordered document stores holding the category
/// collections. Backends must be shareable across the fan-out read
/// threads of an aggregation pass.
pub trait CategoryStore: Send + Sync {
    /// Returns every record in the collection, in key order. An empty
    /// collection is a successful read of zero records.
    fn list_all(&self, collection: Collection) -> StoreResult<Vec<RawRecord>>;

    /// Inserts a new record and returns its assigned id.
    fn write_one(&self, collection: Collection, fields: Map<String, Value>) -> StoreResult<String>;

    /// Merges `fields` into an existing record.
    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()>;

    fn delete_one(&self, collection: Collection, id: &str) -> StoreResult<()>;
}
