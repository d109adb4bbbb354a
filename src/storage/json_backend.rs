//! JSON-file store backend: one file per collection under the app data
//! directory, written atomically by staging to a temporary file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::StoreError;
use crate::utils::paths;

use super::{CategoryStore, Collection, RawRecord, StoreResult};

const COLLECTION_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

type Documents = BTreeMap<String, Map<String, Value>>;

/// File-backed document store keyed by collection name.
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Opens the store under the default app data directory
    /// (`STEWARD_CORE_HOME` override, else `~/.steward_core`).
    pub fn new_default() -> StoreResult<Self> {
        Self::new(paths::collections_dir())
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root
            .join(format!("{}.{}", collection.name(), COLLECTION_EXTENSION))
    }

    fn read_collection(&self, collection: Collection) -> StoreResult<Documents> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Documents::new());
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write_collection(&self, collection: Collection, documents: &Documents) -> StoreResult<()> {
        let path = self.collection_path(collection);
        let json = serde_json::to_string_pretty(documents)?;
        write_atomic(&path, &json)
    }
}

fn write_atomic(path: &Path, data: &str) -> StoreResult<()> {
    let tmp = path.with_extension(TMP_SUFFIX);
    fs::write(&tmp, data)?;
    fs::rename(tmp, path)?;
    Ok(())
}

impl CategoryStore for JsonStore {
    fn list_all(&self, collection: Collection) -> StoreResult<Vec<RawRecord>> {
        let documents = self.read_collection(collection)?;
        Ok(documents
            .into_iter()
            .map(|(id, fields)| RawRecord { id, fields })
            .collect())
    }

    fn write_one(&self, collection: Collection, fields: Map<String, Value>) -> StoreResult<String> {
        let mut documents = self.read_collection(collection)?;
        let id = Uuid::new_v4().to_string();
        documents.insert(id.clone(), fields);
        self.write_collection(collection, &documents)?;
        Ok(id)
    }

    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> StoreResult<()> {
        let mut documents = self.read_collection(collection)?;
        let document = documents.get_mut(id).ok_or_else(|| StoreError::Missing {
            collection: collection.name().into(),
            id: id.into(),
        })?;
        document.extend(fields);
        self.write_collection(collection, &documents)
    }

    fn delete_one(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let mut documents = self.read_collection(collection)?;
        if documents.remove(id).is_none() {
            return Err(StoreError::Missing {
                collection: collection.name().into(),
                id: id.into(),
            });
        }
        self.write_collection(collection, &documents)
    }
}
