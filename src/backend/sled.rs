use std::path::Path;

use sled::{Db, Tree};
use tracing::{debug, info, instrument};

use super::KvBackend;
use crate::record::FieldMap;
use crate::{Result, TrendsError};

// names of the sled trees backing each namespace
const RECORDS_TREE: &str = "records";
const BLOBS_TREE: &str = "blobs";

/// A persistent backend built on the [`sled`] embedded database.
///
/// The structured namespace is the `records` tree, with each field map serialized as a JSON
/// object. The blob namespace is the `blobs` tree, holding raw bytes.
///
/// [`sled`]: https://docs.rs/sled/latest/sled/
#[derive(Debug, Clone)]
pub struct SledBackend {
    db: Db,
    records: Tree,
    blobs: Tree,
}

impl SledBackend {
    /// opens (or creates) a sled database in the given `dir`
    #[instrument]
    pub fn open(dir: &Path) -> Result<Self> {
        info!("opening sled backend");
        let db = sled::open(dir)?;
        Self::new(db)
    }

    /// creates a backend over an already opened sled [`Db`]
    pub fn new(db: Db) -> Result<Self> {
        let records = db.open_tree(RECORDS_TREE)?;
        let blobs = db.open_tree(BLOBS_TREE)?;
        debug!(records = records.len(), blobs = blobs.len());
        Ok(SledBackend { db, records, blobs })
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl KvBackend for SledBackend {
    fn set_fields(&self, key: &str, fields: &FieldMap) -> Result<()> {
        let value = serde_json::to_vec(fields)?;
        self.records.insert(key.as_bytes(), value)?;
        self.flush()
    }

    fn get_fields(&self, key: &str) -> Result<Option<FieldMap>> {
        match self.records.get(key.as_bytes())? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        self.records
            .iter()
            .keys()
            .map(|key| {
                let key = key?;
                String::from_utf8(key.to_vec()).map_err(|e| {
                    TrendsError::Backend(format!("non utf-8 key in records tree: {}", e))
                })
            })
            .collect()
    }

    fn delete_all_keys(&self) -> Result<()> {
        self.records.clear()?;
        self.flush()
    }

    fn set_blob(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.blobs.insert(name.as_bytes(), bytes)?;
        self.flush()
    }

    fn get_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(name.as_bytes())?.map(|ivec| ivec.to_vec()))
    }

    fn blob_exists(&self, name: &str) -> Result<bool> {
        Ok(self.blobs.contains_key(name.as_bytes())?)
    }

    fn delete_all_blobs(&self) -> Result<()> {
        self.blobs.clear()?;
        self.flush()
    }
}
