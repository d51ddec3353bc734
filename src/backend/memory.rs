use std::sync::Arc;

use dashmap::DashMap;

use super::KvBackend;
use crate::record::FieldMap;
use crate::Result;

/// An in-process backend holding both namespaces in concurrent hash maps.
///
/// Nothing is persisted; dropping the last handle drops the data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Arc<DashMap<String, FieldMap>>,
    blobs: Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// creates an empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn set_fields(&self, key: &str, fields: &FieldMap) -> Result<()> {
        self.records.insert(key.to_string(), fields.clone());
        Ok(())
    }

    fn get_fields(&self, key: &str) -> Result<Option<FieldMap>> {
        Ok(self.records.get(key).map(|entry| entry.value().clone()))
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.records.iter().map(|entry| entry.key().clone()).collect())
    }

    fn delete_all_keys(&self) -> Result<()> {
        self.records.clear();
        Ok(())
    }

    fn set_blob(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.blobs.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(name).map(|entry| entry.value().clone()))
    }

    fn blob_exists(&self, name: &str) -> Result<bool> {
        Ok(self.blobs.contains_key(name))
    }

    fn delete_all_blobs(&self) -> Result<()> {
        self.blobs.clear();
        Ok(())
    }
}
