use tracing::{debug, info};

use crate::backend::KvBackend;
use crate::{Result, TrendsError};

/// Stores rendered artifacts in the blob namespace of a [`KvBackend`].
///
/// Bytes are stored and returned unchanged. The cache never touches the structured namespace,
/// and [`clear`](ArtifactCache::clear) removes every artifact at once.
#[derive(Debug, Clone)]
pub struct ArtifactCache<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> ArtifactCache<B> {
    /// creates a cache over the blob namespace of `backend`
    pub fn new(backend: B) -> Self {
        ArtifactCache { backend }
    }

    /// stores `bytes` under `name`, replacing any previous artifact with that name
    pub fn store(&self, name: &str, bytes: &[u8]) -> Result<()> {
        debug!(name, len = bytes.len(), "storing artifact");
        self.backend.set_blob(name, bytes)
    }

    /// fetches the artifact stored under `name`
    ///
    /// # Errors
    /// returns [`TrendsError::ArtifactNotFound`] if nothing was stored under `name`
    pub fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        self.backend
            .get_blob(name)?
            .ok_or_else(|| TrendsError::ArtifactNotFound(name.to_string()))
    }

    /// returns `true` if an artifact is stored under `name`
    pub fn exists(&self, name: &str) -> Result<bool> {
        self.backend.blob_exists(name)
    }

    /// removes all artifacts
    pub fn clear(&self) -> Result<()> {
        self.backend.delete_all_blobs()?;
        info!("artifact cache cleared");
        Ok(())
    }
}
