//! This module provides the key/value backends the dataset lives in.
//!
//! Every backend exposes two logically separate namespaces:
//! - a *structured* namespace mapping a key to a field map (one vehicle record)
//! - a *blob* namespace mapping a name to raw bytes (rendered charts)
//!
//! Three implementations are provided: an in-process [`MemoryBackend`], a persistent
//! [`SledBackend`] built on the [`sled`] database engine, and a [`RedisBackend`] that talks to
//! a remote redis server (hashes in db 0, blobs in db 1).
//!
//! [`sled`]: https://docs.rs/sled/latest/sled/
use crate::record::FieldMap;
use crate::Result;

/// A trait for the operations the dataset loader, query engine and artifact cache need
/// from a key/value backend.
///
/// A backend value is a cheap, cloneable *handle*; clones share the same underlying store.
/// No operation is transactional across calls.
pub trait KvBackend: Clone + Send + Sync + 'static {
    /// sets the field map stored at `key`.
    ///
    /// Any existing value at `key` is replaced wholesale, fields are never merged.
    fn set_fields(&self, key: &str, fields: &FieldMap) -> Result<()>;

    /// gets the field map stored at `key`
    ///
    /// Returns `None` if the given `key` does not exist.
    fn get_fields(&self, key: &str) -> Result<Option<FieldMap>>;

    /// lists every key of the structured namespace, in no particular order
    fn list_keys(&self) -> Result<Vec<String>>;

    /// removes every key of the structured namespace
    fn delete_all_keys(&self) -> Result<()>;

    /// stores `bytes` under `name` in the blob namespace, overwriting any previous blob
    fn set_blob(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// gets the blob stored under `name`
    ///
    /// Returns `None` if no blob exists with that name.
    fn get_blob(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// returns `true` if a blob exists under `name`
    fn blob_exists(&self, name: &str) -> Result<bool>;

    /// removes every blob of the blob namespace
    fn delete_all_blobs(&self) -> Result<()>;
}

mod memory;
mod redis;
mod sled;

pub use self::memory::MemoryBackend;
pub use self::redis::{RedisBackend, RedisPolicy};
pub use self::sled::SledBackend;
