use std::thread;
use std::time::Duration;

use redis::{Client, Commands, Connection, RedisResult};
use tracing::{debug, info, warn};

use super::KvBackend;
use crate::record::FieldMap;
use crate::{Result, TrendsError};

/// the redis database holding vehicle records as hashes
pub const RECORDS_DB: u8 = 0;
/// the redis database holding rendered charts as raw strings
pub const BLOBS_DB: u8 = 1;

/// Retry settings for calls made against a redis server.
#[derive(Debug, Clone)]
pub struct RedisPolicy {
    /// total attempts per operation, including the first one
    pub retry_attempts: usize,
    /// pause between two attempts
    pub retry_backoff: Duration,
}

impl Default for RedisPolicy {
    fn default() -> Self {
        Self {
            retry_attempts: 2,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

/// A backend that delegates both namespaces to a remote redis server.
///
/// Records are stored as redis hashes in db 0 and charts as plain string values in db 1, so
/// flushing one namespace never touches the other. Every operation opens a fresh connection
/// from the shared [`Client`]; only connection and IO failures are retried.
#[derive(Debug, Clone)]
pub struct RedisBackend {
    records: Client,
    blobs: Client,
    policy: RedisPolicy,
}

impl RedisBackend {
    /// creates a backend for the redis server listening on `host`:`port`.
    ///
    /// No connection is made until the first operation.
    pub fn new(host: &str, port: u16, policy: RedisPolicy) -> Result<Self> {
        info!("using redis backend at {}:{}", host, port);
        let records = Client::open(format!("redis://{}:{}/{}", host, port, RECORDS_DB))?;
        let blobs = Client::open(format!("redis://{}:{}/{}", host, port, BLOBS_DB))?;
        Ok(RedisBackend {
            records,
            blobs,
            policy,
        })
    }

    /// creates a backend from two redis connection urls, one per namespace
    pub fn from_urls(records_url: &str, blobs_url: &str, policy: RedisPolicy) -> Result<Self> {
        Ok(RedisBackend {
            records: Client::open(records_url)?,
            blobs: Client::open(blobs_url)?,
            policy,
        })
    }

    fn with_retry<T, F>(&self, client: &Client, mut op: F) -> Result<T>
    where
        F: FnMut(&mut Connection) -> RedisResult<T>,
    {
        let attempts = self.policy.retry_attempts.max(1);
        let mut last = None;
        for attempt in 0..attempts {
            match client.get_connection().and_then(|mut conn| op(&mut conn)) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_connection_refusal() || e.is_io_error() || e.is_timeout() => {
                    warn!("redis attempt {} of {} failed: {}", attempt + 1, attempts, e);
                    last = Some(e);
                    if attempt + 1 < attempts {
                        thread::sleep(self.policy.retry_backoff);
                    }
                }
                Err(e) => return Err(TrendsError::Redis(e)),
            }
        }
        Err(last
            .map(TrendsError::Redis)
            .unwrap_or_else(|| TrendsError::Backend("redis failure".to_string())))
    }
}

impl KvBackend for RedisBackend {
    fn set_fields(&self, key: &str, fields: &FieldMap) -> Result<()> {
        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        self.with_retry(&self.records, |conn| {
            // an existing hash must not keep fields the new row lacks
            redis::pipe()
                .atomic()
                .del(key)
                .ignore()
                .hset_multiple(key, &items)
                .ignore()
                .query(conn)
        })
    }

    fn get_fields(&self, key: &str) -> Result<Option<FieldMap>> {
        let fields: FieldMap = self.with_retry(&self.records, |conn| conn.hgetall(key))?;
        // redis reports a missing hash as an empty one
        if fields.is_empty() {
            Ok(None)
        } else {
            Ok(Some(fields))
        }
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        let keys: Vec<String> = self.with_retry(&self.records, |conn| conn.keys("*"))?;
        debug!("redis holds {} record keys", keys.len());
        Ok(keys)
    }

    fn delete_all_keys(&self) -> Result<()> {
        self.with_retry(&self.records, |conn| redis::cmd("FLUSHDB").query(conn))
    }

    fn set_blob(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.with_retry(&self.blobs, |conn| conn.set(name, bytes))
    }

    fn get_blob(&self, name: &str) -> Result<Option<Vec<u8>>> {
        self.with_retry(&self.blobs, |conn| conn.get(name))
    }

    fn blob_exists(&self, name: &str) -> Result<bool> {
        self.with_retry(&self.blobs, |conn| conn.exists(name))
    }

    fn delete_all_blobs(&self) -> Result<()> {
        self.with_retry(&self.blobs, |conn| redis::cmd("FLUSHDB").query(conn))
    }
}
