use tracing::debug;

use super::ThreadPool;
use crate::{Result, TrendsError};

/// A thread pool that uses the work stealing strategy implemented by the [`Rayon`] library.
///
/// [`Rayon`]: https://docs.rs/rayon/latest/rayon/index.html
pub struct RayonThreadPool {
    pool: rayon::ThreadPool,
}

impl ThreadPool for RayonThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .thread_name(|i| format!("autotrends-rayon-{}", i))
            .build()
            .map_err(|e| TrendsError::StringErr(format!("could not build thread pool: {:?}", e)))?;
        debug!("created rayon pool with {} threads", threads);

        Ok(Self { pool })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }
}
