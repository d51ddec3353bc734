//! Thread pools the server hands incoming requests to.
//!
//! Two implementations are provided: [`SharedQueueThreadPool`], a fixed set of worker threads
//! consuming a crossbeam channel, and [`RayonThreadPool`], a wrapper around a rayon pool.
use crate::Result;

/// A pool of threads that runs jobs in the background
pub trait ThreadPool: Send + 'static {
    /// creates a pool with the given number of `threads`
    ///
    /// # Errors
    /// returns an error if the pool's threads could not be created
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// runs `job` on one of the pool's threads, without waiting for it to finish
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}

mod rayon_pool;
mod shared_queue;

pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;
