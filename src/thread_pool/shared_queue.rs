use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, error, instrument};

use super::ThreadPool;
use crate::Result;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A thread pool implemented with a shared job queue (i.e. channel).
///
/// This implementation uses the MPMC [`channel`] provided by the crossbeam crate, as a single
/// producer (the pool itself) and multiple consumers (its worker threads).
///
/// A worker whose job panics is replaced by a fresh thread. Failing to spawn that replacement
/// is only logged, so the number of workers can shrink over time.
///
/// [`channel`]: https://docs.rs/crossbeam/0.8.1/crossbeam/channel/index.html
pub struct SharedQueueThreadPool {
    tx: Sender<Job>,
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let (tx, rx) = channel::unbounded::<Job>();
        for id in 0..threads {
            spawn_worker(JobReceiver { id, rx: rx.clone() })?;
        }
        debug!("created shared queue pool with {} threads", threads);
        Ok(SharedQueueThreadPool { tx })
    }

    /// Queues a job for the next idle worker.
    ///
    /// # Panics
    ///
    /// Panics if every worker thread has exited.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx
            .send(Box::new(job))
            .expect("There are no threads in the pool");
    }
}

fn spawn_worker(rx: JobReceiver) -> Result<()> {
    thread::Builder::new()
        .name(worker_name(rx.id))
        .spawn(move || run_jobs(rx))?;
    Ok(())
}

fn worker_name(id: u32) -> String {
    format!("autotrends-worker-{}", id)
}

/// Receives jobs from the pool's channel. Dropping it while panicking restarts the worker
/// under the same id.
#[derive(Clone, Debug)]
struct JobReceiver {
    id: u32,
    rx: Receiver<Job>,
}

impl Drop for JobReceiver {
    fn drop(&mut self) {
        if thread::panicking() {
            debug!("worker {} panicked, starting a new thread", self.id);
            if let Err(e) = spawn_worker(self.clone()) {
                error!("Failed to spawn a thread: {}", e);
            }
        }
    }
}

#[instrument(skip(rx))]
fn run_jobs(rx: JobReceiver) {
    while let Ok(job) = rx.rx.recv() {
        job();
    }
    debug!("worker exited because the thread pool was dropped");
}
