use super::roller::Roller;
use crate::common::*;
use crate::config::RandomConfig;
use rand::{rngs::ThreadRng, Rng};
use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntropyError {
    #[error("entropy source timed out")]
    Timeout,
    #[error("entropy source unavailable: {0}")]
    Unavailable(String),
}

/// A remote supplier of uniformly distributed 32-bit values, such as a
/// true-random web service.
pub trait EntropySource: Send + Sync {
    fn fetch(&self, count: usize, timeout: Duration) -> Result<Vec<u32>, EntropyError>;
}

type Pool = Arc<Mutex<VecDeque<u32>>>;

fn lock(pool: &Mutex<VecDeque<u32>>) -> MutexGuard<'_, VecDeque<u32>> {
    pool.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Maps a uniform `u32` onto `1..=sides`.
fn scale(value: u32, sides: NonZeroUInt) -> UInt {
    ((value as u64 * sides.get() as u64) >> 32) as UInt + 1
}

/// A pool of prefetched random values shared between clones.
///
/// Rolls consume the pool first. Once it is empty, or when no source is
/// configured, they quietly fall back to the local generator, which clones
/// also share.
#[derive(Clone)]
pub struct RandomBuffer<R = ThreadRng> {
    pool: Pool,
    source: Option<Arc<dyn EntropySource>>,
    config: RandomConfig,
    refilling: Arc<AtomicBool>,
    fallback: Arc<Mutex<R>>,
}

impl RandomBuffer {
    pub fn new(config: RandomConfig) -> Self {
        Self::with_fallback(config, rand::thread_rng())
    }
}

impl<R: Rng> RandomBuffer<R> {
    pub fn with_fallback(config: RandomConfig, fallback: R) -> Self {
        Self {
            pool: Arc::default(),
            source: None,
            config,
            refilling: Arc::default(),
            fallback: Arc::new(Mutex::new(fallback)),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn EntropySource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn len(&self) -> usize {
        lock(&self.pool).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remote(&self) -> Option<&Arc<dyn EntropySource>> {
        self.source.as_ref().filter(|_| self.config.use_remote)
    }

    /// Whether the pool has dropped below the refill threshold. Always false
    /// when there is nothing to refill from.
    pub fn low(&self) -> bool {
        self.remote().is_some() && self.len() < self.config.refill_threshold
    }

    /// Tops up the pool on a background thread.
    ///
    /// Returns `None` without doing anything when no source is in use or a
    /// refill is already running.
    pub fn load_random_buffer(&self) -> Option<RefillHandle> {
        let source = Arc::clone(self.remote()?);
        if self.refilling.swap(true, Ordering::AcqRel) {
            trace!("refill already in flight");
            return None;
        }

        let pool = Arc::clone(&self.pool);
        let refilling = Arc::clone(&self.refilling);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let count = self.config.prefetch_count;
        let timeout = self.config.fetch_timeout();

        let spawned = thread::Builder::new()
            .name("random-buffer-refill".into())
            .spawn(move || {
                let added = match source.fetch(count, timeout) {
                    Ok(_) if flag.load(Ordering::Acquire) => {
                        debug!("refill cancelled");
                        0
                    }
                    Ok(values) => {
                        let added = values.len();
                        lock(&pool).extend(values);
                        debug!(added, "random buffer refilled");
                        added
                    }
                    Err(err) => {
                        warn!(%err, "could not refill random buffer, rolling locally");
                        0
                    }
                };
                refilling.store(false, Ordering::Release);
                added
            });

        match spawned {
            Ok(join) => Some(RefillHandle { join, cancelled }),
            Err(err) => {
                warn!(%err, "could not start refill thread");
                self.refilling.store(false, Ordering::Release);
                None
            }
        }
    }
}

impl<R: Rng> Roller for RandomBuffer<R> {
    fn roll(&mut self, sides: NonZeroUInt) -> UInt {
        let next = lock(&self.pool).pop_front();
        match next {
            Some(value) => scale(value, sides),
            None => {
                trace!("random buffer empty, rolling locally");
                self.fallback
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .gen_range(1..=sides.get())
            }
        }
    }
}

impl<R> std::fmt::Debug for RandomBuffer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomBuffer")
            .field("len", &lock(&self.pool).len())
            .field("remote", &self.source.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// A running refill. Dropping the handle detaches the thread.
#[derive(Debug)]
pub struct RefillHandle {
    join: JoinHandle<usize>,
    cancelled: Arc<AtomicBool>,
}

impl RefillHandle {
    /// Discards the fetched values instead of adding them to the pool.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the refill and returns how many values it added.
    pub fn join(self) -> usize {
        self.join.join().unwrap_or(0)
    }
}
