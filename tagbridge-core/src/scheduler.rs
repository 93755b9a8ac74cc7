//! Fail-fast parallel batch processing
//!
//! A fixed pool of workers claims text indices from a shared atomic counter,
//! so long and short texts balance out without static partitioning. Each
//! claimed index owns exactly one result slot. The first failure flips a
//! shared flag; workers stop claiming once they observe it, and after every
//! worker has joined the whole batch is torn down.

use crate::builder::{DocumentBuilder, Pipeline};
use crate::config::BridgeConfig;
use crate::engine::Model;
use crate::error::{Error, Result};
use crate::record::{Batch, Document};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Runs one [`DocumentBuilder`] per text over a fixed worker pool
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    config: BridgeConfig,
}

impl BatchScheduler {
    /// Create a scheduler
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Number of workers used for a batch of `batch_len` texts
    pub fn worker_count(&self, batch_len: usize) -> usize {
        let available = self.config.max_threads.unwrap_or_else(num_cpus::get);
        available.min(batch_len).max(1)
    }

    /// Process every text; either all documents are returned in input order
    /// or the first observed failure is.
    pub fn run<S>(&self, model: &dyn Model, texts: &[S], pipeline: &Pipeline) -> Result<Batch>
    where
        S: AsRef<str> + Sync,
    {
        if texts.is_empty() {
            return Ok(Batch::default());
        }

        let workers = self.worker_count(texts.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tagbridge-worker-{i}"))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;

        tracing::debug!(texts = texts.len(), workers, "starting batch");

        let builder = DocumentBuilder::new(model, &self.config);
        let slots: Vec<OnceLock<Document>> = (0..texts.len()).map(|_| OnceLock::new()).collect();
        let next_index = AtomicUsize::new(0);
        let success = AtomicBool::new(true);
        let failure: OnceLock<(usize, Error)> = OnceLock::new();

        // The scope is the join barrier: nothing below runs before every
        // worker has returned.
        pool.scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|_| {
                    while success.load(Ordering::Acquire) {
                        let index = next_index.fetch_add(1, Ordering::Relaxed);
                        let Some(text) = texts.get(index) else {
                            break;
                        };
                        match builder.build(text.as_ref(), pipeline) {
                            Ok(document) => {
                                // fetch_add hands out every index once, so the
                                // slot is always empty here
                                let _ = slots[index].set(document);
                            }
                            Err(e) => {
                                success.store(false, Ordering::Release);
                                let _ = failure.set((index, e));
                            }
                        }
                    }
                });
            }
        });

        if !success.load(Ordering::Acquire) {
            let torn_down = slots.iter().filter(|slot| slot.get().is_some()).count();
            drop(slots);
            let (index, source) = failure
                .into_inner()
                .ok_or_else(|| Error::ThreadPool("worker failed without a cause".to_string()))?;
            tracing::warn!(index, torn_down, error = %source, "batch failed");
            return Err(Error::Batch {
                index,
                source: Box::new(source),
            });
        }

        let documents = slots
            .into_iter()
            .map(OnceLock::into_inner)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::ThreadPool("batch slot left unpopulated".to_string()))?;
        Ok(Batch::new(documents))
    }
}
