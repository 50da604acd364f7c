//! Request-scoped batching loader.
//!
//! A [`Loader`] handle feeds `(key, reply)` pairs into a single dispatcher
//! task. The dispatcher owns the batch window, the waiters and the result
//! cache, so no state is shared between handles except the channel.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time;
use tracing::{debug, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// How long the window stays open after the first key arrives.
    pub wait: Duration,
    /// Dispatch early once this many distinct keys are pending. `None`
    /// keeps every key of the window in one call.
    pub max_batch: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(1),
            max_batch: None,
        }
    }
}

/// One grouped backend call for a relation kind.
#[async_trait]
pub trait BatchFn<K, V>: Send + Sync + 'static {
    /// Relation name used in logs.
    fn name(&self) -> &'static str;

    /// Keys arrive deduplicated, in first-request order. Keys missing from
    /// the returned map resolve to `V::default()`.
    async fn load(&self, keys: Vec<K>) -> Result<HashMap<K, V>>;
}

struct LoadRequest<K, V> {
    key: K,
    reply: oneshot::Sender<Result<V>>,
}

pub struct Loader<K, V> {
    tx: mpsc::UnboundedSender<LoadRequest<K, V>>,
}

impl<K, V> Clone for Loader<K, V> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<K, V> Loader<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Default + Send + Sync + 'static,
{
    /// Spawns the dispatcher; it stops once every handle is dropped.
    pub fn new<F>(batch_fn: F, config: LoaderConfig) -> Self
    where
        F: BatchFn<K, V>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher {
            batch_fn,
            config,
            cache: HashMap::new(),
        };
        tokio::spawn(dispatcher.run(rx));
        Self { tx }
    }

    pub async fn load(&self, key: K) -> Result<V> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(LoadRequest { key, reply })
            .map_err(|_| Error::Internal("Loader dispatcher has stopped".to_string()))?;
        rx.await
            .map_err(|_| Error::Internal("Loader reply dropped".to_string()))?
    }

    /// Values in the order of `keys`. Fails with the first error encountered.
    pub async fn load_many(&self, keys: Vec<K>) -> Result<Vec<V>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        futures::future::try_join_all(keys.into_iter().map(|key| self.load(key))).await
    }
}

type Cached<V> = std::result::Result<V, Arc<Error>>;

struct PendingBatch<K, V> {
    keys: Vec<K>,
    waiters: HashMap<K, Vec<oneshot::Sender<Result<V>>>>,
}

impl<K: Eq + Hash + Clone, V> PendingBatch<K, V> {
    fn new() -> Self {
        Self {
            keys: Vec::new(),
            waiters: HashMap::new(),
        }
    }

    fn push(&mut self, key: K, reply: oneshot::Sender<Result<V>>) {
        match self.waiters.entry(key) {
            Entry::Occupied(mut e) => e.get_mut().push(reply),
            Entry::Vacant(e) => {
                self.keys.push(e.key().clone());
                e.insert(vec![reply]);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn is_full(&self, max_batch: Option<usize>) -> bool {
        max_batch.is_some_and(|max| self.keys.len() >= max)
    }
}

struct Dispatcher<K, V, F> {
    batch_fn: F,
    config: LoaderConfig,
    cache: HashMap<K, Cached<V>>,
}

impl<K, V, F> Dispatcher<K, V, F>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Default + Send + Sync + 'static,
    F: BatchFn<K, V>,
{
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<LoadRequest<K, V>>) {
        while let Some(first) = rx.recv().await {
            let mut batch = PendingBatch::new();
            self.enqueue(&mut batch, first);
            if batch.is_empty() {
                continue;
            }

            if !batch.is_full(self.config.max_batch) {
                let window = time::sleep(self.config.wait);
                tokio::pin!(window);
                loop {
                    tokio::select! {
                        biased;

                        _ = &mut window => break,
                        next = rx.recv() => match next {
                            Some(request) => {
                                self.enqueue(&mut batch, request);
                                if batch.is_full(self.config.max_batch) {
                                    break;
                                }
                            }
                            None => break,
                        },
                    }
                }
            }

            self.dispatch(batch).await;
        }
        debug!(relation = self.batch_fn.name(), "loader dispatcher stopped");
    }

    fn enqueue(&self, batch: &mut PendingBatch<K, V>, request: LoadRequest<K, V>) {
        if let Some(cached) = self.cache.get(&request.key) {
            let _ = request.reply.send(cached.clone().map_err(Error::Batch));
            return;
        }
        batch.push(request.key, request.reply);
    }

    async fn dispatch(&mut self, batch: PendingBatch<K, V>) {
        if batch.is_empty() {
            return;
        }
        let PendingBatch { keys, mut waiters } = batch;
        debug!(
            relation = self.batch_fn.name(),
            keys = keys.len(),
            "dispatching loader batch"
        );

        match self.batch_fn.load(keys.clone()).await {
            Ok(mut values) => {
                for key in keys {
                    let value = values.remove(&key).unwrap_or_default();
                    for reply in waiters.remove(&key).unwrap_or_default() {
                        let _ = reply.send(Ok(value.clone()));
                    }
                    self.cache.insert(key, Ok(value));
                }
            }
            Err(err) => {
                warn!(relation = self.batch_fn.name(), error = %err, ?keys, "loader batch failed");
                let shared = Arc::new(err);
                for key in keys {
                    for reply in waiters.remove(&key).unwrap_or_default() {
                        let _ = reply.send(Err(Error::Batch(shared.clone())));
                    }
                    self.cache.insert(key, Err(shared.clone()));
                }
            }
        }
    }
}
