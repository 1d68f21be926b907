//! Keyed Resource
//!
//! Shared machinery behind the derived views: one value per key, a generation
//! guard so a response for a superseded key is dropped, and a driver task that
//! follows a `watch` source.

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;
use quality_lens_core::{ErrorState, Fault};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// `{ value, loading, error }` for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<K, V> {
    pub key: Option<K>,
    pub value: V,
    pub loading: bool,
    pub error: ErrorState,
}

impl<K, V: Default> Default for Resource<K, V> {
    fn default() -> Self {
        Self {
            key: None,
            value: V::default(),
            loading: false,
            error: ErrorState::none(),
        }
    }
}

pub(crate) type Fetcher<K, V> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<V, Fault>> + Send + Sync>;

struct Inner<K, V> {
    name: &'static str,
    state: watch::Sender<Resource<K, V>>,
    generation: Mutex<u64>,
    fetch: Fetcher<K, V>,
}

/// Clonable handle to one keyed resource.
pub(crate) struct KeyedView<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for KeyedView<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> KeyedView<K, V>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    V: Clone + Default + Send + Sync + 'static,
{
    pub(crate) fn new(name: &'static str, fetch: Fetcher<K, V>) -> Self {
        let (state, _) = watch::channel(Resource::default());
        Self {
            inner: Arc::new(Inner {
                name,
                state,
                generation: Mutex::new(0),
                fetch,
            }),
        }
    }

    pub(crate) fn state(&self) -> Resource<K, V> {
        self.inner.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Resource<K, V>> {
        self.inner.state.subscribe()
    }

    /// Switch to `key` unless it is already the current one.
    pub(crate) fn follow(&self, key: Option<K>) -> Option<JoinHandle<()>> {
        if self.inner.state.borrow().key == key {
            return None;
        }
        self.load(key)
    }

    /// Fetch the current key again.
    pub(crate) async fn refetch(&self) {
        let key = self.inner.state.borrow().key.clone();
        if let Some(task) = self.load(key) {
            let _ = task.await;
        }
    }

    fn load(&self, key: Option<K>) -> Option<JoinHandle<()>> {
        let generation = self.begin(key.clone());
        let key = key?;
        let inner = self.inner.clone();
        Some(tokio::spawn(async move {
            let result = (inner.fetch)(key).await;
            Self::finish(&inner, generation, result);
        }))
    }

    fn begin(&self, key: Option<K>) -> u64 {
        let mut generation = self
            .inner
            .generation
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *generation += 1;

        self.inner.state.send_modify(|s| {
            if s.key != key {
                s.value = V::default();
            }
            s.loading = key.is_some();
            s.error.clear();
            s.key = key;
        });
        *generation
    }

    fn finish(inner: &Inner<K, V>, generation: u64, result: Result<V, Fault>) {
        let current = inner.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != generation {
            tracing::debug!(view = inner.name, "discarding response for superseded key");
            return;
        }

        inner.state.send_modify(|s| {
            s.loading = false;
            match result {
                Ok(value) => {
                    s.value = value;
                    s.error.clear();
                }
                Err(fault) => {
                    tracing::warn!(view = inner.name, error = %fault, "view fetch failed");
                    s.value = V::default();
                    s.error = ErrorState::from_fault(&fault);
                }
            }
        });
    }

    /// Follow `source`, re-keying whenever it changes, until `cancel` fires.
    pub(crate) fn drive<S, F>(
        &self,
        mut source: watch::Receiver<S>,
        cancel: CancellationToken,
        key_of: F,
    ) -> JoinHandle<()>
    where
        S: Send + Sync + 'static,
        F: Fn(&S) -> Option<K> + Send + 'static,
    {
        let view = self.clone();
        tokio::spawn(async move {
            loop {
                let key = key_of(&source.borrow_and_update());
                view.follow(key);

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = source.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        })
    }
}
