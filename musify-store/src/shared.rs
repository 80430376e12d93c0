//! Multicast of a push stream with replay of the latest value.
//!
//! A [`ReplayHub`] starts its upstream stream when the first subscriber
//! arrives and shares it with every later subscriber. New subscribers receive
//! the most recent value first. Consecutive equal values are delivered once.
//! When the last subscriber leaves, the upstream is dropped after the linger
//! period unless someone subscribes again in the meantime.

use futures::stream::{BoxStream, Stream, StreamExt};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

type Factory<T> = Box<dyn Fn() -> BoxStream<'static, T> + Send + Sync>;

struct Upstream<T> {
    rx: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

struct HubState<T> {
    upstream: Option<Upstream<T>>,
    subscribers: usize,
    /// Incremented whenever the hub goes from idle to subscribed.
    epoch: u64,
}

struct HubInner<T> {
    name: &'static str,
    factory: Factory<T>,
    linger: Duration,
    state: Mutex<HubState<T>>,
}

impl<T> HubInner<T> {
    fn lock(&self) -> MutexGuard<'_, HubState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop_if_idle(&self, epoch: u64) {
        let mut state = self.lock();
        if state.subscribers == 0 && state.epoch == epoch {
            if let Some(upstream) = state.upstream.take() {
                debug!(hub = self.name, "Last subscriber left, stopping upstream");
                upstream.task.abort();
            }
        }
    }
}

/// Shared, replaying view of a push stream.
pub struct ReplayHub<T> {
    inner: Arc<HubInner<T>>,
}

impl<T> Clone for ReplayHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ReplayHub<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a hub that opens upstream streams with `factory`.
    pub fn new<F>(name: &'static str, linger: Duration, factory: F) -> Self
    where
        F: Fn() -> BoxStream<'static, T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(HubInner {
                name,
                factory: Box::new(factory),
                linger,
                state: Mutex::new(HubState {
                    upstream: None,
                    subscribers: 0,
                    epoch: 0,
                }),
            }),
        }
    }

    /// Joins the hub, starting the upstream if it is not running.
    ///
    /// Must be called within a Tokio runtime.
    pub fn subscribe(&self) -> HubSubscription<T> {
        let mut state = self.inner.lock();
        let running = state
            .upstream
            .as_ref()
            .is_some_and(|upstream| !upstream.task.is_finished());
        if !running {
            debug!(hub = self.inner.name, "Starting upstream");
            state.upstream = Some(self.start());
        }
        if state.subscribers == 0 {
            state.epoch += 1;
        }
        state.subscribers += 1;
        let rx = state
            .upstream
            .as_ref()
            .map(|upstream| upstream.rx.clone());

        HubSubscription {
            rx,
            replayed: false,
            hub: Arc::clone(&self.inner),
        }
    }

    fn start(&self) -> Upstream<T> {
        let (tx, rx) = watch::channel(None);
        let mut stream = (self.inner.factory)();
        let task = tokio::spawn(async move {
            while let Some(value) = stream.next().await {
                tx.send_if_modified(|current| {
                    if current.as_ref() == Some(&value) {
                        false
                    } else {
                        *current = Some(value);
                        true
                    }
                });
            }
        });
        Upstream { rx, task }
    }

    /// The most recent upstream value, if any.
    pub fn latest(&self) -> Option<T> {
        self.inner
            .lock()
            .upstream
            .as_ref()
            .and_then(|upstream| upstream.rx.borrow().clone())
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers
    }

    /// True while the upstream stream is open.
    pub fn is_active(&self) -> bool {
        self.inner
            .lock()
            .upstream
            .as_ref()
            .is_some_and(|upstream| !upstream.task.is_finished())
    }
}

impl<T> std::fmt::Debug for ReplayHub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayHub")
            .field("name", &self.inner.name)
            .field("linger", &self.inner.linger)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// One subscriber's view of a [`ReplayHub`]. Dropping it leaves the hub.
pub struct HubSubscription<T: Send + Sync + 'static> {
    rx: Option<watch::Receiver<Option<T>>>,
    replayed: bool,
    hub: Arc<HubInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> HubSubscription<T> {
    /// Waits for the next value. Returns `None` once the upstream has ended.
    pub async fn next(&mut self) -> Option<T> {
        let rx = self.rx.as_mut()?;
        if !self.replayed {
            self.replayed = true;
            let current = rx.borrow_and_update().clone();
            if current.is_some() {
                return current;
            }
        }
        loop {
            rx.changed().await.ok()?;
            let current = rx.borrow_and_update().clone();
            if current.is_some() {
                return current;
            }
        }
    }

    /// Converts into a stream of values.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send {
        futures::stream::unfold(self, |mut sub| async move {
            let value = sub.next().await?;
            Some((value, sub))
        })
    }
}

impl<T: Send + Sync + 'static> Drop for HubSubscription<T> {
    fn drop(&mut self) {
        let (remaining, epoch) = {
            let mut state = self.hub.lock();
            state.subscribers = state.subscribers.saturating_sub(1);
            (state.subscribers, state.epoch)
        };
        if remaining > 0 {
            return;
        }

        if self.hub.linger.is_zero() {
            self.hub.stop_if_idle(epoch);
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let hub = Arc::clone(&self.hub);
                handle.spawn(async move {
                    tokio::time::sleep(hub.linger).await;
                    hub.stop_if_idle(epoch);
                });
            }
            Err(_) => self.hub.stop_if_idle(epoch),
        }
    }
}
