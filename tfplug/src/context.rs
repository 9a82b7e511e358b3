//! Request-scoped context
//!
//! Every provider, resource and data source call receives a [`Context`]. It
//! carries the cancellation signal, an optional deadline, arbitrary values and
//! a log id that tags all log lines written on behalf of one Terraform RPC.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tokio::time;

/// Context carries request-scoped values like cancellation signals, timeouts, and metadata.
/// Pass it as the first parameter of every async trait method.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    log_id: String,
    deadline: Option<Instant>,
    values: RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        Self::build(uuid::Uuid::new_v4().to_string(), None)
    }

    /// Derives a context with a deadline. The log id is kept so that all
    /// lines of the same request stay correlated.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        let ctx = Self::build(self.inner.log_id.clone(), Some(deadline));

        let done_tx = ctx.inner.done_tx.clone();
        tokio::spawn(async move {
            time::sleep_until(deadline.into()).await;
            let _ = done_tx.send(true);
        });

        ctx
    }

    fn build(log_id: String, deadline: Option<Instant>) -> Self {
        let (done_tx, done_rx) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                log_id,
                deadline,
                values: RwLock::new(HashMap::new()),
                done: done_rx,
                done_tx,
            }),
        }
    }

    /// Identifier shared by every log line emitted for this request.
    pub fn log_id(&self) -> &str {
        &self.inner.log_id
    }

    pub async fn with_value<T: Send + Sync + 'static>(self, key: &str, value: T) -> Self {
        let mut values = self.inner.values.write().await;
        values.insert(key.to_string(), Box::new(value));
        drop(values);
        self
    }

    pub async fn get_value<T>(&self, key: &str) -> Option<T>
    where
        T: Send + Sync + Clone + 'static,
    {
        let values = self.inner.values.read().await;
        values.get(key).and_then(|v| v.downcast_ref::<T>()).cloned()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Time left before the deadline, `None` when no deadline is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.inner
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns a channel that flips to `true` when work done on behalf of
    /// this context should stop
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
