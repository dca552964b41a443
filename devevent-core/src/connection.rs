//! Single-flight connection cache
//!
//! Holds at most one live connection handle and at most one in-flight
//! establishment attempt for the lifetime of the owning service.
//!
//! - A ready handle is returned without any I/O.
//! - Callers that find no handle but an attempt in flight await that same
//!   attempt; only the first caller starts one.
//! - A failed attempt is delivered to every waiter and then cleared, so the
//!   next call starts a fresh attempt. Failures are never cached.
//!
//! The slot is guarded by a synchronous mutex that is only held for the
//! check-and-record step, never across an `.await`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

/// Something that can establish a connection handle.
///
/// The handle must be cheap to clone (a pool, an `Arc`, a client).
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Connection: Clone + Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Establish a new connection. Called at most once per attempt.
    async fn connect(&self) -> Result<Self::Connection, Self::Error>;
}

/// Outcome shared by every caller awaiting the same attempt.
pub type ConnectResult<C> = Result<<C as Connector>::Connection, Arc<<C as Connector>::Error>>;

type Attempt<C> = Shared<BoxFuture<'static, ConnectResult<C>>>;

enum Slot<C: Connector> {
    Empty,
    Connecting { generation: u64, attempt: Attempt<C> },
    Ready(C::Connection),
}

/// Observable state of the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No handle and no attempt in flight
    Idle,
    /// An establishment attempt is in flight
    Connecting,
    /// A handle is cached
    Connected,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

/// Lazily-initialized, shared connection handle.
pub struct ConnectionCache<C: Connector> {
    connector: Arc<C>,
    slot: Arc<Mutex<Slot<C>>>,
    attempts: AtomicU64,
}

impl<C: Connector> ConnectionCache<C> {
    /// Create an empty cache. No connection is attempted until [`get`](Self::get).
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            slot: Arc::new(Mutex::new(Slot::Empty)),
            attempts: AtomicU64::new(0),
        }
    }

    /// Get the shared connection, establishing it if needed.
    ///
    /// At most one establishment attempt is in flight at any time. Every
    /// caller awaiting an attempt receives the same handle or the same error.
    pub async fn get(&self) -> ConnectResult<C> {
        let attempt = {
            let mut slot = lock(&self.slot);

            let existing = match &*slot {
                Slot::Ready(conn) => return Ok(conn.clone()),
                Slot::Connecting { attempt, .. } => Some(attempt.clone()),
                Slot::Empty => None,
            };

            match existing {
                Some(attempt) => attempt,
                None => {
                    let generation = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    let attempt = self.start(generation);
                    *slot = Slot::Connecting {
                        generation,
                        attempt: attempt.clone(),
                    };
                    attempt
                }
            }
        };

        attempt.await
    }

    /// Return the cached handle without connecting.
    pub fn peek(&self) -> Option<C::Connection> {
        match &*lock(&self.slot) {
            Slot::Ready(conn) => Some(conn.clone()),
            _ => None,
        }
    }

    pub fn state(&self) -> CacheState {
        match &*lock(&self.slot) {
            Slot::Empty => CacheState::Idle,
            Slot::Connecting { .. } => CacheState::Connecting,
            Slot::Ready(_) => CacheState::Connected,
        }
    }

    pub fn is_connecting(&self) -> bool {
        self.state() == CacheState::Connecting
    }

    /// Number of establishment attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Build the shared attempt. The attempt settles the slot itself, so the
    /// transition happens exactly once no matter how many callers await it.
    fn start(&self, generation: u64) -> Attempt<C> {
        let connector = Arc::clone(&self.connector);
        let slot: Weak<Mutex<Slot<C>>> = Arc::downgrade(&self.slot);

        async move {
            debug!(generation, "establishing connection");
            let result = connector.connect().await.map_err(Arc::new);

            if let Some(slot) = slot.upgrade() {
                let mut slot = lock(&slot);
                // A newer attempt owns the slot; leave it alone.
                if matches!(&*slot, Slot::Connecting { generation: g, .. } if *g == generation) {
                    *slot = match &result {
                        Ok(conn) => Slot::Ready(conn.clone()),
                        Err(_) => Slot::Empty,
                    };
                }
            }

            match &result {
                Ok(_) => info!(generation, "connection established"),
                Err(e) => warn!(generation, error = %e, "connection attempt failed"),
            }

            result
        }
        .boxed()
        .shared()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
