// src/blockchain/pool.rs
//! Bounded pool of gateway sessions.
//!
//! Opening an authenticated gateway is expensive, so sessions are created
//! lazily by a [`GatewayFactory`] and recycled across calls.
//!
//! # Policy
//! - At most `max_total` sessions exist at once (idle, borrowed, or being
//!   created).
//! - A returned session is kept idle unless `max_idle` sessions are already
//!   idle, in which case it is closed.
//! - [`GatewayPool::ensure_min_idle`] tops the idle set up to `min_idle`.
//! - When the pool is exhausted a borrower waits up to `max_wait`, then fails
//!   with a connection error.
//! - After [`GatewayPool::close`] every borrow fails immediately, waiting
//!   borrowers are woken with an error, and sessions still in use are closed
//!   as they come back.

use crate::blockchain::config::PoolConfig;
use crate::blockchain::gateway::GatewayFactory;
use crate::error::{LedgerError, Result};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

struct PoolState<G> {
    idle: VecDeque<G>,
    /// Sessions currently handed out.
    active: usize,
    /// Sessions being created, counted against `max_total`.
    pending: usize,
    closed: bool,
}

impl<G> PoolState<G> {
    fn total(&self) -> usize {
        self.idle.len() + self.active + self.pending
    }
}

/// Snapshot of the pool counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub idle: usize,
    pub active: usize,
    pub pending: usize,
    pub closed: bool,
}

/// Pool of gateway sessions produced by `F`.
pub struct GatewayPool<F: GatewayFactory> {
    factory: F,
    config: PoolConfig,
    /// One permit per session that may be borrowed or created concurrently.
    permits: Arc<Semaphore>,
    state: Mutex<PoolState<F::Gateway>>,
}

impl<F: GatewayFactory> GatewayPool<F> {
    /// Creates an empty pool. No session is opened until first needed.
    pub fn new(factory: F, config: PoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            factory,
            permits: Arc::new(Semaphore::new(config.max_total)),
            config,
            state: Mutex::new(PoolState {
                idle: VecDeque::new(),
                active: 0,
                pending: 0,
                closed: false,
            }),
        })
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn status(&self) -> PoolStatus {
        let state = self.state.lock();
        PoolStatus {
            idle: state.idle.len(),
            active: state.active,
            pending: state.pending,
            closed: state.closed,
        }
    }

    /// Borrows a session, reusing an idle one or creating a new one.
    ///
    /// The session goes back to the pool when the returned guard is dropped.
    ///
    /// # Errors
    /// Returns [`LedgerError::Connection`] if:
    /// - the pool is closed
    /// - no session frees up within `max_wait`
    /// - the factory fails to create a session
    pub async fn borrow(&self) -> Result<PooledGateway<'_, F>> {
        if self.state.lock().closed {
            return Err(closed_error());
        }

        let max_wait = self.config.max_wait();
        let permit = match tokio::time::timeout(max_wait, self.permits.clone().acquire_owned()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(closed_error()),
            Err(_) => {
                warn!("gateway pool exhausted after waiting {max_wait:?}");
                return Err(LedgerError::connection(format!(
                    "gateway pool exhausted: no session available within {max_wait:?}"
                )));
            }
        };

        let slot = {
            let mut state = self.state.lock();
            if state.closed {
                return Err(closed_error());
            }
            if let Some(gateway) = state.idle.pop_back() {
                state.active += 1;
                return Ok(PooledGateway {
                    pool: self,
                    gateway: Some(gateway),
                    _permit: permit,
                });
            }
            state.pending += 1;
            PendingSlot::new(&self.state)
        };

        let gateway = self.factory.create().await.map_err(|e| {
            warn!("failed to create gateway: {e}");
            LedgerError::connection(e)
        })?;

        let mut state = self.state.lock();
        slot.commit(&mut state);
        if state.closed {
            drop(state);
            self.factory.destroy(gateway);
            return Err(closed_error());
        }
        state.active += 1;
        info!("opened gateway session ({} active, {} idle)", state.active, state.idle.len());
        drop(state);

        Ok(PooledGateway {
            pool: self,
            gateway: Some(gateway),
            _permit: permit,
        })
    }

    /// Creates idle sessions until `min_idle` is reached.
    ///
    /// Never waits for a permit and never exceeds `max_total`. Creation
    /// failures are logged and end the top-up.
    pub async fn ensure_min_idle(&self) {
        loop {
            let Ok(permit) = self.permits.clone().try_acquire_owned() else {
                return;
            };

            let slot = {
                let mut state = self.state.lock();
                if state.closed
                    || state.idle.len() + state.pending >= self.config.min_idle
                    || state.total() >= self.config.max_total
                {
                    return;
                }
                state.pending += 1;
                PendingSlot::new(&self.state)
            };

            let gateway = match self.factory.create().await {
                Ok(gateway) => gateway,
                Err(e) => {
                    warn!("could not pre-create idle gateway: {e}");
                    return;
                }
            };

            let mut state = self.state.lock();
            slot.commit(&mut state);
            if state.closed || state.idle.len() >= self.config.max_idle {
                drop(state);
                self.factory.destroy(gateway);
                return;
            }
            state.idle.push_back(gateway);
            debug!("pre-created idle gateway ({} idle)", state.idle.len());
            drop(state);
            drop(permit);
        }
    }

    /// Closes every idle session and refuses further borrows.
    pub fn close(&self) {
        let drained: Vec<F::Gateway> = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.idle.drain(..).collect()
        };
        self.permits.close();

        let count = drained.len();
        for gateway in drained {
            self.factory.destroy(gateway);
        }
        info!("gateway pool closed ({count} idle sessions released)");
    }

    fn release(&self, gateway: F::Gateway) {
        let evicted = {
            let mut state = self.state.lock();
            state.active -= 1;
            if state.closed || state.idle.len() >= self.config.max_idle {
                Some(gateway)
            } else {
                state.idle.push_back(gateway);
                None
            }
        };

        if let Some(gateway) = evicted {
            debug!("closing surplus gateway session");
            self.factory.destroy(gateway);
        }
    }
}

impl<F: GatewayFactory> Drop for GatewayPool<F> {
    fn drop(&mut self) {
        self.close();
    }
}

fn closed_error() -> LedgerError {
    LedgerError::connection("gateway pool is closed")
}

/// Keeps `pending` accurate if a creation future is dropped midway.
struct PendingSlot<'a, G> {
    state: &'a Mutex<PoolState<G>>,
    armed: bool,
}

impl<'a, G> PendingSlot<'a, G> {
    fn new(state: &'a Mutex<PoolState<G>>) -> Self {
        Self { state, armed: true }
    }

    fn commit(mut self, state: &mut PoolState<G>) {
        state.pending -= 1;
        self.armed = false;
    }
}

impl<G> Drop for PendingSlot<'_, G> {
    fn drop(&mut self) {
        if self.armed {
            self.state.lock().pending -= 1;
        }
    }
}

/// A borrowed session. Returned to the pool on drop.
pub struct PooledGateway<'a, F: GatewayFactory> {
    pool: &'a GatewayPool<F>,
    gateway: Option<F::Gateway>,
    // Released after the session is back in the pool.
    _permit: OwnedSemaphorePermit,
}

impl<F: GatewayFactory> Deref for PooledGateway<'_, F> {
    type Target = F::Gateway;

    fn deref(&self) -> &F::Gateway {
        self.gateway
            .as_ref()
            .expect("gateway is only taken when the guard drops")
    }
}

impl<F: GatewayFactory> Drop for PooledGateway<'_, F> {
    fn drop(&mut self) {
        if let Some(gateway) = self.gateway.take() {
            self.pool.release(gateway);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::MockLedger;
    use std::time::Duration;
    use tokio_test::assert_ok;

    fn pool_config(max_total: usize, min_idle: usize, max_idle: usize) -> PoolConfig {
        PoolConfig {
            max_total,
            min_idle,
            max_idle,
            max_wait_ms: 50,
        }
    }

    #[tokio::test]
    async fn test_sessions_are_created_lazily_and_reused() {
        let ledger = MockLedger::new();
        let pool = GatewayPool::new(ledger.factory(), pool_config(4, 0, 2)).unwrap();
        assert_eq!(ledger.created(), 0);

        let first_id = {
            let gateway = assert_ok!(pool.borrow().await);
            assert_eq!(pool.status().active, 1);
            gateway.id()
        };
        assert_eq!(pool.status().idle, 1);
        assert_eq!(pool.status().active, 0);

        let gateway = assert_ok!(pool.borrow().await);
        assert_eq!(gateway.id(), first_id);
        assert_eq!(ledger.created(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_borrowers_get_distinct_sessions() {
        let ledger = MockLedger::new();
        let pool = GatewayPool::new(ledger.factory(), pool_config(3, 0, 3)).unwrap();

        let a = assert_ok!(pool.borrow().await);
        let b = assert_ok!(pool.borrow().await);
        let c = assert_ok!(pool.borrow().await);

        let mut ids = vec![a.id(), b.id(), c.id()];
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 3);
        assert_eq!(pool.status().active, 3);
    }

    #[tokio::test]
    async fn test_surplus_idle_sessions_are_closed() {
        let ledger = MockLedger::new();
        let pool = GatewayPool::new(ledger.factory(), pool_config(4, 0, 1)).unwrap();

        let guards = vec![
            pool.borrow().await.unwrap(),
            pool.borrow().await.unwrap(),
            pool.borrow().await.unwrap(),
        ];
        drop(guards);

        let status = pool.status();
        assert_eq!(status.idle, 1);
        assert_eq!(status.active, 0);
        assert_eq!(ledger.destroyed(), 2);
    }

    #[tokio::test]
    async fn test_exhausted_pool_fails_after_max_wait() {
        let ledger = MockLedger::new();
        let pool = GatewayPool::new(ledger.factory(), pool_config(2, 0, 2)).unwrap();

        let _a = pool.borrow().await.unwrap();
        let _b = pool.borrow().await.unwrap();

        let err = pool.borrow().await.err().expect("pool should be exhausted");
        assert!(matches!(err, LedgerError::Connection { .. }));
        assert!(err.to_string().contains("exhausted"));
        assert_eq!(ledger.created(), 2);
    }

    #[tokio::test]
    async fn test_waiting_borrower_gets_returned_session() {
        let ledger = MockLedger::new();
        let mut config = pool_config(1, 0, 1);
        config.max_wait_ms = 1_000;
        let pool = GatewayPool::new(ledger.factory(), config).unwrap();

        let (first, second) = tokio::join!(
            async {
                let gateway = pool.borrow().await.unwrap();
                let id = gateway.id();
                tokio::time::sleep(Duration::from_millis(30)).await;
                id
            },
            async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                pool.borrow().await.map(|gateway| gateway.id())
            }
        );

        assert_eq!(second.unwrap(), first);
        assert_eq!(ledger.created(), 1);
    }

    #[tokio::test]
    async fn test_close_releases_sessions_and_refuses_borrows() {
        let ledger = MockLedger::new();
        let pool = GatewayPool::new(ledger.factory(), pool_config(3, 0, 3)).unwrap();

        let outstanding = pool.borrow().await.unwrap();
        drop(pool.borrow().await.unwrap());
        assert_eq!(pool.status().idle, 1);

        pool.close();
        assert_eq!(ledger.destroyed(), 1);
        assert!(pool.status().closed);
        assert!(matches!(pool.borrow().await, Err(LedgerError::Connection { .. })));

        drop(outstanding);
        assert_eq!(ledger.destroyed(), 2);
        assert_eq!(pool.status().idle, 0);
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_borrowers() {
        let ledger = MockLedger::new();
        let mut config = pool_config(1, 0, 1);
        config.max_wait_ms = 5_000;
        let pool = GatewayPool::new(ledger.factory(), config).unwrap();
        let held = pool.borrow().await.unwrap();

        let (waiter, _) = tokio::join!(pool.borrow(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            pool.close();
        });

        assert!(matches!(waiter, Err(LedgerError::Connection { .. })));
        drop(held);
    }

    #[tokio::test]
    async fn test_create_failure_is_connection_error() {
        let ledger = MockLedger::new();
        ledger.fail_create(true);
        let pool = GatewayPool::new(ledger.factory(), pool_config(2, 0, 2)).unwrap();

        assert!(matches!(pool.borrow().await, Err(LedgerError::Connection { .. })));
        let status = pool.status();
        assert_eq!(status.active + status.pending + status.idle, 0);

        ledger.fail_create(false);
        assert_ok!(pool.borrow().await);
    }

    #[tokio::test]
    async fn test_ensure_min_idle() {
        let ledger = MockLedger::new();
        let pool = GatewayPool::new(ledger.factory(), pool_config(3, 2, 3)).unwrap();

        pool.ensure_min_idle().await;
        assert_eq!(pool.status().idle, 2);

        // Already satisfied.
        pool.ensure_min_idle().await;
        assert_eq!(ledger.created(), 2);
    }

    #[tokio::test]
    async fn test_ensure_min_idle_respects_max_total() {
        let ledger = MockLedger::new();
        let pool = GatewayPool::new(ledger.factory(), pool_config(2, 2, 2)).unwrap();
        let _a = pool.borrow().await.unwrap();
        let _b = pool.borrow().await.unwrap();

        pool.ensure_min_idle().await;
        let status = pool.status();
        assert_eq!(status.idle, 0);
        assert_eq!(status.active, 2);
        assert_eq!(ledger.created(), 2);
    }

    #[tokio::test]
    async fn test_size_invariants_under_contention() {
        let ledger = MockLedger::new();
        let mut config = pool_config(3, 1, 2);
        config.max_wait_ms = 5_000;
        let pool = GatewayPool::new(ledger.factory(), config).unwrap();

        let tasks = (0..24).map(|i| {
            let pool = &pool;
            async move {
                let gateway = pool.borrow().await.unwrap();
                let status = pool.status();
                assert!(status.idle <= 2);
                assert!(status.idle + status.active + status.pending <= 3);
                tokio::time::sleep(Duration::from_millis(1 + i % 3)).await;
                drop(gateway);
                pool.ensure_min_idle().await;
            }
        });
        futures::future::join_all(tasks).await;

        let status = pool.status();
        assert_eq!(status.active, 0);
        assert!(status.idle <= 2);
        assert!(ledger.created() - ledger.destroyed() <= 3);
    }
}
