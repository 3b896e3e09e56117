use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use fractic_server_error::ServerError;
use tokio::{
    sync::{Mutex, MutexGuard},
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::{
    domain::{
        logic::grid_engine::{GridEngine, ReloadOutcome},
        repositories::rows_repository::RowsRepository,
    },
    entities::AutoRefreshConfig,
};

/// One grid engine bound to its row source.
///
/// Every reload, whether manual, after an insert or delete, or fired by the
/// auto-refresh timer, goes through [`GridSession::refresh`], so filters and
/// selection are always carried over. Reloads are serialized: a caller
/// arriving while one is in flight waits for it, then runs its own.
pub struct GridSession<R: RowsRepository> {
    engine: Mutex<GridEngine>,
    repository: R,
    reload_lock: Mutex<()>,
    auto_refresh: AutoRefreshConfig,
}

/// Running auto-refresh timer. Stops when cancelled or dropped.
#[derive(Debug)]
pub struct AutoRefreshHandle {
    task: JoinHandle<()>,
}

impl<R: RowsRepository> GridSession<R> {
    pub fn new(engine: GridEngine, repository: R, auto_refresh: AutoRefreshConfig) -> Self {
        Self {
            engine: Mutex::new(engine),
            repository,
            reload_lock: Mutex::new(()),
            auto_refresh,
        }
    }

    /// Exclusive access to the engine, for filter, sort and selection calls.
    pub async fn engine(&self) -> MutexGuard<'_, GridEngine> {
        self.engine.lock().await
    }

    /// Loads rows from the repository and reloads the engine with them. On
    /// failure the engine keeps its previous state.
    pub async fn refresh(&self) -> Result<ReloadOutcome, ServerError> {
        let _reload = self.reload_lock.lock().await;
        let rows = self.repository.load_rows().await?;
        self.engine.lock().await.reload(rows)
    }
}

impl<R: RowsRepository + 'static> GridSession<R> {
    /// Starts the periodic refresh if enabled in the config; returns `None`
    /// otherwise. The timer only holds a weak reference, so it ends by itself
    /// once the session is dropped.
    pub fn start_auto_refresh(self: &Arc<Self>) -> Option<AutoRefreshHandle> {
        if !self.auto_refresh.enabled || self.auto_refresh.interval.is_zero() {
            return None;
        }
        let interval = self.auto_refresh.interval;
        log::info!("auto-refresh every {:?}", interval);
        Some(AutoRefreshHandle {
            task: tokio::spawn(run_auto_refresh(Arc::downgrade(self), interval)),
        })
    }
}

async fn run_auto_refresh<R: RowsRepository + 'static>(
    session: Weak<GridSession<R>>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let Some(live) = session.upgrade() else {
            log::debug!("grid session dropped, auto-refresh ends");
            return;
        };
        if let Err(e) = live.refresh().await {
            log::warn!("auto-refresh failed, keeping previous rows: {:?}", e);
        }
    }
}

impl AutoRefreshHandle {
    pub fn cancel(self) {
        drop(self)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for AutoRefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
        log::info!("auto-refresh stopped");
    }
}
