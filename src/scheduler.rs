// src/scheduler.rs
use crate::portfolio::PortfolioClient;
use crate::rules::RuleClient;
use crate::transactions::TransactionClient;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, MissedTickBehavior};

/// The three server-maintained lists that are kept in sync.
#[derive(Clone)]
pub struct ListClients {
    pub rules: RuleClient,
    pub portfolio: PortfolioClient,
    pub transactions: TransactionClient,
}

impl ListClients {
    /// Spawns one independent refresh per list and returns without waiting.
    /// Each client reports its own failures.
    pub fn refresh_all(&self) -> [JoinHandle<()>; 3] {
        let rules = self.rules.clone();
        let portfolio = self.portfolio.clone();
        let transactions = self.transactions.clone();
        [
            task::spawn(async move {
                let _ = rules.refresh().await;
            }),
            task::spawn(async move {
                let _ = portfolio.refresh().await;
            }),
            task::spawn(async move {
                let _ = transactions.refresh().await;
            }),
        ]
    }
}

/// `tokio::time::interval` panics on a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Polling,
}

/// Fires an initial refresh as soon as it starts, then one every `period`,
/// without waiting for earlier refreshes to finish. Polling ends when the
/// scheduler is dropped.
pub struct SyncScheduler {
    lists: ListClients,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    pub fn new(lists: ListClients, period: Duration) -> Self {
        let period = if period < MIN_PERIOD {
            warn!("Sync period {:?} is too short, using {:?}", period, MIN_PERIOD);
            MIN_PERIOD
        } else {
            period
        };
        Self {
            lists,
            period,
            task: None,
        }
    }

    pub fn state(&self) -> SyncState {
        match self.task {
            Some(_) => SyncState::Polling,
            None => SyncState::Idle,
        }
    }

    /// Idle -> Polling. Calling it again while polling does nothing.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        info!("Syncing dashboard every {:?}", self.period);
        let lists = self.lists.clone();
        let period = self.period;
        self.task = Some(task::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut tick: u64 = 0;
            loop {
                // first tick completes immediately: that is the initial load
                ticker.tick().await;
                tick += 1;
                debug!("Sync tick {}", tick);
                lists.refresh_all();
            }
        }));
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
