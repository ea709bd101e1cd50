// src/lib.rs
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod portfolio;
pub mod quote;
pub mod render;
pub mod rules;
pub mod scheduler;
pub mod screen;
pub mod transactions;

#[cfg(test)]
pub(crate) mod testing;

use crate::api::DashboardBackend;
use crate::context::SelectionContext;
use crate::portfolio::PortfolioClient;
use crate::quote::QuoteClient;
use crate::rules::RuleClient;
use crate::scheduler::{ListClients, SyncScheduler};
use crate::screen::Screen;
use crate::transactions::TransactionClient;
use std::sync::Arc;
use std::time::Duration;

/// One page session: a shared screen and selection plus the clients that
/// read and write them.
#[derive(Clone)]
pub struct Dashboard {
    pub screen: Arc<Screen>,
    pub selection: SelectionContext,
    pub quotes: QuoteClient,
    pub lists: ListClients,
}

impl Dashboard {
    pub fn new(backend: Arc<dyn DashboardBackend>) -> Self {
        let screen = Arc::new(Screen::new());
        let selection = SelectionContext::new();
        let quotes = QuoteClient::new(backend.clone(), selection.clone(), screen.clone());
        let lists = ListClients {
            rules: RuleClient::new(backend.clone(), selection.clone(), screen.clone()),
            portfolio: PortfolioClient::new(backend.clone(), screen.clone()),
            transactions: TransactionClient::new(backend, screen.clone()),
        };
        Self {
            screen,
            selection,
            quotes,
            lists,
        }
    }

    pub fn scheduler(&self, period: Duration) -> SyncScheduler {
        SyncScheduler::new(self.lists.clone(), period)
    }
}
