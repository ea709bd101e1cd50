// src/transactions.rs
use crate::api::DashboardBackend;
use crate::error::DashboardError;
use crate::models::Transaction;
use crate::render::render_transactions;
use crate::screen::{apply_list, Region, Screen};
use std::sync::Arc;

#[derive(Clone)]
pub struct TransactionClient {
    backend: Arc<dyn DashboardBackend>,
    screen: Arc<Screen>,
}

impl TransactionClient {
    pub fn new(backend: Arc<dyn DashboardBackend>, screen: Arc<Screen>) -> Self {
        Self { backend, screen }
    }

    /// Executed trades in the order the server returns them.
    pub async fn refresh(&self) -> Result<Vec<Transaction>, DashboardError> {
        let fetched = self.backend.transactions().await;
        apply_list(
            &self.screen,
            Region::Transactions,
            fetched,
            render_transactions,
        )
    }
}
