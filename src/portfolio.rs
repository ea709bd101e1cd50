// src/portfolio.rs
use crate::api::DashboardBackend;
use crate::error::DashboardError;
use crate::models::PortfolioItem;
use crate::render::render_portfolio;
use crate::screen::{apply_list, Region, Screen};
use std::sync::Arc;

#[derive(Clone)]
pub struct PortfolioClient {
    backend: Arc<dyn DashboardBackend>,
    screen: Arc<Screen>,
}

impl PortfolioClient {
    pub fn new(backend: Arc<dyn DashboardBackend>, screen: Arc<Screen>) -> Self {
        Self { backend, screen }
    }

    pub async fn refresh(&self) -> Result<Vec<PortfolioItem>, DashboardError> {
        let fetched = self.backend.portfolio().await;
        apply_list(&self.screen, Region::Portfolio, fetched, render_portfolio)
    }
}
