// src/api.rs
use crate::config::Config;
use crate::error::DashboardError;
use crate::models::RuleRequest;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Response, Url};
use serde_json::Value;

/// The four endpoints of the trading server. Payloads come back as raw JSON so
/// that shape checking stays with the caller.
#[async_trait]
pub trait DashboardBackend: Send + Sync + 'static {
    async fn quote(&self, symbol: &str) -> Result<Value, DashboardError>;
    async fn rules(&self) -> Result<Value, DashboardError>;
    async fn create_rule(&self, rule: &RuleRequest) -> Result<Value, DashboardError>;
    async fn portfolio(&self) -> Result<Value, DashboardError>;
    async fn transactions(&self) -> Result<Value, DashboardError>;
}

pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, DashboardError> {
        let mut builder = Client::builder().user_agent("stock_dashboard/0.1");
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            DashboardError::validation(format!("Invalid server URL {}: {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DashboardError::validation(format!(
                "Invalid server URL {}",
                config.base_url
            )));
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was ruled out in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, segments: &[&str]) -> Result<Value, DashboardError> {
        let url = self.endpoint(segments);
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            error!("GET {} failed: {}", url, e);
            DashboardError::from(e)
        })?;
        read_json(response).await
    }
}

/// Error statuses still carry a JSON body (404 for unknown symbols, 400 for
/// rejected rules), so only an unreadable body counts as a transport failure.
async fn read_json(response: Response) -> Result<Value, DashboardError> {
    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        error!("{} answered HTTP {} with a non-JSON body: {}", url, status, e);
        DashboardError::Transport(format!("HTTP {} with unreadable body", status))
    })
}

#[async_trait]
impl DashboardBackend for HttpBackend {
    async fn quote(&self, symbol: &str) -> Result<Value, DashboardError> {
        self.get(&["api", "quote", symbol]).await
    }

    async fn rules(&self) -> Result<Value, DashboardError> {
        self.get(&["api", "rules"]).await
    }

    async fn create_rule(&self, rule: &RuleRequest) -> Result<Value, DashboardError> {
        let url = self.endpoint(&["api", "rules"]);
        debug!("POST {} for {}", url, rule.symbol);
        let response = self
            .client
            .post(url.clone())
            .json(rule)
            .send()
            .await
            .map_err(|e| {
                error!("POST {} failed: {}", url, e);
                DashboardError::from(e)
            })?;
        read_json(response).await
    }

    async fn portfolio(&self) -> Result<Value, DashboardError> {
        self.get(&["api", "portfolio"]).await
    }

    async fn transactions(&self) -> Result<Value, DashboardError> {
        self.get(&["api", "transactions"]).await
    }
}
