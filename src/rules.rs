// src/rules.rs
use crate::api::DashboardBackend;
use crate::context::SelectionContext;
use crate::error::DashboardError;
use crate::models::{CreateRuleResponse, Rule, RuleRequest, Side};
use crate::render::render_rules;
use crate::screen::{apply_list, Inputs, Notice, Region, Screen};
use log::{debug, info, warn};
use std::sync::Arc;

pub const RULE_CREATED: &str = "Rule created successfully!";

/// Validates the form against the current selection. Checks run in order:
/// selection, emptiness, rule type, then the numeric parse step.
pub fn build_request(selected: &str, inputs: &Inputs) -> Result<RuleRequest, DashboardError> {
    if selected.is_empty() {
        return Err(DashboardError::validation("Search a stock first"));
    }
    if inputs.target_price.is_empty() || inputs.quantity.is_empty() {
        return Err(DashboardError::validation("Fill all fields"));
    }
    let rule_type = Side::parse(&inputs.rule_type)
        .ok_or_else(|| DashboardError::validation("Rule type must be buy or sell"))?;

    let target_price = inputs.target_price.trim();
    match target_price.parse::<f64>() {
        Ok(price) if price.is_finite() => {}
        _ => return Err(DashboardError::validation("Target price must be a number")),
    }
    let quantity = inputs.quantity.trim();
    if quantity.parse::<u64>().is_err() {
        return Err(DashboardError::validation("Quantity must be a whole number"));
    }

    Ok(RuleRequest {
        symbol: selected.to_string(),
        rule_type,
        target_price: target_price.to_string(),
        quantity: quantity.to_string(),
    })
}

#[derive(Clone)]
pub struct RuleClient {
    backend: Arc<dyn DashboardBackend>,
    selection: SelectionContext,
    screen: Arc<Screen>,
}

impl RuleClient {
    pub fn new(
        backend: Arc<dyn DashboardBackend>,
        selection: SelectionContext,
        screen: Arc<Screen>,
    ) -> Self {
        Self {
            backend,
            selection,
            screen,
        }
    }

    /// Submits the rule form for the selected symbol. The selection is read at
    /// submission time, so a lookup still in flight does not affect it.
    pub async fn create_rule(&self) -> Result<(), DashboardError> {
        let request = match build_request(&self.selection.current_symbol(), &self.screen.inputs())
        {
            Ok(request) => request,
            Err(e) => {
                debug!("Rule form rejected: {}", e);
                self.screen.notify(Notice::Error(e.to_string()));
                return Err(e);
            }
        };

        match self.submit(&request).await {
            Ok(response) => {
                info!(
                    "Created {} rule for {} (id {:?})",
                    request.rule_type.as_str(),
                    request.symbol,
                    response.rule_id
                );
                self.screen.notify(Notice::Info(RULE_CREATED.to_string()));
                self.screen.clear_rule_amounts();
                let _ = self.refresh().await;
                Ok(())
            }
            Err(e) => {
                warn!("Rule creation for {} failed: {}", request.symbol, e);
                let message = match &e {
                    DashboardError::Server(message) => format!("Error: {}", message),
                    other => other.to_string(),
                };
                self.screen.notify(Notice::Error(message));
                Err(e)
            }
        }
    }

    async fn submit(&self, request: &RuleRequest) -> Result<CreateRuleResponse, DashboardError> {
        let payload = self.backend.create_rule(request).await?;
        let response: CreateRuleResponse = serde_json::from_value(payload)
            .map_err(|e| DashboardError::Render(format!("rule creation: {}", e)))?;
        if response.success {
            Ok(response)
        } else {
            Err(DashboardError::Server(
                response
                    .error
                    .unwrap_or_else(|| "Rule was not created".to_string()),
            ))
        }
    }

    /// Fetches active rules and fully replaces the rules region.
    pub async fn refresh(&self) -> Result<Vec<Rule>, DashboardError> {
        let fetched = self.backend.rules().await;
        apply_list(&self.screen, Region::Rules, fetched, render_rules)
    }
}
