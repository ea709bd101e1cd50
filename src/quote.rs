// src/quote.rs
use crate::api::DashboardBackend;
use crate::context::SelectionContext;
use crate::error::DashboardError;
use crate::models::Quote;
use crate::render::render_quote;
use crate::screen::{Notice, Screen};
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Trims and upper-cases user input; empty input never reaches the server.
pub fn normalize_symbol(raw: &str) -> Result<String, DashboardError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(DashboardError::validation("Enter a stock symbol"));
    }
    Ok(symbol)
}

/// A payload carrying `error` is a server failure; anything else must be a
/// complete quote.
pub fn decode_quote(payload: &Value) -> Result<Quote, DashboardError> {
    if let Some(err) = payload.get("error").filter(|e| is_truthy(e)) {
        let message = match err.as_str() {
            Some(message) => message.to_string(),
            None => err.to_string(),
        };
        return Err(DashboardError::Server(message));
    }
    serde_json::from_value(payload.clone())
        .map_err(|e| DashboardError::Render(format!("quote: {}", e)))
}

/// `null`, `false`, `0` and `""` do not flag an error.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Clone)]
pub struct QuoteClient {
    backend: Arc<dyn DashboardBackend>,
    selection: SelectionContext,
    screen: Arc<Screen>,
}

impl QuoteClient {
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

    /// One request per call, no retry. Only a validated quote is rendered and
    /// selected; failures raise a notice and leave the last good quote on screen.
    /// Overlapping lookups are not ordered: the one that resolves last wins.
    pub async fn fetch_quote(&self, raw_input: &str) -> Result<Quote, DashboardError> {
        match self.resolve(raw_input).await {
            Ok((symbol, quote)) => {
                let fragment = render_quote(&quote);
                self.selection
                    .select_and(&symbol, || self.screen.show_quote(fragment));
                info!("Selected {} at {:.2}", symbol, quote.price);
                Ok(quote)
            }
            Err(e) => {
                match &e {
                    DashboardError::Validation(_) => debug!("Quote lookup rejected: {}", e),
                    _ => warn!("Quote lookup for {:?} failed: {}", raw_input.trim(), e),
                }
                self.screen.notify(Notice::Error(e.to_string()));
                Err(e)
            }
        }
    }

    async fn resolve(&self, raw_input: &str) -> Result<(String, Quote), DashboardError> {
        let symbol = normalize_symbol(raw_input)?;
        debug!("Requesting quote for {}", symbol);
        let payload = self.backend.quote(&symbol).await?;
        let quote = decode_quote(&payload)?;
        Ok((symbol, quote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{quote_json, Reply, ScriptedBackend};
    use serde_json::json;

    fn client(backend: &Arc<ScriptedBackend>) -> (QuoteClient, SelectionContext, Arc<Screen>) {
        let selection = SelectionContext::new();
        let screen = Arc::new(Screen::new());
        let client = QuoteClient::new(backend.clone(), selection.clone(), screen.clone());
        (client, selection, screen)
    }

    #[test]
    fn normalization_trims_and_uppercases() {
        assert_eq!(normalize_symbol("aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("\t msft\n").unwrap(), "MSFT");
        assert_eq!(
            normalize_symbol("   "),
            Err(DashboardError::validation("Enter a stock symbol"))
        );
    }

    #[test]
    fn error_payloads_are_server_failures() {
        let e = decode_quote(&json!({"error": "Symbol not found or invalid"})).unwrap_err();
        assert_eq!(e, DashboardError::Server("Symbol not found or invalid".into()));
    }

    #[test]
    fn falsy_error_fields_are_ignored() {
        for flag in [json!(""), json!(false), json!(null), json!(0)] {
            let mut payload = quote_json("AAPL", 189.5, 1.25);
            payload["error"] = flag;
            assert_eq!(decode_quote(&payload).unwrap().symbol, "AAPL");
        }
        let e = decode_quote(&json!({"error": true})).unwrap_err();
        assert_eq!(e, DashboardError::Server("true".into()));
    }

    #[test]
    fn incomplete_quotes_are_render_faults() {
        let e = decode_quote(&json!({"symbol": "AAPL", "price": 1.0})).unwrap_err();
        assert!(matches!(e, DashboardError::Render(_)));
    }

    #[tokio::test]
    async fn lookup_normalizes_before_requesting() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.push_quote("AAPL", Reply::ok(quote_json("AAPL", 189.5, 1.25)));
        let (client, selection, screen) = client(&backend);

        let quote = client.fetch_quote("aapl ").await.unwrap();

        assert_eq!(backend.calls(), vec!["quote/AAPL"]);
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(selection.current_symbol(), "AAPL");
        let shown = screen.snapshot().quote.unwrap();
        assert_eq!(shown.lines[0].text, "AAPL  $189.50");
    }

    #[tokio::test]
    async fn blank_input_issues_no_request() {
        let backend = Arc::new(ScriptedBackend::default());
        let (client, selection, screen) = client(&backend);

        let e = client.fetch_quote("   ").await.unwrap_err();

        assert!(matches!(e, DashboardError::Validation(_)));
        assert!(backend.calls().is_empty());
        assert!(selection.is_empty());
        assert_eq!(
            screen.take_notices(),
            vec![Notice::Error("Enter a stock symbol".into())]
        );
    }

    #[tokio::test]
    async fn failed_lookup_keeps_previous_quote_and_selection() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.push_quote("AAPL", Reply::ok(quote_json("AAPL", 189.5, 1.25)));
        let (client, selection, screen) = client(&backend);
        client.fetch_quote("AAPL").await.unwrap();
        let shown = screen.snapshot().quote;
        screen.take_notices();

        let e = client.fetch_quote("zzzz").await.unwrap_err();

        assert_eq!(e, DashboardError::Server("Symbol not found or invalid".into()));
        assert_eq!(selection.current_symbol(), "AAPL");
        assert_eq!(screen.snapshot().quote, shown);
        assert_eq!(
            screen.take_notices(),
            vec![Notice::Error("Symbol not found or invalid".into())]
        );
    }

    #[tokio::test]
    async fn transport_failure_is_surfaced() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.push_quote(
            "AAPL",
            Reply::err(DashboardError::Transport("connection refused".into())),
        );
        let (client, selection, screen) = client(&backend);

        assert!(client.fetch_quote("aapl").await.is_err());
        assert!(selection.is_empty());
        assert!(screen.snapshot().quote.is_none());
        assert_eq!(
            screen.take_notices(),
            vec![Notice::Error("Server unreachable: connection refused".into())]
        );
    }

    #[tokio::test]
    async fn selection_is_not_set_while_in_flight() {
        let backend = Arc::new(ScriptedBackend::default());
        let (release, reply) = Reply::held(quote_json("AAPL", 189.5, 1.25));
        backend.push_quote("AAPL", reply);
        let (client, selection, _screen) = client(&backend);

        let pending = tokio::spawn({
            let client = client.clone();
            async move { client.fetch_quote("aapl").await }
        });
        backend.wait_for("quote/AAPL", 1).await;
        assert!(selection.is_empty());

        release.send(()).unwrap();
        pending.await.unwrap().unwrap();
        assert_eq!(selection.current_symbol(), "AAPL");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookups_keep_display_and_selection_together() {
        for _ in 0..5000 {
            let backend = Arc::new(ScriptedBackend::default());
            backend.push_quote("TSLA", Reply::ok(quote_json("TSLA", 250.0, -3.0)));
            backend.push_quote("NVDA", Reply::ok(quote_json("NVDA", 120.0, 2.0)));
            let (client, selection, screen) = client(&backend);

            let tsla = tokio::spawn({
                let client = client.clone();
                async move { client.fetch_quote("TSLA").await }
            });
            let nvda = tokio::spawn({
                let client = client.clone();
                async move { client.fetch_quote("NVDA").await }
            });
            tsla.await.unwrap().unwrap();
            nvda.await.unwrap().unwrap();

            let shown = screen.snapshot().quote.unwrap();
            assert!(
                shown.lines[0].text.starts_with(&selection.current_symbol()),
                "showing {:?} while {} is selected",
                shown.lines[0].text,
                selection.current_symbol()
            );
        }
    }

    #[tokio::test]
    async fn last_resolved_lookup_wins() {
        let backend = Arc::new(ScriptedBackend::default());
        let (release_tsla, tsla) = Reply::held(quote_json("TSLA", 250.0, -3.0));
        backend.push_quote("TSLA", tsla);
        backend.push_quote("NVDA", Reply::ok(quote_json("NVDA", 120.0, 2.0)));
        let (client, selection, screen) = client(&backend);

        let slow = tokio::spawn({
            let client = client.clone();
            async move { client.fetch_quote("TSLA").await }
        });
        backend.wait_for("quote/TSLA", 1).await;
        client.fetch_quote("NVDA").await.unwrap();
        assert_eq!(selection.current_symbol(), "NVDA");

        release_tsla.send(()).unwrap();
        slow.await.unwrap().unwrap();

        assert_eq!(selection.current_symbol(), "TSLA");
        let shown = screen.snapshot().quote.unwrap();
        assert!(shown.lines[0].text.starts_with("TSLA"));
    }
}
