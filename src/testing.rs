// src/testing.rs
//! In-memory backend whose replies can be held back until released, so the
//! tests can choose the order in which responses land.
use crate::api::DashboardBackend;
use crate::error::DashboardError;
use crate::models::RuleRequest;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::oneshot;

pub struct Reply {
    result: Result<Value, DashboardError>,
    gate: Option<oneshot::Receiver<()>>,
}

impl Reply {
    pub fn ok(payload: Value) -> Self {
        Self {
            result: Ok(payload),
            gate: None,
        }
    }

    pub fn err(e: DashboardError) -> Self {
        Self {
            result: Err(e),
            gate: None,
        }
    }

    /// Holds the reply until the returned sender fires (or is dropped).
    pub fn held(payload: Value) -> (oneshot::Sender<()>, Self) {
        let (release, gate) = oneshot::channel();
        (
            release,
            Self {
                result: Ok(payload),
                gate: Some(gate),
            },
        )
    }

    async fn deliver(self) -> Result<Value, DashboardError> {
        if let Some(gate) = self.gate {
            let _ = gate.await;
        }
        self.result
    }
}

#[derive(Default)]
pub struct ScriptedBackend {
    quotes: Mutex<HashMap<String, VecDeque<Reply>>>,
    replies: Mutex<HashMap<&'static str, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    posted: Mutex<Vec<RuleRequest>>,
}

impl ScriptedBackend {
    pub fn push_quote(&self, symbol: &str, reply: Reply) {
        self.quotes
            .lock()
            .unwrap()
            .entry(symbol.to_string())
            .or_default()
            .push_back(reply);
    }

    /// `endpoint` is one of `rules`, `create_rule`, `portfolio`, `transactions`.
    pub fn push(&self, endpoint: &'static str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back(reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn posted(&self) -> Vec<RuleRequest> {
        self.posted.lock().unwrap().clone()
    }

    /// Yields to the runtime until `call` has been issued `times` times.
    pub async fn wait_for(&self, call: &str, times: usize) {
        for _ in 0..1000 {
            if self.count(call) >= times {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("{} was not issued {} times: {:?}", call, times, self.calls());
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next(&self, endpoint: &'static str) -> Option<Reply> {
        self.replies
            .lock()
            .unwrap()
            .get_mut(endpoint)
            .and_then(VecDeque::pop_front)
    }
}

#[async_trait]
impl DashboardBackend for ScriptedBackend {
    async fn quote(&self, symbol: &str) -> Result<Value, DashboardError> {
        self.record(format!("quote/{}", symbol));
        let reply = self
            .quotes
            .lock()
            .unwrap()
            .get_mut(symbol)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Reply::ok(json!({"error": "Symbol not found or invalid"})));
        reply.deliver().await
    }

    async fn rules(&self) -> Result<Value, DashboardError> {
        self.record("rules".to_string());
        let reply = self.next("rules").unwrap_or_else(|| Reply::ok(json!([])));
        reply.deliver().await
    }

    async fn create_rule(&self, rule: &RuleRequest) -> Result<Value, DashboardError> {
        self.record("create_rule".to_string());
        self.posted.lock().unwrap().push(rule.clone());
        let reply = self
            .next("create_rule")
            .unwrap_or_else(|| Reply::ok(json!({"success": true, "ruleId": 1})));
        reply.deliver().await
    }

    async fn portfolio(&self) -> Result<Value, DashboardError> {
        self.record("portfolio".to_string());
        let reply = self.next("portfolio").unwrap_or_else(|| Reply::ok(json!([])));
        reply.deliver().await
    }

    async fn transactions(&self) -> Result<Value, DashboardError> {
        self.record("transactions".to_string());
        let reply = self
            .next("transactions")
            .unwrap_or_else(|| Reply::ok(json!([])));
        reply.deliver().await
    }
}

pub fn quote_json(symbol: &str, price: f64, change: f64) -> Value {
    json!({
        "symbol": symbol,
        "price": price,
        "open": price - change,
        "high": price + 1.0,
        "low": price - 1.0,
        "previous_close": price - change,
        "change": change,
        "change_percent": change / (price - change) * 100.0,
    })
}
