// src/render.rs
//! Pure mappings from server entities to view fragments. Nothing here touches
//! the network or shared state.
use crate::error::DashboardError;
use crate::models::{PortfolioItem, Quote, Rule, Side, Transaction};
use chrono::{Local, TimeZone};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

pub const NO_RULES: &str = "No active rules";
pub const NO_HOLDINGS: &str = "No holdings";
pub const NO_TRANSACTIONS: &str = "No transactions yet";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Gain,
    Loss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub lines: Vec<Line>,
}

impl Fragment {
    pub fn placeholder(text: &str) -> Self {
        let mut fragment = Fragment::default();
        fragment.push(text, Tone::Neutral);
        fragment
    }

    fn push(&mut self, text: impl Into<String>, tone: Tone) {
        self.lines.push(Line {
            text: text.into(),
            tone,
        });
    }

    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line.text)?;
        }
        Ok(())
    }
}

/// Zero counts as a gain.
pub fn change_tone(change: f64) -> Tone {
    if change >= 0.0 {
        Tone::Gain
    } else {
        Tone::Loss
    }
}

pub fn side_tone(side: Side) -> Tone {
    match side {
        Side::Buy => Tone::Gain,
        Side::Sell => Tone::Loss,
    }
}

/// Two fraction digits, always. `-0.0` prints as `0.00`.
pub fn currency(value: f64) -> String {
    format!("{:.2}", value + 0.0)
}

pub fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", currency(value))
    } else {
        currency(value)
    }
}

/// Decodes a list payload, reporting anything that is not an array of
/// well-formed entries as a render fault.
pub fn decode_list<T: DeserializeOwned>(payload: &Value) -> Result<Vec<T>, DashboardError> {
    if !payload.is_array() {
        return Err(DashboardError::Render(format!(
            "expected a list, got {}",
            kind_of(payload)
        )));
    }
    serde_json::from_value(payload.clone()).map_err(|e| DashboardError::Render(e.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

pub fn render_quote(quote: &Quote) -> Fragment {
    let tone = change_tone(quote.change);
    let mut fragment = Fragment::default();
    fragment.push(format!("{}  ${}", quote.symbol, currency(quote.price)), tone);
    fragment.push(
        format!(
            "Open: ${}  High: ${}  Low: ${}  Prev: ${}",
            currency(quote.open),
            currency(quote.high),
            currency(quote.low),
            currency(quote.previous_close)
        ),
        Tone::Neutral,
    );
    fragment.push(
        format!("{} ({}%)", signed(quote.change), signed(quote.change_percent)),
        tone,
    );
    fragment
}

pub fn render_rules(rules: &[Rule]) -> Fragment {
    if rules.is_empty() {
        return Fragment::placeholder(NO_RULES);
    }
    let mut fragment = Fragment::default();
    for rule in rules {
        fragment.push(
            format!("{}  {}", rule.symbol, rule.rule_type.as_str().to_uppercase()),
            side_tone(rule.rule_type),
        );
        fragment.push(
            format!("  Target: ${} | Qty: {}", rule.target_price, rule.quantity),
            Tone::Neutral,
        );
    }
    fragment
}

pub fn render_portfolio(items: &[PortfolioItem]) -> Fragment {
    if items.is_empty() {
        return Fragment::placeholder(NO_HOLDINGS);
    }
    let mut fragment = Fragment::default();
    for item in items {
        fragment.push(format!("{}  Qty: {}", item.symbol, item.quantity), Tone::Neutral);
        fragment.push(
            format!(
                "  Avg Price: ${} | Value: ${}",
                currency(item.avg_buy_price),
                currency(item.value())
            ),
            Tone::Neutral,
        );
    }
    fragment
}

pub fn render_transactions(transactions: &[Transaction]) -> Fragment {
    render_transactions_in(transactions, &Local)
}

/// Table layout; execution instants are shown as time of day in `tz`.
pub fn render_transactions_in<Tz>(transactions: &[Transaction], tz: &Tz) -> Fragment
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if transactions.is_empty() {
        return Fragment::placeholder(NO_TRANSACTIONS);
    }
    let mut fragment = Fragment::default();
    fragment.push(
        format!(
            "{:<8} {:^6} {:>6} {:>12} {:>12} {:>9}",
            "Symbol", "Action", "Qty", "Price", "Total", "Time"
        ),
        Tone::Neutral,
    );
    for tx in transactions {
        let time = tx.executed_at.with_timezone(tz).format("%H:%M:%S").to_string();
        fragment.push(
            format!(
                "{:<8} {:^6} {:>6} {:>12} {:>12} {:>9}",
                tx.symbol,
                tx.action.as_str().to_uppercase(),
                tx.quantity,
                format!("${}", currency(tx.price)),
                format!("${}", currency(tx.total_value)),
                time
            ),
            side_tone(tx.action),
        );
    }
    fragment
}
