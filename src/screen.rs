// src/screen.rs
//! The surface the dashboard draws on: form inputs, the four output regions and
//! the notification channel. Every update bumps a `watch` channel so a front
//! end can redraw.
use crate::error::DashboardError;
use crate::render::Fragment;
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Rules,
    Portfolio,
    Transactions,
}

impl Region {
    pub fn label(&self) -> &'static str {
        match self {
            Region::Rules => "rules",
            Region::Portfolio => "portfolio",
            Region::Transactions => "transactions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

/// Text the user has typed. Values are kept raw; clients validate on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub symbol: String,
    pub rule_type: String,
    pub target_price: String,
    pub quantity: String,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            rule_type: "buy".to_string(),
            target_price: String::new(),
            quantity: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub inputs: Inputs,
    /// `None` while hidden, i.e. until the first successful lookup.
    pub quote: Option<Fragment>,
    pub rules: Option<Fragment>,
    pub portfolio: Option<Fragment>,
    pub transactions: Option<Fragment>,
    pub notices: Vec<Notice>,
}

impl Snapshot {
    pub fn region(&self, region: Region) -> Option<&Fragment> {
        match region {
            Region::Rules => self.rules.as_ref(),
            Region::Portfolio => self.portfolio.as_ref(),
            Region::Transactions => self.transactions.as_ref(),
        }
    }
}

pub struct Screen {
    state: watch::Sender<Snapshot>,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.borrow().clone()
    }

    pub fn inputs(&self) -> Inputs {
        self.state.borrow().inputs.clone()
    }

    pub fn edit_inputs(&self, edit: impl FnOnce(&mut Inputs)) {
        self.state.send_modify(|s| edit(&mut s.inputs));
    }

    pub(crate) fn clear_rule_amounts(&self) {
        self.edit_inputs(|inputs| {
            inputs.target_price.clear();
            inputs.quantity.clear();
        });
    }

    pub(crate) fn show_quote(&self, fragment: Fragment) {
        self.state.send_modify(|s| s.quote = Some(fragment));
    }

    /// Full replace; whichever response lands last wins.
    pub(crate) fn replace(&self, region: Region, fragment: Fragment) {
        self.state.send_modify(|s| {
            let slot = match region {
                Region::Rules => &mut s.rules,
                Region::Portfolio => &mut s.portfolio,
                Region::Transactions => &mut s.transactions,
            };
            *slot = Some(fragment);
        });
    }

    pub fn notify(&self, notice: Notice) {
        self.state.send_modify(|s| s.notices.push(notice));
    }

    /// Drains pending notices without waking subscribers.
    pub fn take_notices(&self) -> Vec<Notice> {
        let mut taken = Vec::new();
        self.state.send_if_modified(|s| {
            taken = std::mem::take(&mut s.notices);
            false
        });
        taken
    }
}

/// Shared tail of every list refresh: decode, render, replace the region.
/// Transport failures leave the region alone and raise a notice; malformed
/// payloads render the empty placeholder.
pub(crate) fn apply_list<T: DeserializeOwned>(
    screen: &Screen,
    region: Region,
    fetched: Result<Value, DashboardError>,
    render: fn(&[T]) -> Fragment,
) -> Result<Vec<T>, DashboardError> {
    let payload = match fetched {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to load {}: {}", region.label(), e);
            screen.notify(Notice::Error(e.to_string()));
            return Err(e);
        }
    };
    match crate::render::decode_list::<T>(&payload) {
        Ok(items) => {
            screen.replace(region, render(&items));
            Ok(items)
        }
        Err(e) => {
            warn!("Discarding malformed {} payload: {}", region.label(), e);
            screen.replace(region, render(&[]));
            Err(e)
        }
    }
}
