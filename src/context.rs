// src/context.rs
use std::sync::{Arc, RwLock};

/// The symbol currently under consideration. Only a validated quote lookup
/// writes it; rule creation reads it. Clones share the same cell.
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    current: Arc<RwLock<String>>,
}

impl SelectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty until the first successful lookup.
    pub fn current_symbol(&self) -> String {
        match self.current.read() {
            Ok(symbol) => symbol.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current_symbol().is_empty()
    }

    #[cfg(test)]
    pub(crate) fn select(&self, symbol: &str) {
        self.select_and(symbol, || {});
    }

    /// Writes the selection and runs `publish` under the same write lock, so
    /// concurrent selections publish in the order they were written.
    pub(crate) fn select_and(&self, symbol: &str, publish: impl FnOnce()) {
        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *current = symbol.to_string();
        publish();
    }
}
