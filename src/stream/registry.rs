//! Subscription registry
//!
//! Maps normalized symbols to the callbacks interested in them. A symbol
//! key is created on first subscription and never removed; unsubscribing
//! only empties its list.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use super::types::{normalize_symbol, PriceCallback, PriceUpdate};

/// Effect of a registry mutation on upstream interest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Subscriber count went from zero to one
    Activated,
    /// Subscriber count went from one to zero
    Deactivated,
    /// Upstream interest did not change
    Unchanged,
}

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: HashMap<String, Vec<PriceCallback>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Duplicates are kept and delivered to twice.
    pub fn add(&mut self, symbol: &str, callback: PriceCallback) -> Transition {
        let callbacks = self.entries.entry(normalize_symbol(symbol)).or_default();
        callbacks.push(callback);
        if callbacks.len() == 1 {
            Transition::Activated
        } else {
            Transition::Unchanged
        }
    }

    /// Remove the first registered instance of `callback`.
    pub fn remove(&mut self, symbol: &str, callback: &PriceCallback) -> Transition {
        let Some(callbacks) = self.entries.get_mut(&normalize_symbol(symbol)) else {
            return Transition::Unchanged;
        };
        let Some(index) = callbacks.iter().position(|c| c.same_as(callback)) else {
            return Transition::Unchanged;
        };
        callbacks.remove(index);
        if callbacks.is_empty() {
            Transition::Deactivated
        } else {
            Transition::Unchanged
        }
    }

    /// Symbols with at least one live subscriber, sorted.
    pub fn active_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, callbacks)| !callbacks.is_empty())
            .map(|(symbol, _)| symbol.clone())
            .collect();
        symbols.sort();
        symbols
    }

    pub fn subscriber_count(&self, symbol: &str) -> usize {
        self.entries
            .get(&normalize_symbol(symbol))
            .map_or(0, Vec::len)
    }

    /// True if the symbol has ever been subscribed to.
    pub fn is_known(&self, symbol: &str) -> bool {
        self.entries.contains_key(&normalize_symbol(symbol))
    }

    /// Deliver an update to every callback for its symbol, in registration
    /// order. A panicking callback is logged and skipped.
    ///
    /// Returns the number of callbacks that completed.
    pub fn dispatch(&self, update: &PriceUpdate) -> usize {
        let Some(callbacks) = self.entries.get(&update.symbol) else {
            return 0;
        };

        let mut delivered = 0;
        for callback in callbacks {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                callback.call(update.price, &update.symbol)
            }));
            match result {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::error!(
                        symbol = %update.symbol,
                        price = update.price,
                        "Price callback panicked, continuing delivery"
                    );
                }
            }
        }

        tracing::trace!(
            symbol = %update.symbol,
            price = update.price,
            delivered,
            "Price update dispatched"
        );
        delivered
    }
}
