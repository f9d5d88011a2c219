//! Normalized quote snapshot shared by every provider

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last-price snapshot for one symbol
///
/// Only `current_price` is guaranteed; the other fields are filled when the
/// vendor reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub current_price: f64,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
    pub previous_close: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, current_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            current_price,
            change: None,
            percent_change: None,
            previous_close: None,
            timestamp: None,
        }
    }
}
