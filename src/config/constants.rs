//! Application-wide constants and configuration defaults
//!
//! Defaults live here so every layer agrees on them. Overrides come from
//! YAML or the environment through [`crate::config::apply_env_overrides`].

// =============================================================================
// Defaults
// =============================================================================

/// Fixed delay between a lost stream connection and the next attempt
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;

/// Random extra reconnect delay; 0 keeps the interval constant
pub const DEFAULT_RECONNECT_JITTER_MS: u64 = 0;

/// Timeout for one-shot REST quote requests
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Values shipped in sample `.env` files that are not real keys
const PLACEHOLDER_PREFIXES: [&str; 4] = ["your_", "your-", "<", "changeme"];

// =============================================================================
// Credentials
// =============================================================================

/// True for empty keys and sample values like `your_api_key_here`
pub fn is_placeholder_credential(key: &str) -> bool {
    let key = key.trim().to_ascii_lowercase();
    key.is_empty() || PLACEHOLDER_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// The key, trimmed, if it is usable
pub fn valid_credential(key: Option<&str>) -> Option<&str> {
    key.map(str::trim)
        .filter(|k| !is_placeholder_credential(k))
}

/// Log-safe rendering of a credential
pub fn redacted(key: Option<&str>) -> &'static str {
    match valid_credential(key) {
        Some(_) => "<set>",
        None => "<unset>",
    }
}
