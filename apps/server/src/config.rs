use std::time::Duration;

use anyhow::{anyhow, Context};
use bazaar_core::constants::{EXPIRY_INTERVAL, FETCH_COOLDOWN, RECONCILE_INTERVAL};
use bazaar_ledger::DEFAULT_NODE_URL;

#[derive(Debug, Clone)]
pub struct Config {
    pub node_url: String,
    pub marketplace_address: String,
    /// Reconcile only this account's items and auctions
    pub owner_address: Option<String>,
    /// Signing service; enables auction finalization when set
    pub signer_url: Option<String>,
    pub fetch_cooldown: Duration,
    pub reconcile_interval: Duration,
    pub expiry_interval: Duration,
    pub request_timeout: Duration,
    pub log_format: String,
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unparseable numbers fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let marketplace_address = non_empty(lookup("BAZAAR_MARKETPLACE_ADDRESS"))
            .ok_or_else(|| anyhow!("BAZAAR_MARKETPLACE_ADDRESS must be set"))?;
        if !marketplace_address.starts_with("0x") {
            return Err(anyhow!(
                "BAZAAR_MARKETPLACE_ADDRESS must be 0x-prefixed, got {}",
                marketplace_address
            ))
            .context("Invalid marketplace address");
        }

        let node_url = non_empty(lookup("BAZAAR_NODE_URL")).unwrap_or_else(|| DEFAULT_NODE_URL.into());
        let cooldown_ms: u64 = parse_or(
            lookup("BAZAAR_FETCH_COOLDOWN_MS"),
            FETCH_COOLDOWN.as_millis() as u64,
        );
        let reconcile_secs: u64 = parse_or(
            lookup("BAZAAR_RECONCILE_INTERVAL_SECS"),
            RECONCILE_INTERVAL.as_secs(),
        );
        let expiry_secs: u64 = parse_or(
            lookup("BAZAAR_EXPIRY_INTERVAL_SECS"),
            EXPIRY_INTERVAL.as_secs(),
        );
        let timeout_ms: u64 = parse_or(lookup("BAZAAR_REQUEST_TIMEOUT_MS"), 30_000);

        Ok(Self {
            node_url,
            marketplace_address,
            owner_address: non_empty(lookup("BAZAAR_OWNER_ADDRESS")),
            signer_url: non_empty(lookup("BAZAAR_SIGNER_URL")),
            fetch_cooldown: Duration::from_millis(cooldown_ms),
            // Zero would make tokio's interval panic
            reconcile_interval: Duration::from_secs(reconcile_secs.max(1)),
            expiry_interval: Duration::from_secs(expiry_secs.max(1)),
            request_timeout: Duration::from_millis(timeout_ms),
            log_format: non_empty(lookup("BAZAAR_LOG_FORMAT")).unwrap_or_else(|| "text".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("BAZAAR_MARKETPLACE_ADDRESS", "0xcafe")]).unwrap();
        assert_eq!(config.node_url, DEFAULT_NODE_URL);
        assert_eq!(config.fetch_cooldown, Duration::from_secs(5));
        assert_eq!(config.reconcile_interval, Duration::from_secs(15));
        assert_eq!(config.expiry_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, "text");
        assert!(config.owner_address.is_none());
        assert!(config.signer_url.is_none());
    }

    #[test]
    fn test_marketplace_address_is_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("BAZAAR_MARKETPLACE_ADDRESS", "  ")]).is_err());
        assert!(config(&[("BAZAAR_MARKETPLACE_ADDRESS", "cafe")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("BAZAAR_MARKETPLACE_ADDRESS", "0xcafe"),
            ("BAZAAR_OWNER_ADDRESS", "0xme"),
            ("BAZAAR_SIGNER_URL", "http://localhost:9000/sign"),
            ("BAZAAR_FETCH_COOLDOWN_MS", "2000"),
            ("BAZAAR_RECONCILE_INTERVAL_SECS", "0"),
            ("BAZAAR_REQUEST_TIMEOUT_MS", "not a number"),
            ("BAZAAR_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(config.owner_address.as_deref(), Some("0xme"));
        assert!(config.signer_url.is_some());
        assert_eq!(config.fetch_cooldown, Duration::from_secs(2));
        assert_eq!(config.reconcile_interval, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.log_format, "json");
    }
}
