use std::sync::Arc;

use bazaar_core::events::RefreshSignal;
use bazaar_core::expiry::ExpiryWatcher;
use bazaar_core::marketplace::EngineConfig;
use bazaar_core::utils::SystemClock;
use bazaar_core::{MarketplaceConfig, ReconciliationEngine, ViewScope};
use bazaar_ledger::{LedgerQueryClient, RemoteSignerWallet, RestClientConfig, RestLedgerClient};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub engine: Arc<ReconciliationEngine>,
    /// Present only when a signer is configured
    pub watcher: Option<Arc<ExpiryWatcher>>,
    pub signal: RefreshSignal,
}

pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn scope_for(config: &Config) -> ViewScope {
    match &config.owner_address {
        Some(owner) => ViewScope::Owner(owner.clone()),
        None => ViewScope::Marketplace,
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let rest_config = RestClientConfig {
        node_url: config.node_url.trim_end_matches('/').to_string(),
        request_timeout: config.request_timeout,
        ..RestClientConfig::default()
    };
    let mut rest = RestLedgerClient::new(rest_config);
    if let Some(signer_url) = &config.signer_url {
        let wallet = RemoteSignerWallet::new(signer_url.clone(), config.owner_address.clone());
        rest = rest.with_wallet(Arc::new(wallet));
    }
    let can_sign = rest.has_wallet();
    let client: Arc<dyn LedgerQueryClient> = Arc::new(rest);

    let engine_config = EngineConfig {
        cooldown: config.fetch_cooldown,
        ..EngineConfig::default()
    };
    let engine = Arc::new(ReconciliationEngine::new(
        client,
        MarketplaceConfig::new(config.marketplace_address.clone()),
        scope_for(config),
        engine_config,
        Arc::new(SystemClock),
    ));

    let watcher = if can_sign {
        Some(Arc::new(ExpiryWatcher::new(engine.clone())))
    } else {
        tracing::info!("No signer configured; overdue auctions will not be finalized");
        None
    };

    tracing::info!(
        "Reconciling marketplace {} via {} ({:?})",
        config.marketplace_address,
        config.node_url,
        engine.scope()
    );

    Ok(Arc::new(AppState {
        engine,
        watcher,
        signal: RefreshSignal::default(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(owner: Option<&str>, signer: Option<&str>) -> Config {
        let mut env = vec![("BAZAAR_MARKETPLACE_ADDRESS", "0xcafe")];
        if let Some(owner) = owner {
            env.push(("BAZAAR_OWNER_ADDRESS", owner));
        }
        if let Some(signer) = signer {
            env.push(("BAZAAR_SIGNER_URL", signer));
        }
        Config::from_lookup(|key| {
            env.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn test_scope_follows_owner_address() {
        assert_eq!(scope_for(&config(None, None)), ViewScope::Marketplace);
        assert_eq!(
            scope_for(&config(Some("0xme"), None)),
            ViewScope::Owner("0xme".to_string())
        );
    }

    #[tokio::test]
    async fn test_watcher_requires_signer() {
        let state = build_state(&config(None, None)).unwrap();
        assert!(state.watcher.is_none());
        assert_eq!(state.engine.marketplace().address, "0xcafe");

        let state = build_state(&config(None, Some("http://localhost:9000/sign"))).unwrap();
        assert!(state.watcher.is_some());
    }
}
