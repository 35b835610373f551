//! Tests for ExpiryWatcher sweeps.

#[cfg(test)]
mod tests {
    use crate::expiry::{ExpiryWatcher, SweepReport};
    use crate::marketplace::{EngineConfig, MarketplaceConfig, ReconciliationEngine, ViewScope};
    use crate::testing::{MockLedgerClient, MARKETPLACE};
    use crate::utils::ManualClock;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    const NOW: u64 = 1_700_000_000;

    async fn setup(mock: &MockLedgerClient) -> (Arc<ReconciliationEngine>, ExpiryWatcher) {
        let engine = Arc::new(ReconciliationEngine::new(
            Arc::new(mock.clone()),
            MarketplaceConfig::new(MARKETPLACE),
            ViewScope::Marketplace,
            EngineConfig::default(),
            Arc::new(ManualClock::at_unix(NOW as i64)),
        ));
        engine.refresh().await.unwrap();
        let watcher = ExpiryWatcher::new(engine.clone());
        (engine, watcher)
    }

    #[tokio::test(start_paused = true)]
    async fn test_overdue_auction_is_finalized_once() {
        let mock = MockLedgerClient::initialized();
        mock.add_item(9, "0xseller", 100_000_000, false, 1);
        mock.add_auction(1, 9, "0xseller", "0xbidder", NOW - 10, true);
        mock.add_auction(2, 9, "0xseller", "0x0", NOW + 600, true);
        let (engine, watcher) = setup(&mock).await;

        let report = watcher.sweep().await;

        assert_eq!(report.candidates, 1);
        assert_eq!(report.finalized, 1);
        let submitted = mock.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].function, "0xcafe::nft_marketplace::end_auction");
        assert_eq!(submitted[0].arguments, vec![json!(MARKETPLACE), json!("1")]);

        // The forced refresh picked up the settlement
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.cycle, 2);
        assert!(snapshot.overdue_auctions(NOW).is_empty());

        // Nothing left to do on the next sweep
        let again = watcher.sweep().await;
        assert_eq!(again, SweepReport::default());
        assert_eq!(mock.submitted().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_submit_when_ledger_reports_inactive() {
        let mock = MockLedgerClient::initialized();
        mock.add_auction(1, 9, "0xseller", "0x0", NOW - 10, true);
        let (_engine, watcher) = setup(&mock).await;

        // Someone else finalized it after our snapshot
        mock.with(|s| {
            if let Some(tuple) = s.auctions.get_mut(&1) {
                tuple[6] = json!(false);
            }
        });
        let report = watcher.sweep().await;

        assert_eq!(report.candidates, 1);
        assert_eq!(report.already_inactive, 1);
        assert_eq!(report.finalized, 0);
        assert!(mock.submitted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_inactive_abort_is_benign() {
        let mock = MockLedgerClient::initialized();
        mock.add_auction(1, 9, "0xseller", "0x0", NOW - 10, true);
        let (_engine, watcher) = setup(&mock).await;
        mock.with(|s| s.abort_with = Some("Move abort: EAUCTION_NOT_ACTIVE".to_string()));

        let report = watcher.sweep().await;

        assert_eq!(report.already_inactive, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(mock.submitted().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failure_does_not_stop_the_sweep() {
        let mock = MockLedgerClient::initialized();
        mock.add_auction(1, 9, "0xseller", "0x0", NOW - 10, true);
        mock.add_auction(2, 10, "0xseller", "0x0", NOW - 20, true);
        let (_engine, watcher) = setup(&mock).await;

        // Re-reading auction 1 now fails; auction 2 is still finalizable
        mock.with(|s| {
            s.auctions.remove(&1);
        });
        let report = watcher.sweep().await;

        assert_eq!(report.candidates, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.finalized, 1);
        let submitted = mock.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].arguments, vec![json!(MARKETPLACE), json!("2")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_abort_is_counted_as_failed() {
        let mock = MockLedgerClient::initialized();
        mock.add_auction(1, 9, "0xseller", "0x0", NOW - 10, true);
        mock.add_auction(2, 10, "0xseller", "0x0", NOW - 20, true);
        let (_engine, watcher) = setup(&mock).await;
        mock.with(|s| s.abort_with = Some("Move abort: ENOT_AUTHORIZED".to_string()));

        let report = watcher.sweep().await;

        assert_eq!(report.candidates, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(mock.submitted().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_mid_sweep_submits_nothing() {
        let mock = MockLedgerClient::initialized();
        mock.add_auction(1, 9, "0xseller", "0x0", NOW - 10, true);
        mock.add_auction(2, 10, "0xseller", "0x0", NOW - 20, true);
        mock.add_auction(3, 11, "0xseller", "0x0", NOW - 30, true);
        let (engine, watcher) = setup(&mock).await;
        mock.with(|s| s.view_delay = Some(Duration::from_secs(2)));
        let calls = mock.view_calls().len();

        let sweep = tokio::spawn(async move { watcher.sweep().await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        engine.shutdown();
        let report = sweep.await.unwrap();

        assert_eq!(report.candidates, 3);
        assert_eq!(report.finalized, 0);
        assert_eq!(report.abandoned, 3);
        assert!(mock.submitted().is_empty());
        // Only the in-flight re-read of the first auction went out
        assert_eq!(mock.view_calls().len(), calls + 1);
        assert_eq!(engine.snapshot().cycle, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_without_candidates_does_not_refresh() {
        let mock = MockLedgerClient::initialized();
        mock.add_auction(1, 9, "0xseller", "0x0", NOW + 60, true);
        let (engine, watcher) = setup(&mock).await;
        let calls = mock.view_calls().len();

        let report = watcher.sweep().await;

        assert_eq!(report, SweepReport::default());
        assert_eq!(mock.view_calls().len(), calls);
        assert_eq!(engine.snapshot().cycle, 1);
    }
}
