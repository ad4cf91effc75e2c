//! # Integration Test Flows
//!
//! Exercises the backend contract end to end through `Arc<dyn NetworkBackend>`,
//! the way API-layer collaborators hold it.
//!
//! ## Flows Tested:
//!
//! 1. **Ledger**: mint, transfer, overdraft rejection, self-transfer, pagination
//! 2. **Overrides**: one-shot address, transaction id and timestamp hooks
//! 3. **Content**: fee-charged store, retrieval, deduplication, job lifecycle

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use fh_network_backend::ports::{ManualClock, TimeSource};
    use fh_network_backend::{
        build_backend, BackendConfig, ContentBackend, FeeSchedule, InMemoryBlobStore,
        InMemorySimulation, NetworkBackend, Secp256k1IdentityGenerator, WalletBackend,
    };
    use rand::Rng;
    use shared_types::{
        Address, Amount, BackendError, ContentId, JobId, JobStatus, NotFoundKind, TransactionView,
        TxId,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const ADDR_A: &str = "f1cu3c2dqsbyt7nq63x2yubyy6ofuini2nfvnnahi";
    const ADDR_B: &str = "f1gyvikksfdmokwhg5jhcrkvfqkyd2sjdy46klgbq";
    const COLLECTOR: &str = "f0500";
    const TXID_MINT: &str = "bafkreiewgqfti56ls5zt2kko2utajoliipl3te7cl5lvtiowgny6qb2pde";
    const TXID_SEND: &str = "bafkreif2mzhq6663465bcb2s3xgqefysbmr3a2bxloobw7s4vrxooj6kva";

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn txid(s: &str) -> TxId {
        s.parse().unwrap()
    }

    fn major(s: &str) -> Amount {
        Amount::from_major_str(s).unwrap()
    }

    fn simulation() -> Arc<InMemorySimulation> {
        Arc::new(InMemorySimulation::in_memory().unwrap())
    }

    fn paid_simulation(blobs: Arc<InMemoryBlobStore>) -> Arc<InMemorySimulation> {
        let sim = InMemorySimulation::new(
            blobs,
            Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap())),
            Arc::new(Secp256k1IdentityGenerator),
        )
        .unwrap()
        .with_fees(
            FeeSchedule {
                base_fee: Amount::from_minor(1_000),
                per_kib_fee: Amount::from_minor(10),
            },
            addr(COLLECTOR),
        );
        Arc::new(sim)
    }

    async fn seal_until_terminal(sim: &InMemorySimulation, job: &JobId) -> JobStatus {
        for _ in 0..4 {
            let status = sim.job_status(job).await.unwrap();
            if status.is_terminal() {
                return status;
            }
            sim.advance_jobs().await;
        }
        sim.job_status(job).await.unwrap()
    }

    // =============================================================================
    // LEDGER FLOWS
    // =============================================================================

    /// Mint 15.5 to A, send 1 to B: balances and both histories line up.
    #[tokio::test]
    async fn test_mint_then_send_histories() {
        let sim = simulation();
        let backend: Arc<dyn NetworkBackend> = sim.clone();
        let (a, b) = (addr(ADDR_A), addr(ADDR_B));

        sim.generate_to_address(&a, major("15.5")).unwrap();
        backend.send(&a, &b, major("1")).await.unwrap();

        assert_eq!(backend.balance(&a).await.unwrap(), major("14.5"));
        assert_eq!(backend.balance(&b).await.unwrap(), major("1"));

        let history_a = backend.transactions(&a, -1, 0).await.unwrap();
        assert_eq!(history_a.len(), 2);
        assert!(history_a[0].is_mint());
        assert_eq!(history_a[0].amount, major("15.5"));
        assert_eq!(history_a[1].from.as_ref(), Some(&a));
        assert_eq!(history_a[1].to, b);
        assert_eq!(history_a[1].amount, major("1"));

        let history_b = backend.transactions(&b, -1, 0).await.unwrap();
        assert_eq!(history_b.len(), 1);
        assert_eq!(history_b[0].from.as_ref(), Some(&a));
        assert_eq!(history_b[0].id, history_a[1].id);
    }

    /// Overdraft leaves balances and logs untouched.
    #[tokio::test]
    async fn test_overdraft_rejected_without_side_effects() {
        let sim = simulation();
        let backend: Arc<dyn NetworkBackend> = sim.clone();
        let (a, b) = (addr(ADDR_A), addr(ADDR_B));
        sim.generate_to_address(&a, major("15.5")).unwrap();
        backend.send(&a, &b, major("1")).await.unwrap();
        let before = backend.transactions(&a, -1, 0).await.unwrap();

        let err = backend.send(&a, &b, major("20")).await.unwrap_err();
        assert_eq!(
            err,
            BackendError::InsufficientFunds {
                required: major("20"),
                available: major("14.5"),
            }
        );

        assert_eq!(backend.balance(&a).await.unwrap(), major("14.5"));
        assert_eq!(backend.balance(&b).await.unwrap(), major("1"));
        assert_eq!(backend.transactions(&a, -1, 0).await.unwrap(), before);
        assert_eq!(backend.transactions(&b, -1, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_self_transfer_single_entry() {
        let sim = simulation();
        let a = addr(ADDR_A);
        sim.generate_to_address(&a, major("3")).unwrap();

        sim.send(&a, &a, major("2")).await.unwrap();

        assert_eq!(sim.balance(&a).await.unwrap(), major("3"));
        let history = sim.transactions(&a, -1, 0).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].from.as_ref(), Some(&a));
        assert_eq!(history[1].to, a);
    }

    #[tokio::test]
    async fn test_pagination_clamping() {
        let sim = simulation();
        let a = addr(ADDR_A);
        for i in 1..=5 {
            sim.generate_to_address(&a, Amount::from_major(i)).unwrap();
        }
        let full = sim.transactions(&a, -1, 0).await.unwrap();
        assert_eq!(full.len(), 5);

        assert_eq!(sim.transactions(&a, 1, 0).await.unwrap(), full[..1].to_vec());
        assert_eq!(sim.transactions(&a, -1, -7).await.unwrap(), full);
        assert_eq!(sim.transactions(&a, 2, 3).await.unwrap(), full[3..].to_vec());
        assert_eq!(sim.transactions(&a, 100, 4).await.unwrap(), full[4..].to_vec());
        assert!(sim.transactions(&a, 10, 5).await.unwrap().is_empty());
        assert!(sim.transactions(&a, 10, 500).await.unwrap().is_empty());

        // Reading never mutates the log.
        assert_eq!(sim.transactions(&a, -1, 0).await.unwrap(), full);
    }

    #[tokio::test]
    async fn test_unknown_address_is_empty() {
        let sim = simulation();
        let nobody = addr("f1nobody");
        assert!(sim.balance(&nobody).await.unwrap().is_zero());
        assert!(sim.transactions(&nobody, -1, 0).await.unwrap().is_empty());
    }

    /// Random mint/transfer sequences never break the balance derivation.
    #[tokio::test]
    async fn test_balances_match_logs_under_random_traffic() {
        let sim = simulation();
        let addrs: Vec<Address> = ["f1a", "f1b", "f1c", "f1d"].iter().map(|s| addr(s)).collect();
        let mut rng = rand::thread_rng();

        for _ in 0..300 {
            let from = &addrs[rng.gen_range(0..addrs.len())];
            let to = &addrs[rng.gen_range(0..addrs.len())];
            let amount = Amount::from_minor(rng.gen_range(1..1_000));
            if rng.gen_bool(0.2) {
                sim.generate_to_address(to, amount).unwrap();
            } else {
                match sim.send(from, to, amount).await {
                    Ok(_) | Err(BackendError::InsufficientFunds { .. }) => {}
                    Err(e) => panic!("unexpected error: {}", e),
                }
            }
        }

        for a in &addrs {
            let mut credits = 0u128;
            let mut debits = 0u128;
            for tx in sim.transactions(a, -1, 0).await.unwrap() {
                let minor: u128 = tx.amount.to_string().parse().unwrap();
                if tx.credits(a) {
                    credits += minor;
                }
                if tx.debits(a) {
                    debits += minor;
                }
            }
            assert!(credits >= debits);
            assert_eq!(
                sim.balance(a).await.unwrap(),
                Amount::from_minor(credits - debits)
            );
        }
    }

    // =============================================================================
    // OVERRIDE HOOKS
    // =============================================================================

    /// Pinned ids and timestamps produce reproducible API views.
    #[tokio::test]
    async fn test_pinned_fixture_serializes_stably() {
        let sim = simulation();
        let (a, b) = (addr(ADDR_A), addr(ADDR_B));
        let at = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();

        sim.set_next_txid(txid(TXID_MINT));
        sim.set_next_time(at);
        sim.generate_to_address(&a, major("15.5")).unwrap();

        sim.set_next_txid(txid(TXID_SEND));
        sim.set_next_time(at);
        sim.send(&a, &b, major("1")).await.unwrap();

        let views: Vec<TransactionView> = sim
            .transactions(&a, -1, 0)
            .await
            .unwrap()
            .iter()
            .map(TransactionView::from)
            .collect();

        assert_eq!(
            serde_json::to_value(&views).unwrap(),
            serde_json::json!([
                {
                    "to": ADDR_A,
                    "from": "",
                    "transactionID": TXID_MINT,
                    "amount": 15.5,
                    "timestamp": "2021-03-04T05:06:07Z",
                },
                {
                    "to": ADDR_B,
                    "from": ADDR_A,
                    "transactionID": TXID_SEND,
                    "amount": 1.0,
                    "timestamp": "2021-03-04T05:06:07Z",
                },
            ])
        );
    }

    #[tokio::test]
    async fn test_txid_override_used_once() {
        let sim = simulation();
        let a = addr(ADDR_A);
        sim.set_next_txid(txid(TXID_MINT));

        let first = sim.generate_to_address(&a, major("1")).unwrap();
        let second = sim.generate_to_address(&a, major("1")).unwrap();

        assert_eq!(first, txid(TXID_MINT));
        assert_ne!(second, txid(TXID_MINT));
    }

    #[tokio::test]
    async fn test_time_override_used_once() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap()));
        let sim = InMemorySimulation::in_memory()
            .unwrap()
            .with_clock(clock.clone());
        let a = addr(ADDR_A);
        let pinned = Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap();
        sim.set_next_time(pinned);

        sim.generate_to_address(&a, major("1")).unwrap();
        sim.generate_to_address(&a, major("1")).unwrap();

        let history = sim.transactions(&a, -1, 0).await.unwrap();
        assert_eq!(history[0].timestamp, pinned);
        assert_eq!(history[1].timestamp, clock.now());
    }

    #[tokio::test]
    async fn test_override_survives_rejected_send() {
        let sim = simulation();
        let (a, b) = (addr(ADDR_A), addr(ADDR_B));
        sim.set_next_txid(txid(TXID_SEND));

        assert!(sim.send(&a, &b, major("1")).await.is_err());
        sim.generate_to_address(&a, major("1")).unwrap_or_else(|e| panic!("{}", e));

        let history = sim.transactions(&a, -1, 0).await.unwrap();
        assert_eq!(history[0].id, txid(TXID_SEND));
    }

    #[tokio::test]
    async fn test_address_override_used_once() {
        let sim = simulation();
        sim.set_next_address(addr(ADDR_B));

        assert_eq!(sim.new_address().await.unwrap(), addr(ADDR_B));
        let fresh = sim.new_address().await.unwrap();
        assert_ne!(fresh, addr(ADDR_B));
        assert!(fresh.as_str().starts_with("f1"));
    }

    // =============================================================================
    // CONTENT FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_store_charges_fee_and_seals() {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let sim = paid_simulation(blobs);
        let payer = addr(ADDR_A);
        sim.generate_to_address(&payer, Amount::from_minor(5_000)).unwrap();

        let payload = vec![7u8; 2_048];
        let (job, cid) = sim.store(payload.clone(), &payer).await.unwrap();

        // base 1000 + 2 KiB * 10
        assert_eq!(sim.balance(&payer).await.unwrap(), Amount::from_minor(3_980));
        assert_eq!(
            sim.balance(&addr(COLLECTOR)).await.unwrap(),
            Amount::from_minor(1_020)
        );
        assert_eq!(cid, ContentId::for_payload(&payload));
        assert_eq!(sim.job_status(&job).await.unwrap(), JobStatus::Submitted);
        assert_eq!(sim.get(&cid).await.unwrap(), payload);

        assert_eq!(seal_until_terminal(&sim, &job).await, JobStatus::Active);
    }

    #[tokio::test]
    async fn test_store_without_funds_rejected() {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let sim = paid_simulation(blobs.clone());
        let payer = addr(ADDR_A);

        let err = sim.store(b"unpaid".to_vec(), &payer).await.unwrap_err();
        assert!(matches!(err, BackendError::InsufficientFunds { .. }));
        assert!(blobs.is_empty());
        assert!(sim.jobs_for(&payer).is_empty());
        assert!(sim.transactions(&payer, -1, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identical_payloads_share_content_id() {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let sim = paid_simulation(blobs.clone());
        let payer = addr(ADDR_A);
        sim.generate_to_address(&payer, Amount::from_minor(10_000)).unwrap();

        let (job_1, cid_1) = sim.store(b"same bytes".to_vec(), &payer).await.unwrap();
        let (job_2, cid_2) = sim.store(b"same bytes".to_vec(), &payer).await.unwrap();

        assert_eq!(cid_1, cid_2);
        assert_ne!(job_1, job_2);
        assert_eq!(blobs.len(), 1);
        assert_eq!(sim.jobs_for(&payer).len(), 2);
    }

    #[tokio::test]
    async fn test_corrupted_payload_fails_job() {
        let blobs = Arc::new(InMemoryBlobStore::new());
        let sim = paid_simulation(blobs.clone());
        let payer = addr(ADDR_A);
        sim.generate_to_address(&payer, Amount::from_minor(5_000)).unwrap();

        let (job, cid) = sim.store(b"original".to_vec(), &payer).await.unwrap();
        sim.advance_jobs().await;
        assert_eq!(sim.job_status(&job).await.unwrap(), JobStatus::Sealing);

        blobs.corrupt(&cid, b"tampered".to_vec());
        assert_eq!(seal_until_terminal(&sim, &job).await, JobStatus::Failed);

        // Terminal jobs stay put.
        sim.advance_jobs().await;
        assert_eq!(sim.job_status(&job).await.unwrap(), JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_unknown_identifiers_not_found() {
        let sim = simulation();
        let job = JobId::new_random();
        let cid = ContentId::for_payload(b"never stored");

        assert_eq!(
            sim.job_status(&job).await,
            Err(BackendError::NotFound(NotFoundKind::Job(job)))
        );
        assert_eq!(
            sim.get(&cid).await,
            Err(BackendError::NotFound(NotFoundKind::Content(cid)))
        );
    }

    #[tokio::test]
    async fn test_file_backed_payloads_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = BackendConfig {
            data_dir: Some(dir.path().to_path_buf()),
            fees: FeeSchedule::free(),
            ..BackendConfig::default()
        };
        let payer = addr(ADDR_A);

        let cid = {
            let backend = build_backend(&config).unwrap();
            let (_, cid) = backend.store(b"durable".to_vec(), &payer).await.unwrap();
            cid
        };

        let restarted = build_backend(&config).unwrap();
        assert_eq!(restarted.get(&cid).await.unwrap(), b"durable");
    }

    #[tokio::test]
    async fn test_separate_instances_are_isolated() {
        let first = simulation();
        let second = simulation();
        let a = addr(ADDR_A);

        first.generate_to_address(&a, major("2")).unwrap();

        assert_eq!(first.balance(&a).await.unwrap(), major("2"));
        assert!(second.balance(&a).await.unwrap().is_zero());
    }
}
