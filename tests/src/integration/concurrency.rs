//! # Concurrency Tests
//!
//! Many callers share one backend instance across worker threads. Transfers
//! racing for the same balance must never overdraw it, and value is neither
//! created nor destroyed by transfers.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fh_network_backend::{
        ContentBackend, FeeSchedule, InMemoryBlobStore, InMemorySimulation, NetworkBackend,
        WalletBackend,
    };
    use shared_types::{Address, Amount, BackendError, JobStatus};

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_senders_never_overdraw() {
        let sim = Arc::new(InMemorySimulation::in_memory().unwrap());
        let source = addr("f1source");
        sim.generate_to_address(&source, Amount::from_minor(100)).unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let backend: Arc<dyn NetworkBackend> = sim.clone();
            let from = source.clone();
            let to = addr(&format!("f1sink{}", i % 4));
            handles.push(tokio::spawn(async move {
                backend.send(&from, &to, Amount::from_minor(7)).await
            }));
        }

        let mut accepted = 0u128;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(BackendError::InsufficientFunds { .. }) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        // 100 / 7 = 14 transfers fit, the rest must be rejected.
        assert_eq!(accepted, 14);
        assert_eq!(
            sim.balance(&source).await.unwrap(),
            Amount::from_minor(100 - 7 * 14)
        );
        assert_eq!(sim.transactions(&source, -1, 0).await.unwrap().len(), 15);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_transfers_conserve_total_supply() {
        let sim = Arc::new(InMemorySimulation::in_memory().unwrap());
        let accounts: Vec<Address> = (0..6).map(|i| addr(&format!("f1acct{}", i))).collect();
        for a in &accounts {
            sim.generate_to_address(a, Amount::from_minor(1_000)).unwrap();
        }

        let mut handles = Vec::new();
        for worker in 0..8usize {
            let sim = sim.clone();
            let accounts = accounts.clone();
            handles.push(tokio::spawn(async move {
                for step in 0..50usize {
                    let from = &accounts[(worker + step) % accounts.len()];
                    let to = &accounts[(worker * 7 + step * 3 + 1) % accounts.len()];
                    let amount = Amount::from_minor(((worker + step) % 97 + 1) as u128);
                    match sim.send(from, to, amount).await {
                        Ok(_) | Err(BackendError::InsufficientFunds { .. }) => {}
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut total = Amount::zero();
        for a in &accounts {
            total = total.checked_add(sim.balance(a).await.unwrap()).unwrap();
        }
        assert_eq!(total, Amount::from_minor(6_000));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_stores_charge_each_job() {
        let sim = Arc::new(
            InMemorySimulation::new(
                Arc::new(InMemoryBlobStore::new()),
                Arc::new(fh_network_backend::SystemTimeSource),
                Arc::new(fh_network_backend::Secp256k1IdentityGenerator),
            )
            .unwrap()
            .with_fees(
                FeeSchedule {
                    base_fee: Amount::from_minor(10),
                    per_kib_fee: Amount::zero(),
                },
                addr("f0700"),
            ),
        );
        let payer = addr("f1payer");
        sim.generate_to_address(&payer, Amount::from_minor(100)).unwrap();

        let mut handles = Vec::new();
        for i in 0..16u8 {
            let sim = sim.clone();
            let payer = payer.clone();
            handles.push(tokio::spawn(async move {
                sim.store(vec![i; 64], &payer).await
            }));
        }

        let mut jobs = Vec::new();
        for handle in handles {
            match handle.await.unwrap() {
                Ok((job, _)) => jobs.push(job),
                Err(BackendError::InsufficientFunds { .. }) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(jobs.len(), 10);
        assert!(sim.balance(&payer).await.unwrap().is_zero());
        assert_eq!(
            sim.balance(&addr("f0700")).await.unwrap(),
            Amount::from_minor(100)
        );
        for job in &jobs {
            assert_eq!(sim.job_status(job).await.unwrap(), JobStatus::Submitted);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_poll_while_jobs_advance() {
        let sim = Arc::new(InMemorySimulation::in_memory().unwrap());
        let payer = addr("f1payer");
        let mut jobs = Vec::new();
        for i in 0..8u8 {
            jobs.push(sim.store(vec![i; 16], &payer).await.unwrap().0);
        }

        let poller = {
            let sim = sim.clone();
            let jobs = jobs.clone();
            tokio::spawn(async move {
                for _ in 0..100 {
                    for job in &jobs {
                        sim.job_status(job).await.unwrap();
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        sim.advance_jobs().await;
        sim.advance_jobs().await;
        poller.await.unwrap();

        for job in &jobs {
            assert_eq!(sim.job_status(job).await.unwrap(), JobStatus::Active);
        }
    }
}
