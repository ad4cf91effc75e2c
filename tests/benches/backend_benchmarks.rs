//! # Filehive Backend Benchmarks
//!
//! | Operation | Path | Target |
//! |-----------|------|--------|
//! | Send | exclusive ledger lock | < 10µs |
//! | Balance | shared ledger lock | < 1µs |
//! | Transactions page | shared lock, slice copy | < 10µs |
//! | Store 4 KiB | fee debit + unlocked payload write | < 50µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fh_network_backend::{ContentBackend, InMemorySimulation, WalletBackend};
use rand::Rng;
use shared_types::{Address, Amount};
use std::time::Duration;
use tokio::runtime::Runtime;

fn addr(s: &str) -> Address {
    Address::parse(s).expect("fixture address")
}

fn funded(accounts: usize) -> (InMemorySimulation, Vec<Address>) {
    let sim = InMemorySimulation::in_memory().expect("simulation");
    let addrs: Vec<Address> = (0..accounts)
        .map(|i| addr(&format!("f1bench{}", i)))
        .collect();
    for a in &addrs {
        sim.generate_to_address(a, Amount::from_major(1_000_000))
            .expect("mint");
    }
    (sim, addrs)
}

fn bench_ledger(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("ledger");
    group.measurement_time(Duration::from_secs(5));

    let (sim, addrs) = funded(16);
    let mut rng = rand::thread_rng();

    group.bench_function("send", |b| {
        b.to_async(&rt).iter(|| {
            let from = &addrs[rng.gen_range(0..addrs.len())];
            let to = &addrs[rng.gen_range(0..addrs.len())];
            let sim = &sim;
            async move { black_box(sim.send(from, to, Amount::from_minor(1)).await) }
        })
    });

    group.bench_function("balance", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(sim.balance(&addrs[0]).await) })
    });

    for page in [10i64, 100, 1_000] {
        group.throughput(Throughput::Elements(page as u64));
        group.bench_with_input(BenchmarkId::new("transactions", page), &page, |b, &page| {
            b.to_async(&rt)
                .iter(|| async { black_box(sim.transactions(&addrs[1], page, 0).await) })
        });
    }

    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("content");

    let (sim, addrs) = funded(1);
    let payer = &addrs[0];

    for size in [1_024usize, 4_096, 65_536] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("store", size), &size, |b, &size| {
            let mut counter = 0u64;
            b.to_async(&rt).iter(|| {
                counter += 1;
                let mut data = vec![0u8; size];
                data[..8].copy_from_slice(&counter.to_le_bytes());
                let sim = &sim;
                async move { black_box(sim.store(data, payer).await) }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ledger, bench_store);
criterion_main!(benches);
