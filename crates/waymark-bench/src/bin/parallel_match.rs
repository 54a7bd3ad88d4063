//! Parallel lookup throughput for Waymark.
//!
//! Shares one built router between many tasks and counts how many paths
//! they resolve per second.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Barrier;
use waymark_bench::{api_router, API_PATHS};
use waymark_core::Router;

const WARMUP_SECS: u64 = 1;
const BENCH_SECS: u64 = 5;
const BATCH: usize = 1024;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();
    let num_workers = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(4, usize::from));

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            Waymark Parallel Lookup Benchmark                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    run_lookup_benchmark(num_workers).await;
}

async fn run_lookup_benchmark(num_workers: usize) {
    println!("📊 Lookup Benchmark: {} workers", num_workers);
    println!("   Warmup: {}s, Measurement: {}s", WARMUP_SECS, BENCH_SECS);
    println!();

    let router = Arc::new(api_router());
    let lookups = Arc::new(AtomicU64::new(0));
    let matched = Arc::new(AtomicU64::new(0));
    let running = Arc::new(AtomicBool::new(true));
    let barrier = Arc::new(Barrier::new(num_workers + 1));

    let mut handles = Vec::new();
    for worker_id in 0..num_workers {
        let router = Arc::clone(&router);
        let lookups = Arc::clone(&lookups);
        let matched = Arc::clone(&matched);
        let running = Arc::clone(&running);
        let barrier = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            run_worker(worker_id, &router, &lookups, &matched, &running).await;
        }));
    }

    barrier.wait().await;
    println!("✓ All {} workers started", num_workers);

    println!("⏳ Warming up for {}s...", WARMUP_SECS);
    tokio::time::sleep(Duration::from_secs(WARMUP_SECS)).await;

    lookups.store(0, Ordering::SeqCst);
    matched.store(0, Ordering::SeqCst);
    let start = Instant::now();

    println!("📈 Measuring for {}s...", BENCH_SECS);
    tokio::time::sleep(Duration::from_secs(BENCH_SECS)).await;

    let elapsed = start.elapsed();
    let total_lookups = lookups.load(Ordering::SeqCst);
    let total_matched = matched.load(Ordering::SeqCst);

    running.store(false, Ordering::SeqCst);
    for handle in handles {
        let _ = handle.await;
    }

    let lookups_per_sec = total_lookups as f64 / elapsed.as_secs_f64();
    let per_worker = lookups_per_sec / num_workers as f64;
    let hit_rate = if total_lookups == 0 {
        0.0
    } else {
        total_matched as f64 / total_lookups as f64 * 100.0
    };

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                         RESULTS                              ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  Workers:              {:>10}                           ║",
        num_workers
    );
    println!(
        "║  Duration:             {:>10.2}s                          ║",
        elapsed.as_secs_f64()
    );
    println!(
        "║  Total Lookups:        {:>10}                           ║",
        total_lookups
    );
    println!(
        "║  Hit Rate:             {:>10.1}%                          ║",
        hit_rate
    );
    println!(
        "║  Throughput:           {:>10.0} lookups/s                ║",
        lookups_per_sec
    );
    println!(
        "║  Per-Worker:           {:>10.0} lookups/s                ║",
        per_worker
    );
    println!("╚══════════════════════════════════════════════════════════════╝");
}

async fn run_worker(
    worker_id: usize,
    router: &Router<usize>,
    lookups: &AtomicU64,
    matched: &AtomicU64,
    running: &AtomicBool,
) {
    // Stagger the starting offset so workers don't walk the sample in lockstep
    let mut cursor = worker_id % API_PATHS.len();

    while running.load(Ordering::Relaxed) {
        let mut hits = 0;
        for _ in 0..BATCH {
            if router.at(API_PATHS[cursor]).is_some() {
                hits += 1;
            }
            cursor = (cursor + 1) % API_PATHS.len();
        }
        lookups.fetch_add(BATCH as u64, Ordering::Relaxed);
        matched.fetch_add(hits, Ordering::Relaxed);

        // Small yield so the timer task gets scheduled
        tokio::task::yield_now().await;
    }
}
