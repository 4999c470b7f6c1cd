//! Scale demo - build each layout from random keys and measure build time,
//! lookup latency, and memory per key.
//!
//! ```text
//! cargo run --release --example scale -- --count 10000000 --lookups 1000000
//! ```

use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use statikv::{EytzingerTable, Key, MemoryStats, SortedTable, VebTable};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Layout {
    Sorted,
    Eytzinger,
    Veb,
}

impl Layout {
    fn name(&self) -> &'static str {
        match self {
            Layout::Sorted => "Sorted",
            Layout::Eytzinger => "Eytzinger",
            Layout::Veb => "vEB",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "scale")]
#[command(about = "Build lookup tables from random keys and measure latency and memory")]
struct Args {
    /// Number of random keys to build from
    #[arg(short = 'n', long, default_value_t = 10_000_000)]
    count: usize,

    /// Number of random hit lookups to time
    #[arg(short, long, default_value_t = 1_000_000)]
    lookups: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Layouts to measure
    #[arg(short = 't', long, value_enum, value_delimiter = ',', default_values_t = vec![
        Layout::Sorted,
        Layout::Eytzinger,
        Layout::Veb,
    ])]
    layouts: Vec<Layout>,
}

struct Row {
    build: Duration,
    lookup_ns: f64,
    stats: MemoryStats,
    checksum: u64,
}

fn measure<T>(
    entries: &[(Key, u64)],
    queries: &[Key],
    build: impl FnOnce(Vec<(Key, u64)>) -> T,
    get: impl Fn(&T, Key) -> Option<u64>,
    stats: impl Fn(&T) -> MemoryStats,
) -> Row {
    let input = entries.to_vec();
    let t0 = Instant::now();
    let table = build(input);
    let build_time = t0.elapsed();

    let t1 = Instant::now();
    let mut checksum = 0u64;
    for &q in queries {
        if let Some(v) = get(&table, q) {
            checksum = checksum.wrapping_add(v);
        }
    }
    let lookup_ns = t1.elapsed().as_nanos() as f64 / queries.len() as f64;

    Row {
        build: build_time,
        lookup_ns,
        stats: stats(&table),
        checksum,
    }
}

fn main() {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let entries: Vec<(Key, u64)> = (0..args.count)
        .map(|_| {
            let k: i64 = rng.gen();
            (k, k as u64)
        })
        .collect();

    let mut queries: Vec<Key> = entries
        .iter()
        .map(|&(k, _)| k)
        .cycle()
        .take(args.lookups)
        .collect();
    queries.shuffle(&mut rng);

    println!(
        "{} random keys, {} random hit lookups per layout",
        args.count, args.lookups
    );
    println!();
    println!(
        "{:<10} {:>10} {:>12} {:>10} {:>14}",
        "Layout", "Build ms", "Lookup ns", "Bytes/key", "Checksum"
    );

    for layout in &args.layouts {
        let row = match layout {
            Layout::Sorted => measure(
                &entries,
                &queries,
                SortedTable::build,
                |t, q| t.get(q).copied(),
                SortedTable::memory_stats,
            ),
            Layout::Eytzinger => measure(
                &entries,
                &queries,
                EytzingerTable::build,
                |t, q| t.get(q).copied(),
                EytzingerTable::memory_stats,
            ),
            Layout::Veb => measure(
                &entries,
                &queries,
                |e| VebTable::build(e).expect("key count fits the u32 index space"),
                |t, q| t.get(q).copied(),
                VebTable::memory_stats,
            ),
        };
        println!(
            "{:<10} {:>10.1} {:>12.1} {:>10.1} {:>14x}",
            layout.name(),
            row.build.as_secs_f64() * 1e3,
            row.lookup_ns,
            row.stats.bytes_per_key,
            row.checksum
        );
    }
}
