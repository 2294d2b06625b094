//! Law-of-large-numbers table for the pooling demo.
//!
//! Usage: `convergence [--probability P] [--runs N] [--start-seed S] [--json]`
//!
//! Runs every default pool size against `N` consecutive seeds and prints how
//! the actual/expected ratio tightens around 1.0 as the pool grows.

use anyhow::{Context, Result, bail};

use pricelab::analysis::pool_convergence;
use pricelab::config::DemoConfig;
use pricelab::types::Seed;

const POOL_SIZES: [usize; 6] = [10, 100, 1_000, 10_000, 100_000, 1_000_000];

fn main() -> Result<()> {
    env_logger::init();

    let config = DemoConfig::canonical();
    let mut probability = config.pooling.accident_probability.default;
    let mut runs: u64 = 200;
    let mut start_seed: u64 = 0;
    let mut json = false;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--json" => json = true,
            "--probability" | "--runs" | "--start-seed" => {
                i += 1;
                let raw = args.get(i).with_context(|| format!("{flag} requires a value"))?;
                match flag {
                    "--probability" => probability = raw.parse().context("--probability requires a float")?,
                    "--runs" => runs = raw.parse().context("--runs requires a positive integer")?,
                    _ => start_seed = raw.parse().context("--start-seed requires a u64")?,
                }
            }
            other => bail!("unknown argument '{other}'"),
        }
        i += 1;
    }

    let seeds: Vec<Seed> = (0..runs).map(|k| Seed(start_seed + k)).collect();
    let rows = pool_convergence(probability, config.claim_amount, &POOL_SIZES, &seeds)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows).context("failed to serialise rows")?);
        return Ok(());
    }

    println!("\n=== Pool convergence (p = {probability}, {runs} seeds from {start_seed}) ===");
    println!(
        "{:>10} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>11}",
        "Pool size", "p5", "p50", "p95", "Mean", "StdDev", "Mean|A/E-1|"
    );
    println!("{}", "-".repeat(10 + 3 + 7 + 3 + 7 + 3 + 7 + 3 + 7 + 3 + 7 + 3 + 11));
    for row in &rows {
        let d = &row.pool_performance;
        println!(
            "{:>10} | {:>7.3} | {:>7.3} | {:>7.3} | {:>7.3} | {:>7.3} | {:>11.4}",
            row.num_policyholders, d.p5, d.p50, d.p95, d.mean, d.std_dev, row.mean_abs_deviation
        );
    }
    Ok(())
}
