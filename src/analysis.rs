use rayon::prelude::*;
use serde::Serialize;

use crate::error::{PricingError, PricingResult};
use crate::pooling::{RiskPoolParams, simulate_risk_pool};
use crate::types::Seed;

/// Summary of a sample of f64 values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistStats {
    pub n: usize,
    pub min: f64,
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (n − 1 denominator); 0 for a single value.
    pub std_dev: f64,
}

/// Actual/expected spread across seeds for one pool size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceRow {
    pub num_policyholders: usize,
    pub pool_performance: DistStats,
    /// Mean of |pool_performance − 1| across seeds.
    pub mean_abs_deviation: f64,
}

pub(crate) fn percentile_stats(values: &mut [f64]) -> Option<DistStats> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();

    let interp = |p: f64| -> f64 {
        let h = p * (n - 1) as f64;
        let lo = h.floor() as usize;
        let hi = (lo + 1).min(n - 1);
        let frac = h - lo as f64;
        values[lo] * (1.0 - frac) + values[hi] * frac
    };

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = if n > 1 {
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
    } else {
        0.0
    };

    Some(DistStats {
        n,
        min: values[0],
        p5: interp(0.05),
        p50: interp(0.50),
        p95: interp(0.95),
        max: values[n - 1],
        mean,
        std_dev: variance.sqrt(),
    })
}

/// Run the pooling simulation for every (size, seed) pair and summarise the
/// actual/expected ratio per size. Runs in parallel; the result does not
/// depend on scheduling. Rows are sorted by pool size, duplicates merged.
pub fn pool_convergence(
    accident_probability: f64,
    claim_amount: f64,
    sizes: &[usize],
    seeds: &[Seed],
) -> PricingResult<Vec<ConvergenceRow>> {
    if seeds.is_empty() {
        return Err(PricingError::invalid("seeds", 0.0, "at least one seed is required"));
    }
    let mut sizes = sizes.to_vec();
    sizes.sort_unstable();
    sizes.dedup();

    let pools: Vec<RiskPoolParams> = sizes
        .iter()
        .map(|&n| RiskPoolParams::new(accident_probability, n).with_claim_amount(claim_amount))
        .collect();
    for params in &pools {
        params.validate()?;
    }

    log::info!(
        "pool convergence: p={accident_probability}, {} sizes x {} seeds",
        pools.len(),
        seeds.len()
    );

    let jobs: Vec<(usize, Seed)> = (0..pools.len())
        .flat_map(|i| seeds.iter().map(move |&seed| (i, seed)))
        .collect();
    let ratios: Vec<(usize, f64)> = jobs
        .into_par_iter()
        .map(|(i, seed)| simulate_risk_pool(&pools[i], seed).map(|s| (i, s.pool_performance)))
        .collect::<PricingResult<_>>()?;

    let mut rows = Vec::with_capacity(pools.len());
    for (i, params) in pools.iter().enumerate() {
        let mut values: Vec<f64> =
            ratios.iter().filter(|(j, _)| *j == i).map(|&(_, r)| r).collect();
        let mean_abs_deviation =
            values.iter().map(|r| (r - 1.0).abs()).sum::<f64>() / values.len() as f64;
        let pool_performance = percentile_stats(&mut values)
            .ok_or_else(|| PricingError::degenerate("pool_performance", "no runs for this pool size"))?;
        rows.push(ConvergenceRow {
            num_policyholders: params.num_policyholders,
            pool_performance,
            mean_abs_deviation,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(n: u64) -> Vec<Seed> {
        (0..n).map(Seed).collect()
    }

    #[test]
    fn percentile_stats_known_values() {
        let mut values = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        let ds = percentile_stats(&mut values).unwrap();
        assert_eq!(ds.n, 5);
        assert!((ds.min - 1.0).abs() < 1e-10, "min");
        assert!((ds.max - 5.0).abs() < 1e-10, "max");
        assert!((ds.p50 - 3.0).abs() < 1e-10, "p50");
        assert!((ds.mean - 3.0).abs() < 1e-10, "mean");
        assert!((ds.p5 - 1.2).abs() < 1e-10, "p5");
        assert!((ds.std_dev - 2.5_f64.sqrt()).abs() < 1e-10, "std_dev");
    }

    #[test]
    fn percentile_stats_empty_returns_none() {
        let mut values: Vec<f64> = vec![];
        assert!(percentile_stats(&mut values).is_none());
    }

    #[test]
    fn percentile_stats_single_value() {
        let ds = percentile_stats(&mut [0.7]).unwrap();
        assert_eq!(ds.std_dev, 0.0);
        assert_eq!(ds.p5, 0.7);
        assert_eq!(ds.p95, 0.7);
    }

    #[test]
    fn rows_sorted_and_deduplicated() {
        let rows = pool_convergence(0.05, 20_000.0, &[1000, 10, 100, 10], &seeds(4)).unwrap();
        let sizes: Vec<usize> = rows.iter().map(|r| r.num_policyholders).collect();
        assert_eq!(sizes, vec![10, 100, 1000]);
        assert!(rows.iter().all(|r| r.pool_performance.n == 4));
    }

    #[test]
    fn matches_sequential_runs() {
        let s = seeds(6);
        let rows = pool_convergence(0.1, 20_000.0, &[50], &s).unwrap();
        let mut sequential: Vec<f64> = s
            .iter()
            .map(|&seed| simulate_risk_pool(&RiskPoolParams::new(0.1, 50), seed).unwrap().pool_performance)
            .collect();
        let expected = percentile_stats(&mut sequential).unwrap();
        assert_eq!(rows[0].pool_performance, expected);
    }

    #[test]
    fn deviation_shrinks_with_pool_size() {
        let rows = pool_convergence(0.05, 20_000.0, &[10, 100_000], &seeds(20)).unwrap();
        assert!(
            rows[1].mean_abs_deviation < rows[0].mean_abs_deviation,
            "large pool {:.4} vs small pool {:.4}",
            rows[1].mean_abs_deviation,
            rows[0].mean_abs_deviation
        );
        assert!(rows[1].pool_performance.std_dev < rows[0].pool_performance.std_dev);
    }

    #[test]
    fn invalid_inputs_fail() {
        assert!(pool_convergence(0.05, 20_000.0, &[10], &[]).is_err());
        assert!(pool_convergence(0.0, 20_000.0, &[10], &seeds(2)).is_err());
        assert!(pool_convergence(0.05, 20_000.0, &[0], &seeds(2)).is_err());
    }

    #[test]
    fn no_sizes_no_rows() {
        assert!(pool_convergence(0.05, 20_000.0, &[], &seeds(2)).unwrap().is_empty());
    }
}
