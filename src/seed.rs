use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::drivers::DriverComparisonParams;
use crate::error::{PricingError, PricingResult};
use crate::pooling::RiskPoolParams;
use crate::types::{Seed, SeedOffset};

/// Smallest offset a re-simulate request can draw.
pub const OFFSET_MIN: u64 = 1;
/// Largest offset a re-simulate request can draw.
pub const OFFSET_MAX: u64 = 10_000;

/// `floor(Σ value × weight) + offset`, summed left to right. The offset is
/// caller-owned and stays zero until a re-simulate request draws one.
pub fn derive_seed(weighted: &[(f64, f64)], offset: SeedOffset) -> PricingResult<Seed> {
    let base = base_seed(weighted)?;
    let seed = base.checked_offset(offset).ok_or_else(|| {
        PricingError::invalid("offset", offset.0 as f64, "base seed plus offset overflows")
    })?;
    log::debug!("derived seed {seed} (base {base}, offset {})", offset.0);
    Ok(seed)
}

fn base_seed(weighted: &[(f64, f64)]) -> PricingResult<Seed> {
    let sum = weighted
        .iter()
        .map(|&(value, weight)| value * weight)
        .reduce(|acc, term| acc + term)
        .unwrap_or(0.0);
    if !sum.is_finite() || sum < 0.0 || sum >= u64::MAX as f64 {
        return Err(PricingError::invalid(
            "weighted_sum",
            sum,
            "seed weights must sum to a finite non-negative value",
        ));
    }
    Ok(Seed(sum.floor() as u64))
}

/// Call-local generator for one simulation. Each call builds its own, so
/// nothing random is shared between calls or threads.
pub fn seeded_rng(seed: Seed) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed.0)
}

impl SeedOffset {
    /// Fresh offset for a re-simulate request, uniform on `[OFFSET_MIN, OFFSET_MAX]`.
    pub fn redraw(rng: &mut impl Rng) -> Self {
        SeedOffset(rng.random_range(OFFSET_MIN..=OFFSET_MAX))
    }
}

/// Parameter sets whose control positions determine a seed.
pub trait SeedSource {
    /// `(value, weight)` pairs in summation order.
    fn seed_weights(&self) -> Vec<(f64, f64)>;

    fn base_seed(&self) -> PricingResult<Seed> {
        base_seed(&self.seed_weights())
    }

    fn seed(&self, offset: SeedOffset) -> PricingResult<Seed> {
        derive_seed(&self.seed_weights(), offset)
    }
}

impl SeedSource for RiskPoolParams {
    fn seed_weights(&self) -> Vec<(f64, f64)> {
        vec![(self.accident_probability, 10_000.0), (self.num_policyholders as f64, 1.0)]
    }
}

impl SeedSource for DriverComparisonParams {
    /// Cohort size is a display choice and does not move the seed.
    fn seed_weights(&self) -> Vec<(f64, f64)> {
        vec![
            (self.base_frequency, 10_000.0),
            (self.base_severity, 1.0),
            (self.freq_multiplier, 100.0),
            (self.severity_multiplier, 100.0),
        ]
    }
}

#[cfg(test)]
mod tests {
    use rand::RngCore;

    use super::*;
    use crate::config::DemoConfig;

    #[test]
    fn pooling_defaults_derive_600() {
        let params = DemoConfig::canonical().default_pool_params();
        assert_eq!(params.base_seed().unwrap(), Seed(600));
        assert_eq!(params.seed(SeedOffset(0)).unwrap(), Seed(600));
        assert_eq!(params.seed(SeedOffset(17)).unwrap(), Seed(617));
    }

    #[test]
    fn driver_defaults_derive_5800() {
        let params = DemoConfig::canonical().default_driver_params(200);
        assert_eq!(params.base_seed().unwrap(), Seed(5800));
    }

    #[test]
    fn cohort_size_does_not_move_the_seed() {
        let c = DemoConfig::canonical();
        assert_eq!(
            c.default_driver_params(80).base_seed().unwrap(),
            c.default_driver_params(200).base_seed().unwrap()
        );
    }

    #[test]
    fn weighted_sum_truncates() {
        // 0.04 × 10000 + 2500 + 2.5 × 100 + 1.4 × 100 = 3290
        let seed = derive_seed(
            &[(0.04, 10_000.0), (2500.0, 1.0), (2.5, 100.0), (1.4, 100.0)],
            SeedOffset(0),
        )
        .unwrap();
        assert_eq!(seed, Seed(3290));
        assert_eq!(derive_seed(&[(12.9, 1.0)], SeedOffset(0)).unwrap(), Seed(12));
    }

    #[test]
    fn distinct_offsets_give_distinct_seeds() {
        let params = DemoConfig::canonical().default_pool_params();
        let a = params.seed(SeedOffset(1)).unwrap();
        let b = params.seed(SeedOffset(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_weights_derive_the_offset() {
        assert_eq!(derive_seed(&[], SeedOffset(9)).unwrap(), Seed(9));
    }

    #[test]
    fn negative_or_nan_sum_is_rejected() {
        assert!(derive_seed(&[(-1.0, 1.0)], SeedOffset(0)).is_err());
        assert!(derive_seed(&[(f64::NAN, 1.0)], SeedOffset(0)).is_err());
    }

    #[test]
    fn offset_past_u64_range_is_rejected() {
        let near_max = [(1.844674407370955e19, 1.0)];
        let err = derive_seed(&near_max, SeedOffset(10_000)).unwrap_err();
        assert!(matches!(err, PricingError::InvalidParameter { name: "offset", .. }));
        assert!(derive_seed(&near_max, SeedOffset(0)).is_ok());
        assert_eq!(Seed(u64::MAX).checked_offset(SeedOffset(1)), None);
    }

    #[test]
    fn redraw_stays_in_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..1_000 {
            let SeedOffset(o) = SeedOffset::redraw(&mut rng);
            assert!((OFFSET_MIN..=OFFSET_MAX).contains(&o), "offset {o} out of range");
        }
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = seeded_rng(Seed(42));
        let mut b = seeded_rng(Seed(42));
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }
}
