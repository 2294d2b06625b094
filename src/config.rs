use serde::Serialize;

use crate::drivers::DriverComparisonParams;
use crate::error::{PricingError, PricingResult};
use crate::pooling::RiskPoolParams;
use crate::premium::LoadingRatios;

/// Bounds, default and step of one user-facing control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
}

impl SliderRange {
    pub const fn new(min: f64, max: f64, default: f64, step: f64) -> Self {
        SliderRange { min, max, default, step }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Reject `value` if it falls outside the slider bounds. Never clamps.
    pub fn check(&self, name: &'static str, value: f64) -> PricingResult<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(PricingError::invalid(name, value, "outside the control's range"))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PoolingControls {
    pub accident_probability: SliderRange,
    pub num_policyholders: SliderRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriverControls {
    pub base_frequency: SliderRange,
    pub base_severity: SliderRange,
    pub freq_multiplier: SliderRange,
    pub severity_multiplier: SliderRange,
}

/// Presentation-owned constants: control ranges, display sizes and the
/// fixed loading ratios. Nothing in the simulators reads this directly.
#[derive(Debug, Clone, Serialize)]
pub struct DemoConfig {
    pub pooling: PoolingControls,
    pub drivers: DriverControls,
    /// Claim paid to every policyholder with a loss in the pooling demo.
    pub claim_amount: f64,
    pub compact_cohort_size: usize,
    pub full_cohort_size: usize,
    /// Individual outcomes shown on the pooling chart.
    pub compact_display_limit: usize,
    pub full_display_limit: usize,
    pub loading: LoadingRatios,
}

impl DemoConfig {
    pub fn canonical() -> Self {
        DemoConfig {
            pooling: PoolingControls {
                accident_probability: SliderRange::new(0.01, 0.25, 0.05, 0.01),
                num_policyholders: SliderRange::new(10.0, 1000.0, 100.0, 10.0),
            },
            drivers: DriverControls {
                base_frequency: SliderRange::new(0.01, 0.10, 0.03, 0.01),
                base_severity: SliderRange::new(2000.0, 10000.0, 5000.0, 500.0),
                freq_multiplier: SliderRange::new(1.5, 5.0, 3.0, 0.5),
                severity_multiplier: SliderRange::new(1.2, 3.0, 2.0, 0.2),
            },
            claim_amount: 20_000.0,
            compact_cohort_size: 80,
            full_cohort_size: 200,
            compact_display_limit: 25,
            full_display_limit: 50,
            loading: LoadingRatios::default(),
        }
    }

    pub fn cohort_size(&self, compact: bool) -> usize {
        if compact { self.compact_cohort_size } else { self.full_cohort_size }
    }

    pub fn display_limit(&self, compact: bool) -> usize {
        if compact { self.compact_display_limit } else { self.full_display_limit }
    }

    /// Pooling parameters at every control's default position.
    pub fn default_pool_params(&self) -> RiskPoolParams {
        RiskPoolParams {
            accident_probability: self.pooling.accident_probability.default,
            num_policyholders: self.pooling.num_policyholders.default as usize,
            claim_amount: self.claim_amount,
        }
    }

    /// Driver parameters at every control's default position.
    pub fn default_driver_params(&self, cohort_size: usize) -> DriverComparisonParams {
        DriverComparisonParams {
            base_frequency: self.drivers.base_frequency.default,
            base_severity: self.drivers.base_severity.default,
            freq_multiplier: self.drivers.freq_multiplier.default,
            severity_multiplier: self.drivers.severity_multiplier.default,
            cohort_size,
        }
    }

    /// Check pooling parameters against the control ranges.
    pub fn check_pool_params(&self, params: &RiskPoolParams) -> PricingResult<()> {
        self.pooling
            .accident_probability
            .check("accident_probability", params.accident_probability)?;
        self.pooling
            .num_policyholders
            .check("num_policyholders", params.num_policyholders as f64)
    }

    /// Check driver parameters against the control ranges.
    pub fn check_driver_params(&self, params: &DriverComparisonParams) -> PricingResult<()> {
        let d = &self.drivers;
        d.base_frequency.check("base_frequency", params.base_frequency)?;
        d.base_severity.check("base_severity", params.base_severity)?;
        d.freq_multiplier.check("freq_multiplier", params.freq_multiplier)?;
        d.severity_multiplier.check("severity_multiplier", params.severity_multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_lie_inside_their_ranges() {
        let c = DemoConfig::canonical();
        for r in [
            c.pooling.accident_probability,
            c.pooling.num_policyholders,
            c.drivers.base_frequency,
            c.drivers.base_severity,
            c.drivers.freq_multiplier,
            c.drivers.severity_multiplier,
        ] {
            assert!(r.contains(r.default), "default {} outside [{}, {}]", r.default, r.min, r.max);
            assert!(r.step > 0.0);
        }
    }

    #[test]
    fn default_params_pass_range_checks() {
        let c = DemoConfig::canonical();
        assert!(c.check_pool_params(&c.default_pool_params()).is_ok());
        assert!(c.check_driver_params(&c.default_driver_params(c.full_cohort_size)).is_ok());
    }

    #[test]
    fn out_of_range_is_rejected_not_clamped() {
        let c = DemoConfig::canonical();
        let mut p = c.default_pool_params();
        p.accident_probability = 0.30;
        let err = c.check_pool_params(&p).unwrap_err();
        assert_eq!(
            err,
            PricingError::invalid("accident_probability", 0.30, "outside the control's range")
        );

        let mut d = c.default_driver_params(80);
        d.freq_multiplier = 1.0;
        assert!(c.check_driver_params(&d).is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        let r = SliderRange::new(0.01, 0.25, 0.05, 0.01);
        assert!(r.contains(0.01));
        assert!(r.contains(0.25));
        assert!(!r.contains(f64::NAN));
    }

    #[test]
    fn compact_flag_selects_sizes() {
        let c = DemoConfig::canonical();
        assert_eq!(c.cohort_size(true), 80);
        assert_eq!(c.cohort_size(false), 200);
        assert_eq!(c.display_limit(true), 25);
        assert_eq!(c.display_limit(false), 50);
    }
}
