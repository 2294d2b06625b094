use serde::Serialize;

use crate::drivers::DriverComparisonStats;
use crate::error::{PricingError, PricingResult, require_non_negative};

/// Fractions of the final premium set aside for expenses and risk margin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadingRatios {
    pub expense_ratio: f64,
    pub risk_margin_ratio: f64,
}

impl Default for LoadingRatios {
    fn default() -> Self {
        LoadingRatios { expense_ratio: 0.25, risk_margin_ratio: 0.05 }
    }
}

impl LoadingRatios {
    /// Each ratio in `[0, 1)` and their sum below 1.
    pub fn validate(&self) -> PricingResult<()> {
        for (name, value) in [
            ("expense_ratio", self.expense_ratio),
            ("risk_margin_ratio", self.risk_margin_ratio),
        ] {
            if !(value.is_finite() && (0.0..1.0).contains(&value)) {
                return Err(PricingError::invalid(name, value, "must lie in [0, 1)"));
            }
        }
        let total = self.expense_ratio + self.risk_margin_ratio;
        if total >= 1.0 {
            return Err(PricingError::invalid(
                "expense_ratio + risk_margin_ratio",
                total,
                "loadings must leave part of the premium for losses",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumComponents {
    pub expected_loss: f64,
    pub expenses: f64,
    pub risk_margin: f64,
    pub premium: f64,
    /// Premium over expected loss.
    pub loading_factor: f64,
}

/// Components as percentages of the premium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PremiumShares {
    pub expected_loss: f64,
    pub expenses: f64,
    pub risk_margin: f64,
}

impl PremiumComponents {
    pub fn shares(&self) -> PremiumShares {
        let pct = |value: f64| value / self.premium * 100.0;
        PremiumShares {
            expected_loss: pct(self.expected_loss),
            expenses: pct(self.expenses),
            risk_margin: pct(self.risk_margin),
        }
    }
}

/// Gross up `frequency × severity` so that expenses and risk margin are the
/// given fractions of the result:
/// `premium = expected_loss / (1 − expense_ratio − risk_margin_ratio)`.
pub fn calculate_premium(
    frequency: f64,
    severity: f64,
    ratios: &LoadingRatios,
) -> PricingResult<PremiumComponents> {
    require_non_negative("frequency", frequency)?;
    require_non_negative("severity", severity)?;
    ratios.validate()?;

    let expected_loss = frequency * severity;
    if expected_loss == 0.0 {
        return Err(PricingError::degenerate("loading_factor", "expected loss is zero"));
    }
    let premium = expected_loss / (1.0 - ratios.expense_ratio - ratios.risk_margin_ratio);
    Ok(PremiumComponents {
        expected_loss,
        expenses: premium * ratios.expense_ratio,
        risk_margin: premium * ratios.risk_margin_ratio,
        premium,
        loading_factor: premium / expected_loss,
    })
}

/// Premiums for both cohorts of a driver comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumComparison {
    pub first: PremiumComponents,
    pub second: PremiumComponents,
    /// Second cohort's premium over the first's.
    pub premium_ratio: f64,
}

/// Price each cohort from its simulated mean frequency and severity.
pub fn compare_premiums(
    stats: &DriverComparisonStats,
    ratios: &LoadingRatios,
) -> PricingResult<PremiumComparison> {
    let first = calculate_premium(stats.first.mean_frequency, stats.first.mean_severity, ratios)?;
    let second = calculate_premium(stats.second.mean_frequency, stats.second.mean_severity, ratios)?;
    let premium_ratio = second.premium / first.premium;
    Ok(PremiumComparison { first, second, premium_ratio })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{DriverComparisonParams, simulate_driver_comparison};
    use crate::types::Seed;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn worked_example() {
        let c = calculate_premium(0.05, 8000.0, &LoadingRatios::default()).unwrap();
        assert!(close(c.expected_loss, 400.0, 1e-9));
        assert!(close(c.premium, 571.43, 0.005), "premium {}", c.premium);
        assert!(close(c.expenses, 142.86, 0.005), "expenses {}", c.expenses);
        assert!(close(c.risk_margin, 28.57, 0.005), "risk margin {}", c.risk_margin);
        assert!(close(c.loading_factor, 1.0 / 0.7, 1e-12));
    }

    #[test]
    fn premium_is_exact_gross_up() {
        for (f, s, e, r) in [(0.05, 8000.0, 0.25, 0.05), (0.12, 3500.0, 0.1, 0.0), (0.9, 1.0, 0.0, 0.4)] {
            let ratios = LoadingRatios { expense_ratio: e, risk_margin_ratio: r };
            let c = calculate_premium(f, s, &ratios).unwrap();
            assert_eq!(c.premium, f * s / (1.0 - e - r));
        }
    }

    #[test]
    fn components_add_up_to_premium() {
        let c = calculate_premium(0.09, 10_000.0, &LoadingRatios::default()).unwrap();
        assert!(close(c.expected_loss + c.expenses + c.risk_margin, c.premium, 1e-9));
        let shares = c.shares();
        assert!(close(shares.expected_loss, 70.0, 1e-9));
        assert!(close(shares.expenses, 25.0, 1e-9));
        assert!(close(shares.risk_margin, 5.0, 1e-9));
    }

    #[test]
    fn zero_loadings_leave_premium_at_expected_loss() {
        let ratios = LoadingRatios { expense_ratio: 0.0, risk_margin_ratio: 0.0 };
        let c = calculate_premium(0.1, 1000.0, &ratios).unwrap();
        assert_eq!(c.premium, c.expected_loss);
        assert_eq!(c.loading_factor, 1.0);
    }

    #[test]
    fn zero_expected_loss_is_degenerate() {
        for (f, s) in [(0.0, 8000.0), (0.05, 0.0)] {
            let err = calculate_premium(f, s, &LoadingRatios::default()).unwrap_err();
            assert!(matches!(err, PricingError::DegenerateComputation { quantity: "loading_factor", .. }));
        }
    }

    #[test]
    fn bad_ratios_are_invalid() {
        for (e, r) in [(1.0, 0.0), (0.0, 1.0), (0.6, 0.4), (0.7, 0.5), (-0.1, 0.0), (f64::NAN, 0.0)] {
            let ratios = LoadingRatios { expense_ratio: e, risk_margin_ratio: r };
            assert!(
                matches!(calculate_premium(0.05, 8000.0, &ratios), Err(PricingError::InvalidParameter { .. })),
                "({e}, {r}) accepted"
            );
        }
    }

    #[test]
    fn negative_inputs_are_invalid() {
        assert!(calculate_premium(-0.01, 8000.0, &LoadingRatios::default()).is_err());
        assert!(calculate_premium(0.05, f64::INFINITY, &LoadingRatios::default()).is_err());
    }

    #[test]
    fn compares_simulated_cohorts() {
        let params = DriverComparisonParams {
            base_frequency: 0.03,
            base_severity: 5000.0,
            freq_multiplier: 3.0,
            severity_multiplier: 2.0,
            cohort_size: 200,
        };
        let stats = simulate_driver_comparison(&params, Seed(5800)).unwrap();
        let cmp = compare_premiums(&stats, &LoadingRatios::default()).unwrap();

        let direct =
            calculate_premium(stats.first.mean_frequency, stats.first.mean_severity, &LoadingRatios::default())
                .unwrap();
        assert_eq!(cmp.first, direct);
        assert!(close(cmp.premium_ratio, cmp.second.premium / cmp.first.premium, 1e-12));
        // Same loadings on both sides, so the premium ratio is the per-driver loss ratio.
        let per_driver = stats.second.expected_loss_per_driver() / stats.first.expected_loss_per_driver();
        assert!(close(cmp.premium_ratio, per_driver, 1e-9));
    }
}
