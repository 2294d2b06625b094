use rand::Rng;
use rand_distr::{Distribution, LogNormal, Normal};
use serde::Serialize;

use crate::error::{PricingError, PricingResult, require_positive};
use crate::seed::seeded_rng;
use crate::types::{CohortId, Seed};

/// No driver is ever simulated with a frequency below this.
pub const FREQUENCY_FLOOR: f64 = 0.001;
/// Standard deviation of a driver's frequency as a fraction of the cohort mean.
pub const FREQUENCY_CV: f64 = 0.3;
/// LogNormal shape for the first cohort.
pub const FIRST_SEVERITY_SIGMA: f64 = 0.4;
/// LogNormal shape for the second cohort; fatter right tail.
pub const SECOND_SEVERITY_SIGMA: f64 = 0.6;
/// Standard deviation of the horizontal scatter jitter.
const SCATTER_JITTER_SD: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriverComparisonParams {
    pub base_frequency: f64,
    pub base_severity: f64,
    pub freq_multiplier: f64,
    pub severity_multiplier: f64,
    /// Drivers simulated per cohort.
    pub cohort_size: usize,
}

impl DriverComparisonParams {
    /// Multipliers may be at or below 1; the cohorts then tie or invert.
    pub fn validate(&self) -> PricingResult<()> {
        require_positive("base_frequency", self.base_frequency)?;
        require_positive("base_severity", self.base_severity)?;
        require_positive("freq_multiplier", self.freq_multiplier)?;
        require_positive("severity_multiplier", self.severity_multiplier)?;
        if self.cohort_size < 2 {
            return Err(PricingError::invalid(
                "cohort_size",
                self.cohort_size as f64,
                "a cohort needs at least two drivers",
            ));
        }
        let second = self.cohort(CohortId::Second);
        require_positive("second_cohort_frequency", second.frequency)?;
        require_positive("second_cohort_severity", second.severity)
    }

    pub fn cohort(&self, id: CohortId) -> CohortSpec {
        match id {
            CohortId::First => CohortSpec {
                id,
                frequency: self.base_frequency,
                severity: self.base_severity,
                sigma: FIRST_SEVERITY_SIGMA,
            },
            CohortId::Second => CohortSpec {
                id,
                frequency: self.base_frequency * self.freq_multiplier,
                severity: self.base_severity * self.severity_multiplier,
                sigma: SECOND_SEVERITY_SIGMA,
            },
        }
    }
}

/// Distribution targets for one cohort.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CohortSpec {
    pub id: CohortId,
    /// Mean accident frequency.
    pub frequency: f64,
    /// Mean claim severity.
    pub severity: f64,
    /// LogNormal shape parameter.
    pub sigma: f64,
}

impl CohortSpec {
    /// LogNormal location putting the distribution mean at `severity`.
    pub fn log_location(&self) -> f64 {
        self.severity.ln() - 0.5 * self.sigma * self.sigma
    }

    /// Median severity, `severity × exp(-σ²/2)`.
    pub fn median_severity(&self) -> f64 {
        self.log_location().exp()
    }

    fn frequency_distribution(&self) -> PricingResult<Normal<f64>> {
        Normal::new(self.frequency, self.frequency * FREQUENCY_CV).map_err(|_| {
            PricingError::invalid("frequency", self.frequency, "cannot parameterise a Normal")
        })
    }

    fn severity_distribution(&self) -> PricingResult<LogNormal<f64>> {
        LogNormal::new(self.log_location(), self.sigma).map_err(|_| {
            PricingError::invalid("severity", self.severity, "cannot parameterise a LogNormal")
        })
    }

    fn draw_frequencies(&self, n: usize, rng: &mut impl Rng) -> PricingResult<Vec<f64>> {
        let dist = self.frequency_distribution()?;
        Ok((0..n).map(|_| dist.sample(rng).max(FREQUENCY_FLOOR)).collect())
    }

    fn draw_severities(&self, n: usize, rng: &mut impl Rng) -> PricingResult<Vec<f64>> {
        let dist = self.severity_distribution()?;
        Ok((0..n).map(|_| dist.sample(rng)).collect())
    }
}

/// Simulated drivers of one cohort. Lives only for the duration of a call.
struct Cohort {
    id: CohortId,
    frequencies: Vec<f64>,
    severities: Vec<f64>,
}

impl Cohort {
    fn stats(&self) -> CohortStats {
        let size = self.frequencies.len();
        let mean_frequency = mean(&self.frequencies);
        let mean_severity = mean(&self.severities);
        CohortStats {
            id: self.id,
            size,
            mean_frequency,
            mean_severity,
            total_expected_loss: size as f64 * mean_frequency * mean_severity,
        }
    }

    fn points(&self, jitter: Vec<f64>) -> Vec<DriverPoint> {
        self.frequencies
            .iter()
            .zip(&self.severities)
            .zip(jitter)
            .map(|((&frequency, &severity), jitter)| DriverPoint { frequency, severity, jitter })
            .collect()
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortStats {
    pub id: CohortId,
    pub size: usize,
    pub mean_frequency: f64,
    pub mean_severity: f64,
    /// `size × mean_frequency × mean_severity`.
    pub total_expected_loss: f64,
}

impl CohortStats {
    fn check_finite(&self) -> PricingResult<()> {
        let fields = [
            ("mean_frequency", self.mean_frequency),
            ("mean_severity", self.mean_severity),
            ("total_expected_loss", self.total_expected_loss),
        ];
        match fields.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((quantity, _)) => Err(PricingError::degenerate(quantity, "cohort aggregate overflows")),
            None => Ok(()),
        }
    }

    /// Expected annual cost of an average driver in the cohort.
    pub fn expected_loss_per_driver(&self) -> f64 {
        self.mean_frequency * self.mean_severity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverComparisonStats {
    pub first: CohortStats,
    pub second: CohortStats,
    /// Second cohort's total expected loss over the first's.
    pub loss_multiplier: f64,
    pub freq_multiplier: f64,
    pub severity_multiplier: f64,
    pub seed: Seed,
}

/// One simulated driver on the scatter plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriverPoint {
    pub frequency: f64,
    pub severity: f64,
    /// Horizontal display offset; plot at `frequency + jitter`.
    pub jitter: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverComparisonChart {
    pub first: Vec<DriverPoint>,
    pub second: Vec<DriverPoint>,
    /// `(mean_frequency, mean_severity)` of the first cohort.
    pub first_centroid: (f64, f64),
    pub second_centroid: (f64, f64),
}

/// Simulate two cohorts of drivers and compare their expected losses.
///
/// Each driver gets an accident frequency from a Normal with a 30%
/// coefficient of variation (floored at 0.1%) and a claim severity from a
/// LogNormal whose mean is the cohort's target severity. The second cohort
/// scales both targets by the multipliers and uses a wider severity shape.
pub fn simulate_driver_comparison(
    params: &DriverComparisonParams,
    seed: Seed,
) -> PricingResult<DriverComparisonStats> {
    params.validate()?;
    let mut rng = seeded_rng(seed);
    let (first, second) = draw_cohorts(params, &mut rng)?;
    compare(&first, &second, seed)
}

/// As [`simulate_driver_comparison`], also returning every driver as a
/// scatter point. Jitter is drawn after all statistical draws.
pub fn simulate_driver_comparison_chart(
    params: &DriverComparisonParams,
    seed: Seed,
) -> PricingResult<(DriverComparisonChart, DriverComparisonStats)> {
    params.validate()?;
    let mut rng = seeded_rng(seed);
    let (first, second) = draw_cohorts(params, &mut rng)?;
    let stats = compare(&first, &second, seed)?;

    let jitter = Normal::new(0.0, SCATTER_JITTER_SD)
        .map_err(|_| PricingError::invalid("jitter_sd", SCATTER_JITTER_SD, "cannot parameterise a Normal"))?;
    let n = params.cohort_size;
    let first_jitter: Vec<f64> = (0..n).map(|_| jitter.sample(&mut rng)).collect();
    let second_jitter: Vec<f64> = (0..n).map(|_| jitter.sample(&mut rng)).collect();

    let chart = DriverComparisonChart {
        first: first.points(first_jitter),
        second: second.points(second_jitter),
        first_centroid: (stats.first.mean_frequency, stats.first.mean_severity),
        second_centroid: (stats.second.mean_frequency, stats.second.mean_severity),
    };
    Ok((chart, stats))
}

/// Draw order is fixed: first-cohort frequencies, second-cohort frequencies,
/// first-cohort severities, second-cohort severities. Changing it changes
/// every output for a seed.
fn draw_cohorts(params: &DriverComparisonParams, rng: &mut impl Rng) -> PricingResult<(Cohort, Cohort)> {
    let n = params.cohort_size;
    let first = params.cohort(CohortId::First);
    let second = params.cohort(CohortId::Second);

    let first_frequencies = first.draw_frequencies(n, rng)?;
    let second_frequencies = second.draw_frequencies(n, rng)?;
    let first_severities = first.draw_severities(n, rng)?;
    let second_severities = second.draw_severities(n, rng)?;

    Ok((
        Cohort { id: CohortId::First, frequencies: first_frequencies, severities: first_severities },
        Cohort { id: CohortId::Second, frequencies: second_frequencies, severities: second_severities },
    ))
}

fn compare(first: &Cohort, second: &Cohort, seed: Seed) -> PricingResult<DriverComparisonStats> {
    let first = first.stats();
    let second = second.stats();
    first.check_finite()?;
    second.check_finite()?;
    let ratio = |quantity: &'static str, num: f64, den: f64| {
        if den == 0.0 {
            return Err(PricingError::degenerate(quantity, "first cohort value is zero"));
        }
        let value = num / den;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(PricingError::degenerate(quantity, "ratio is not finite"))
        }
    };
    let loss_multiplier = ratio("loss_multiplier", second.total_expected_loss, first.total_expected_loss)?;
    let freq_multiplier = ratio("freq_multiplier", second.mean_frequency, first.mean_frequency)?;
    let severity_multiplier =
        ratio("severity_multiplier", second.mean_severity, first.mean_severity)?;

    log::debug!(
        "driver comparison seed={seed} n={}: freq x{freq_multiplier:.2}, severity x{severity_multiplier:.2}, loss x{loss_multiplier:.2}",
        first.size
    );
    Ok(DriverComparisonStats { first, second, loss_multiplier, freq_multiplier, severity_multiplier, seed })
}
