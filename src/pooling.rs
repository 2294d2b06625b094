use rand::Rng;
use serde::Serialize;

use crate::error::{PricingError, PricingResult, require_open_unit, require_positive};
use crate::seed::seeded_rng;
use crate::types::Seed;

/// Claim paid when a policyholder has a loss, unless overridden.
pub const DEFAULT_CLAIM_AMOUNT: f64 = 20_000.0;

/// Two-sided 99% standard normal quantile.
const Z_99: f64 = 2.576;

/// Half-width of the horizontal jitter applied to displayed outcomes.
const DISPLAY_JITTER: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskPoolParams {
    /// Chance each policyholder has a loss, strictly inside (0, 1).
    pub accident_probability: f64,
    pub num_policyholders: usize,
    pub claim_amount: f64,
}

impl RiskPoolParams {
    pub fn new(accident_probability: f64, num_policyholders: usize) -> Self {
        RiskPoolParams { accident_probability, num_policyholders, claim_amount: DEFAULT_CLAIM_AMOUNT }
    }

    pub fn with_claim_amount(mut self, claim_amount: f64) -> Self {
        self.claim_amount = claim_amount;
        self
    }

    pub fn validate(&self) -> PricingResult<()> {
        require_open_unit("accident_probability", self.accident_probability)?;
        if self.num_policyholders == 0 {
            return Err(PricingError::invalid(
                "num_policyholders",
                0.0,
                "the pool needs at least one policyholder",
            ));
        }
        require_positive("claim_amount", self.claim_amount)
    }

    /// Net premium per policyholder: probability × claim amount.
    pub fn fair_premium(&self) -> f64 {
        self.accident_probability * self.claim_amount
    }

    /// Upper 99% bound on pooled losses, from the normal approximation to the
    /// binomial claim count with a continuity correction.
    pub fn loss_ceiling_99(&self) -> f64 {
        let n = self.num_policyholders as f64;
        let p = self.accident_probability;
        let max_claims = n * p + Z_99 * (n * p * (1.0 - p)).sqrt() + 0.5;
        max_claims * self.claim_amount
    }
}

/// Whether premiums covered the realised losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PoolOutcome {
    Surplus,
    Deficit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskPoolStats {
    pub num_with_loss: usize,
    pub percent_with_loss: f64,
    pub fair_premium: f64,
    pub total_losses: f64,
    pub pool_premium_total: f64,
    /// Actual / expected: total losses over total premium collected.
    pub pool_performance: f64,
    pub seed: Seed,
}

impl RiskPoolStats {
    /// Premium collected minus losses paid; negative on a deficit.
    pub fn surplus(&self) -> f64 {
        self.pool_premium_total - self.total_losses
    }

    pub fn outcome(&self) -> PoolOutcome {
        if self.pool_performance < 1.0 { PoolOutcome::Surplus } else { PoolOutcome::Deficit }
    }
}

/// Plot inputs for the pooling demo.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskPoolChart {
    /// Cost of each displayed policyholder without insurance, in index order.
    pub individual_costs: Vec<f64>,
    /// Horizontal offset per displayed point, uniform on (-0.2, 0.2).
    pub jitter: Vec<f64>,
    /// Premium every policyholder pays with insurance.
    pub premium: f64,
    pub claim_amount: f64,
    /// Y-axis ceiling for the insurer view; stable across re-draws.
    pub insurer_axis_max: f64,
}

/// Simulate one period of a pool of independent Bernoulli losses.
pub fn simulate_risk_pool(params: &RiskPoolParams, seed: Seed) -> PricingResult<RiskPoolStats> {
    params.validate()?;
    let mut rng = seeded_rng(seed);
    let losses = draw_losses(params, &mut rng);
    summarise(params, &losses, seed)
}

/// As [`simulate_risk_pool`], also returning chart data for the first
/// `display_limit` policyholders. Display jitter is drawn after the losses,
/// so the statistics match the plain call exactly.
pub fn simulate_risk_pool_chart(
    params: &RiskPoolParams,
    seed: Seed,
    display_limit: usize,
) -> PricingResult<(RiskPoolChart, RiskPoolStats)> {
    params.validate()?;
    let mut rng = seeded_rng(seed);
    let losses = draw_losses(params, &mut rng);
    let stats = summarise(params, &losses, seed)?;

    let shown = display_limit.min(params.num_policyholders);
    let individual_costs: Vec<f64> =
        losses[..shown].iter().map(|&loss| cost(params, loss)).collect();
    let jitter: Vec<f64> =
        (0..shown).map(|_| rng.random_range(-DISPLAY_JITTER..DISPLAY_JITTER)).collect();

    let insurer_axis_max = params.loss_ceiling_99().max(stats.total_losses) * 1.1;

    let chart = RiskPoolChart {
        individual_costs,
        jitter,
        premium: stats.fair_premium,
        claim_amount: params.claim_amount,
        insurer_axis_max,
    };
    Ok((chart, stats))
}

/// One uniform per policyholder, in index order; a loss iff the draw is
/// below the accident probability.
fn draw_losses(params: &RiskPoolParams, rng: &mut impl Rng) -> Vec<bool> {
    let uniforms: Vec<f64> = (0..params.num_policyholders).map(|_| rng.random::<f64>()).collect();
    uniforms.into_iter().map(|u| u < params.accident_probability).collect()
}

fn cost(params: &RiskPoolParams, loss: bool) -> f64 {
    if loss { params.claim_amount } else { 0.0 }
}

fn summarise(params: &RiskPoolParams, losses: &[bool], seed: Seed) -> PricingResult<RiskPoolStats> {
    let n = params.num_policyholders;
    let fair_premium = params.fair_premium();
    let pool_premium_total = fair_premium * n as f64;
    if pool_premium_total == 0.0 {
        return Err(PricingError::degenerate("pool_performance", "total premium collected is zero"));
    }

    let total_losses: f64 = losses.iter().map(|&loss| cost(params, loss)).sum();
    if !pool_premium_total.is_finite() || !total_losses.is_finite() {
        return Err(PricingError::degenerate("pool_performance", "pooled totals overflow"));
    }
    let num_with_loss = losses.iter().filter(|&&loss| loss).count();
    let stats = RiskPoolStats {
        num_with_loss,
        percent_with_loss: num_with_loss as f64 / n as f64 * 100.0,
        fair_premium,
        total_losses,
        pool_premium_total,
        pool_performance: total_losses / pool_premium_total,
        seed,
    };
    log::debug!(
        "risk pool seed={seed} n={n} p={}: {num_with_loss} losses, A/E {:.3}",
        params.accident_probability,
        stats.pool_performance
    );
    Ok(stats)
}
