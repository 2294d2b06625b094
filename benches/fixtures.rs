use pricelab::config::DemoConfig;
use pricelab::drivers::DriverComparisonParams;
use pricelab::pooling::RiskPoolParams;

pub struct Scenario {
    pub name: &'static str,
    pub accident_probability: f64,
    pub num_policyholders: usize,
    pub cohort_size: usize,
}

/// Compact display at default control positions.
pub const SMALL: Scenario = Scenario {
    name: "small",
    accident_probability: 0.05,
    num_policyholders: 100,
    cohort_size: 80,
};

/// Full display with the largest pool the controls allow.
pub const MEDIUM: Scenario = Scenario {
    name: "medium",
    accident_probability: 0.05,
    num_policyholders: 1_000,
    cohort_size: 200,
};

/// Well beyond the controls; convergence-study territory.
pub const LARGE: Scenario = Scenario {
    name: "large",
    accident_probability: 0.05,
    num_policyholders: 100_000,
    cohort_size: 20_000,
};

pub fn pool_params(scenario: &Scenario) -> RiskPoolParams {
    RiskPoolParams::new(scenario.accident_probability, scenario.num_policyholders)
}

pub fn driver_params(scenario: &Scenario) -> DriverComparisonParams {
    DemoConfig::canonical().default_driver_params(scenario.cohort_size)
}
