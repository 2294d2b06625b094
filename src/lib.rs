//! Seeded Monte Carlo demonstrations of insurance pricing: risk pooling,
//! driver-risk segmentation and premium loading.
//!
//! Every entry point is a pure function of its parameters and a [`Seed`];
//! each call builds its own generator, so calls can run concurrently.

pub mod analysis;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pooling;
pub mod premium;
pub mod seed;
pub mod types;

pub use drivers::{DriverComparisonParams, DriverComparisonStats, simulate_driver_comparison};
pub use error::{PricingError, PricingResult};
pub use pooling::{RiskPoolParams, RiskPoolStats, simulate_risk_pool};
pub use premium::{LoadingRatios, PremiumComponents, calculate_premium};
pub use seed::{SeedSource, derive_seed};
pub use types::{Seed, SeedOffset};
