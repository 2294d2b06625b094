use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// An input lies outside its documented domain.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },

    /// Inputs are individually valid but a required denominator is zero.
    #[error("degenerate computation of {quantity}: {reason}")]
    DegenerateComputation { quantity: &'static str, reason: &'static str },
}

impl PricingError {
    pub fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        PricingError::InvalidParameter { name, value, reason }
    }

    pub fn degenerate(quantity: &'static str, reason: &'static str) -> Self {
        PricingError::DegenerateComputation { quantity, reason }
    }
}

pub type PricingResult<T> = Result<T, PricingError>;

/// Fails unless `value` is finite and strictly inside `(0, 1)`.
pub(crate) fn require_open_unit(name: &'static str, value: f64) -> PricingResult<()> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(PricingError::invalid(name, value, "must lie strictly between 0 and 1"))
    }
}

/// Fails unless `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> PricingResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PricingError::invalid(name, value, "must be finite and > 0"))
    }
}

/// Fails unless `value` is finite and not negative.
pub(crate) fn require_non_negative(name: &'static str, value: f64) -> PricingResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PricingError::invalid(name, value, "must be finite and >= 0"))
    }
}
