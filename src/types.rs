use serde::Serialize;

/// Generator seed. Identical seeds reproduce identical populations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Seed(pub u64);

/// Caller-owned offset added to a base seed. Zero until the user asks for a
/// fresh draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SeedOffset(pub u64);

/// Which of the two driver cohorts a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CohortId {
    /// Base frequency and severity.
    First,
    /// Base values scaled by the multipliers.
    Second,
}

impl Seed {
    /// `None` when the sum leaves the `u64` range.
    pub fn checked_offset(self, offset: SeedOffset) -> Option<Self> {
        self.0.checked_add(offset.0).map(Seed)
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for CohortId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CohortId::First => write!(f, "first cohort"),
            CohortId::Second => write!(f, "second cohort"),
        }
    }
}
