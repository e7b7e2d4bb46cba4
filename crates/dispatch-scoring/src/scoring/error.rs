/// Configuration faults in the scoring engine.
///
/// These never come from dispatch data: every data value has a total mapping.
/// They are raised when a caller supplies a blend weight, a probability, or a
/// category table that cannot be right.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("blend weight {0} must lie within [0, 1]")]
    InvalidBlendWeight(f64),
    #[error("probability {0} must lie within [0, 1]")]
    ProbabilityOutOfRange(f64),
    #[error("category table has no intervals")]
    EmptyCategoryTable,
    #[error("category table must start at 0, first interval starts at {0}")]
    CategoryNotAtZero(f64),
    #[error("category interval [{lower}, {upper}) is empty or not a number")]
    InvalidInterval { lower: f64, upper: f64 },
    #[error("category table leaves a gap between {upper} and {next_lower}")]
    CategoryGap { upper: f64, next_lower: f64 },
    #[error("category intervals overlap: {next_lower} starts before {upper}")]
    CategoryOverlap { upper: f64, next_lower: f64 },
    #[error("last category interval must extend to infinity, ends at {0}")]
    CategoryNotOpenEnded(f64),
}
