use super::error::ScoringError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open interval `[lower, upper)` bound to a bucket label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryInterval<L> {
    pub lower: f64,
    pub upper: f64,
    pub label: L,
}

impl<L> CategoryInterval<L> {
    /// An interval open to +infinity also holds infinity itself.
    pub fn contains(&self, value: f64) -> bool {
        let open_ended = self.upper == f64::INFINITY && value == f64::INFINITY;
        self.lower <= value && (value < self.upper || open_ended)
    }
}

/// Ordered intervals covering `[0, inf)` without gaps or overlaps.
///
/// Values outside every interval (negative or NaN input) resolve to the
/// fallback label so bucketing stays total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTable<L> {
    intervals: Vec<CategoryInterval<L>>,
    fallback: L,
}

impl<L: Copy> CategoryTable<L> {
    pub fn new(intervals: Vec<(f64, f64, L)>, fallback: L) -> Result<Self, ScoringError> {
        let intervals: Vec<CategoryInterval<L>> = intervals
            .into_iter()
            .map(|(lower, upper, label)| CategoryInterval {
                lower,
                upper,
                label,
            })
            .collect();
        validate(&intervals)?;
        Ok(Self {
            intervals,
            fallback,
        })
    }

    /// Label of the first interval containing `value`, else the fallback.
    pub fn classify(&self, value: f64) -> L {
        self.intervals
            .iter()
            .find(|interval| interval.contains(value))
            .map(|interval| interval.label)
            .unwrap_or(self.fallback)
    }

    pub fn intervals(&self) -> &[CategoryInterval<L>] {
        &self.intervals
    }

    pub fn fallback(&self) -> L {
        self.fallback
    }
}

fn validate<L>(intervals: &[CategoryInterval<L>]) -> Result<(), ScoringError> {
    let first = intervals.first().ok_or(ScoringError::EmptyCategoryTable)?;
    if first.lower != 0.0 {
        return Err(ScoringError::CategoryNotAtZero(first.lower));
    }

    for interval in intervals {
        // `!(a < b)` also rejects NaN bounds.
        if !(interval.lower < interval.upper) {
            return Err(ScoringError::InvalidInterval {
                lower: interval.lower,
                upper: interval.upper,
            });
        }
    }

    for pair in intervals.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        if current.upper < next.lower {
            return Err(ScoringError::CategoryGap {
                upper: current.upper,
                next_lower: next.lower,
            });
        }
        if current.upper > next.lower {
            return Err(ScoringError::CategoryOverlap {
                upper: current.upper,
                next_lower: next.lower,
            });
        }
    }

    let last = intervals
        .last()
        .ok_or(ScoringError::EmptyCategoryTable)?;
    if last.upper != f64::INFINITY {
        return Err(ScoringError::CategoryNotOpenEnded(last.upper));
    }

    Ok(())
}

/// Technician load relative to daily capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadBucket {
    Low,
    Medium,
    High,
    Overloaded,
}

impl WorkloadBucket {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Overloaded => "overloaded",
        }
    }

    /// 0.8 is the capacity saturation point observed in dispatch history.
    pub fn table() -> CategoryTable<Self> {
        CategoryTable {
            intervals: vec![
                interval(0.0, 0.5, Self::Low),
                interval(0.5, 0.8, Self::Medium),
                interval(0.8, 1.0, Self::High),
                interval(1.0, f64::INFINITY, Self::Overloaded),
            ],
            fallback: Self::Medium,
        }
    }
}

impl fmt::Display for WorkloadBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Travel distance between technician and customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBucket {
    VeryClose,
    Close,
    Medium,
    Far,
    VeryFar,
}

impl DistanceBucket {
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryClose => "very_close",
            Self::Close => "close",
            Self::Medium => "medium",
            Self::Far => "far",
            Self::VeryFar => "very_far",
        }
    }

    /// 10 km is the short-hop threshold observed in dispatch history.
    ///
    /// Negative or NaN distances come from broken coordinates and score as very far.
    pub fn table() -> CategoryTable<Self> {
        CategoryTable {
            intervals: vec![
                interval(0.0, 10.0, Self::VeryClose),
                interval(10.0, 50.0, Self::Close),
                interval(50.0, 100.0, Self::Medium),
                interval(100.0, 500.0, Self::Far),
                interval(500.0, f64::INFINITY, Self::VeryFar),
            ],
            fallback: Self::VeryFar,
        }
    }
}

impl fmt::Display for DistanceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn interval<L>(lower: f64, upper: f64, label: L) -> CategoryInterval<L> {
    CategoryInterval {
        lower,
        upper,
        label,
    }
}
