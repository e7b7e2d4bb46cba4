use super::probability::Probability;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DISTANCE_MAX_POINTS: f64 = 30.0;
/// Distance at and beyond which the distance component is exactly zero.
pub const DISTANCE_ZERO_KM: f64 = 250.0;
/// Exponential decay per km, negligible by `DISTANCE_ZERO_KM`.
pub const DISTANCE_DECAY_PER_KM: f64 = 0.02;

pub const DURATION_BASE_POINTS: f64 = 30.0;
pub const EARLY_BONUS_MAX_POINTS: f64 = 6.0;
/// Finishing this many minutes early earns the full bonus.
pub const EARLY_BONUS_FULL_MINUTES: f64 = 30.0;
/// Finishing this many minutes late erases the duration component.
pub const LATE_ZERO_MINUTES: f64 = 90.0;

pub const PRODUCTIVE_POINTS: f64 = 25.0;
pub const FIRST_TIME_FIX_POINTS: f64 = 15.0;

/// Component maxima sum to 106, so the cap is applied to the total.
pub const GRADE_CAP: f64 = 100.0;

/// How the productive and first-time-fix components are fed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutcomeSignals {
    /// Recorded outcome of a completed dispatch.
    Observed { productive: bool, first_time_fix: bool },
    /// A single success probability stands in for both signals.
    Estimated { shared_probability: Probability },
}

impl OutcomeSignals {
    fn productive_signal(self) -> f64 {
        match self {
            Self::Observed { productive, .. } => indicator(productive),
            Self::Estimated { shared_probability } => shared_probability.value(),
        }
    }

    fn first_time_fix_signal(self) -> f64 {
        match self {
            Self::Observed { first_time_fix, .. } => indicator(first_time_fix),
            Self::Estimated { shared_probability } => shared_probability.value(),
        }
    }
}

fn indicator(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Distance component: `30 * exp(-0.02 * km)`, exactly 0 from 250 km on.
pub fn distance_score(distance_km: f64) -> f64 {
    if distance_km.is_nan() || distance_km >= DISTANCE_ZERO_KM {
        return 0.0;
    }
    (DISTANCE_MAX_POINTS * (-DISTANCE_DECAY_PER_KM * distance_km).exp())
        .clamp(0.0, DISTANCE_MAX_POINTS)
}

/// Duration component: 30 on time, up to 36 when early, down to 0 at 90 minutes late.
pub fn duration_score(overrun_minutes: f64) -> f64 {
    if overrun_minutes <= 0.0 {
        let bonus = (overrun_minutes.abs() / EARLY_BONUS_FULL_MINUTES * EARLY_BONUS_MAX_POINTS)
            .min(EARLY_BONUS_MAX_POINTS);
        DURATION_BASE_POINTS + bonus
    } else if overrun_minutes > 0.0 {
        let penalty = overrun_minutes * DURATION_BASE_POINTS / LATE_ZERO_MINUTES;
        (DURATION_BASE_POINTS - penalty).max(0.0)
    } else {
        // NaN overrun
        0.0
    }
}

/// Composite 0-100 dispatch grade.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grade(f64);

impl Grade {
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn letter(self) -> LetterGrade {
        LetterGrade::for_score(self.0)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}/100", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub const ALL: [LetterGrade; 5] = [Self::A, Self::B, Self::C, Self::D, Self::F];

    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::A
        } else if score >= 80.0 {
            Self::B
        } else if score >= 70.0 {
            Self::C
        } else if score >= 60.0 {
            Self::D
        } else {
            Self::F
        }
    }

    pub fn band(self) -> &'static str {
        match self {
            Self::A => "90-100",
            Self::B => "80-89",
            Self::C => "70-79",
            Self::D => "60-69",
            Self::F => "0-59",
        }
    }
}

/// The four component scores and their capped total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBreakdown {
    pub distance: f64,
    pub duration: f64,
    pub productive: f64,
    pub first_time_fix: f64,
    pub grade: Grade,
}

/// Stateless grade computation over distance, overrun, and outcome signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradeCalculator;

impl GradeCalculator {
    pub fn breakdown(
        &self,
        distance_km: f64,
        overrun_minutes: f64,
        signals: OutcomeSignals,
    ) -> GradeBreakdown {
        let distance = distance_score(distance_km);
        let duration = duration_score(overrun_minutes);
        let productive = signals.productive_signal() * PRODUCTIVE_POINTS;
        let first_time_fix = signals.first_time_fix_signal() * FIRST_TIME_FIX_POINTS;
        let total = (distance + duration + productive + first_time_fix).min(GRADE_CAP);

        GradeBreakdown {
            distance,
            duration,
            productive,
            first_time_fix,
            grade: Grade(total),
        }
    }

    pub fn grade(&self, distance_km: f64, overrun_minutes: f64, signals: OutcomeSignals) -> Grade {
        self.breakdown(distance_km, overrun_minutes, signals).grade
    }
}
