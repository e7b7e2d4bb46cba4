use chrono::NaiveDateTime;
use serde::Serialize;

use crate::scoring::{GradeBreakdown, GradeCalculator, LetterGrade, OutcomeSignals};

/// A finished dispatch with its recorded outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedDispatch {
    pub dispatch_id: String,
    pub distance_km: f64,
    pub productive: bool,
    pub first_time_fix: bool,
    pub actual_duration_minutes: f64,
    pub appointment_start: NaiveDateTime,
    pub appointment_end: NaiveDateTime,
}

impl CompletedDispatch {
    pub fn scheduled_minutes(&self) -> f64 {
        (self.appointment_end - self.appointment_start).num_seconds() as f64 / 60.0
    }

    /// Actual minus scheduled duration; negative means the job finished early.
    pub fn overrun_minutes(&self) -> f64 {
        self.actual_duration_minutes - self.scheduled_minutes()
    }

    pub fn grade(&self) -> GradedDispatch {
        let overrun_minutes = self.overrun_minutes();
        let breakdown = GradeCalculator.breakdown(
            self.distance_km,
            overrun_minutes,
            OutcomeSignals::Observed {
                productive: self.productive,
                first_time_fix: self.first_time_fix,
            },
        );
        GradedDispatch {
            dispatch_id: self.dispatch_id.clone(),
            overrun_minutes,
            letter: breakdown.grade.letter(),
            breakdown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedDispatch {
    pub dispatch_id: String,
    pub overrun_minutes: f64,
    pub breakdown: GradeBreakdown,
    pub letter: LetterGrade,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn overrun_is_actual_minus_window() {
        let dispatch = CompletedDispatch {
            dispatch_id: "H-1".to_string(),
            distance_km: 0.0,
            productive: true,
            first_time_fix: true,
            actual_duration_minutes: 150.0,
            appointment_start: at(8, 0),
            appointment_end: at(10, 0),
        };
        assert_eq!(dispatch.scheduled_minutes(), 120.0);
        assert_eq!(dispatch.overrun_minutes(), 30.0);

        let graded = dispatch.grade();
        assert_eq!(graded.breakdown.duration, 20.0);
        assert_eq!(graded.breakdown.grade.value(), 90.0);
        assert_eq!(graded.letter, LetterGrade::A);
    }
}
