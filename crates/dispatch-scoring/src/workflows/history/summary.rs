use std::cmp::Ordering;
use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use super::domain::{CompletedDispatch, GradedDispatch};
use crate::scoring::LetterGrade;
use crate::workflows::prediction::summary::mean;

/// Grades every dispatch in observed mode, preserving input order.
pub fn grade_history(dispatches: &[CompletedDispatch]) -> Vec<GradedDispatch> {
    dispatches.par_iter().map(CompletedDispatch::grade).collect()
}

/// Distribution of historical grades and their components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; absent below two grades.
    pub std_dev: Option<f64>,
    pub letters: BTreeMap<LetterGrade, usize>,
    pub mean_distance_score: f64,
    pub mean_duration_score: f64,
    pub mean_productive_score: f64,
    pub mean_first_time_fix_score: f64,
}

impl GradeSummary {
    pub fn from_graded(graded: &[GradedDispatch]) -> Self {
        let mut grades: Vec<f64> = graded
            .iter()
            .map(|dispatch| dispatch.breakdown.grade.value())
            .collect();
        grades.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mut letters: BTreeMap<LetterGrade, usize> =
            LetterGrade::ALL.iter().map(|letter| (*letter, 0)).collect();
        for dispatch in graded {
            *letters.entry(dispatch.letter).or_insert(0) += 1;
        }

        let summary = Self {
            count: grades.len(),
            mean: mean(grades.iter().copied()),
            median: median(&grades),
            min: grades.first().copied().unwrap_or(0.0),
            max: grades.last().copied().unwrap_or(0.0),
            std_dev: sample_std_dev(&grades),
            letters,
            mean_distance_score: mean(graded.iter().map(|d| d.breakdown.distance)),
            mean_duration_score: mean(graded.iter().map(|d| d.breakdown.duration)),
            mean_productive_score: mean(graded.iter().map(|d| d.breakdown.productive)),
            mean_first_time_fix_score: mean(graded.iter().map(|d| d.breakdown.first_time_fix)),
        };

        info!(
            count = summary.count,
            mean = summary.mean,
            median = summary.median,
            "historical grades summarised"
        );
        summary
    }

    pub fn share(&self, letter: LetterGrade) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.letters.get(&letter).copied().unwrap_or(0) as f64 / self.count as f64
    }
}

fn median(sorted: &[f64]) -> f64 {
    match sorted.len() {
        0 => 0.0,
        len if len % 2 == 1 => sorted[len / 2],
        len => (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0,
    }
}

fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let average = mean(values.iter().copied());
    let squared: f64 = values.iter().map(|value| (value - average).powi(2)).sum();
    Some((squared / (values.len() - 1) as f64).sqrt())
}
