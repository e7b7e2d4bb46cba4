use super::domain::{DispatchInput, PredictionOutcome, PredictionRequest};
use super::model::ModelEstimate;
use crate::scoring::{Priority, TicketType};
use crate::workflows::csv_support::{empty_string_as_none, parse_flag};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Reads scoring requests: dispatch columns plus upstream model columns.
pub fn parse_requests<R: Read>(reader: R) -> Result<Vec<PredictionRequest>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut requests = Vec::new();

    for record in csv_reader.deserialize::<RequestRow>() {
        requests.push(record?.into_request());
    }

    Ok(requests)
}

#[derive(Debug, Deserialize)]
struct RequestRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    dispatch_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ticket_type: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    priority: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    required_skill: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    technician_skill: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    skill_match: Option<String>,
    #[serde(alias = "distance")]
    distance_km: f64,
    #[serde(default)]
    workload_ratio: Option<f64>,
    #[serde(alias = "expected_duration")]
    expected_duration_minutes: f64,
    #[serde(alias = "success_probability")]
    model_probability: f64,
    #[serde(alias = "estimated_duration_minutes")]
    estimated_duration: f64,
}

impl RequestRow {
    fn into_request(self) -> PredictionRequest {
        PredictionRequest {
            dispatch: DispatchInput {
                dispatch_id: self.dispatch_id,
                ticket_type: self.ticket_type.map(TicketType::from),
                priority: self.priority.map(Priority::from),
                required_skill: self.required_skill,
                technician_skill: self.technician_skill,
                skill_match: self.skill_match.as_deref().and_then(parse_flag),
                distance_km: self.distance_km,
                workload_ratio: self.workload_ratio,
                expected_duration_minutes: self.expected_duration_minutes,
            },
            model: ModelEstimate {
                success_probability: self.model_probability,
                estimated_duration_minutes: self.estimated_duration,
            },
        }
    }
}

/// Flat projection of an outcome for CSV export.
#[derive(Debug, Serialize)]
struct OutcomeRow<'a> {
    dispatch_id: &'a str,
    skill_match: bool,
    rule_probability: Option<f64>,
    model_probability: f64,
    success_probability: f64,
    failure_probability: f64,
    success_prediction: bool,
    expected_duration: f64,
    estimated_duration: f64,
    duration_difference: f64,
    recommendation: String,
    confidence: &'static str,
    projected_grade: f64,
}

pub fn write_outcomes<W: Write>(writer: W, outcomes: &[PredictionOutcome]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for outcome in outcomes {
        csv_writer.serialize(OutcomeRow {
            dispatch_id: outcome.dispatch_id.as_deref().unwrap_or(""),
            skill_match: outcome.skill_match,
            rule_probability: outcome.rule_probability,
            model_probability: outcome.model_probability,
            success_probability: outcome.success_probability,
            failure_probability: outcome.failure_probability,
            success_prediction: outcome.success_prediction,
            expected_duration: outcome.expected_duration_minutes,
            estimated_duration: outcome.estimated_duration_minutes,
            duration_difference: outcome.duration_difference_minutes,
            recommendation: outcome.recommendation.to_string(),
            confidence: outcome.confidence.label(),
            projected_grade: outcome.projected_grade.grade.value(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
