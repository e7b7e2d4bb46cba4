use super::domain::{DispatchRanking, GeoPoint, OpenDispatch, Technician};
use crate::scoring::{Priority, TicketType};
use crate::workflows::csv_support::empty_string_as_none;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

pub fn parse_dispatches<R: Read>(reader: R) -> Result<Vec<OpenDispatch>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut dispatches = Vec::new();

    for record in csv_reader.deserialize::<DispatchRow>() {
        let row = record?;
        dispatches.push(OpenDispatch {
            dispatch_id: row.dispatch_id,
            required_skill: row.required_skill,
            location: GeoPoint::new(row.customer_latitude, row.customer_longitude),
            priority: row.priority.map(Priority::from),
            ticket_type: row.ticket_type.map(TicketType::from),
            expected_duration_minutes: row.expected_duration,
        });
    }

    Ok(dispatches)
}

pub fn parse_technicians<R: Read>(reader: R) -> Result<Vec<Technician>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut technicians = Vec::new();

    for record in csv_reader.deserialize::<TechnicianRow>() {
        let row = record?;
        technicians.push(Technician {
            technician_id: row.technician_id,
            name: row.technician_name,
            skill: row.technician_skill,
            location: GeoPoint::new(row.technician_latitude, row.technician_longitude),
            current_assignments: row.current_assignments.unwrap_or(0),
            workload_capacity: row.workload_capacity,
        });
    }

    Ok(technicians)
}

#[derive(Debug, Deserialize)]
struct DispatchRow {
    dispatch_id: String,
    required_skill: String,
    #[serde(alias = "latitude")]
    customer_latitude: f64,
    #[serde(alias = "longitude")]
    customer_longitude: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    priority: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ticket_type: Option<String>,
    #[serde(default)]
    expected_duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TechnicianRow {
    technician_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    technician_name: Option<String>,
    technician_skill: String,
    #[serde(alias = "latitude")]
    technician_latitude: f64,
    #[serde(alias = "longitude")]
    technician_longitude: f64,
    #[serde(default)]
    current_assignments: Option<u32>,
    workload_capacity: u32,
}

#[derive(Debug, Serialize)]
struct SuggestionRow<'a> {
    dispatch_id: &'a str,
    rank: usize,
    technician_id: &'a str,
    technician_name: &'a str,
    technician_skill: &'a str,
    required_skill: &'a str,
    skill_match: bool,
    distance_km: f64,
    current_assignments: u32,
    workload_capacity: u32,
    success_probability: f64,
    score: f64,
}

/// One row per kept candidate, dispatches in input order.
pub fn write_rankings<W: Write>(writer: W, rankings: &[DispatchRanking]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for ranking in rankings {
        for candidate in &ranking.candidates {
            csv_writer.serialize(SuggestionRow {
                dispatch_id: &ranking.dispatch_id,
                rank: candidate.rank,
                technician_id: &candidate.technician_id,
                technician_name: candidate.technician_name.as_deref().unwrap_or(""),
                technician_skill: &candidate.technician_skill,
                required_skill: &ranking.required_skill,
                skill_match: candidate.skill_match,
                distance_km: candidate.distance_km,
                current_assignments: candidate.current_assignments,
                workload_capacity: candidate.workload_capacity,
                success_probability: candidate.success_probability,
                score: candidate.score,
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}
