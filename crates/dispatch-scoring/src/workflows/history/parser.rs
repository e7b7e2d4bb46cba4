use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use super::domain::CompletedDispatch;
use crate::workflows::csv_support::{empty_string_as_none, parse_datetime, parse_flag, parse_number};
use crate::workflows::ranking::GeoPoint;

#[derive(Debug)]
pub enum HistoryImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for HistoryImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryImportError::Io(err) => write!(f, "failed to read dispatch history: {}", err),
            HistoryImportError::Csv(err) => write!(f, "invalid dispatch history CSV: {}", err),
        }
    }
}

impl std::error::Error for HistoryImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryImportError::Io(err) => Some(err),
            HistoryImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for HistoryImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for HistoryImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Rows that could be graded plus a count of the ones that could not.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryImport {
    pub dispatches: Vec<CompletedDispatch>,
    pub skipped: usize,
}

pub struct HistoryImporter;

impl HistoryImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<HistoryImport, HistoryImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Rows missing any grading input are skipped rather than failing the import.
    pub fn from_reader<R: Read>(reader: R) -> Result<HistoryImport, HistoryImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut dispatches = Vec::new();
        let mut skipped = 0;

        for record in csv_reader.deserialize::<HistoryRow>() {
            match record?.into_dispatch() {
                Some(dispatch) => dispatches.push(dispatch),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!(skipped, kept = dispatches.len(), "skipped incomplete history rows");
        }

        Ok(HistoryImport {
            dispatches,
            skipped,
        })
    }
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    dispatch_id: Option<String>,
    #[serde(default, alias = "distance_km", deserialize_with = "empty_string_as_none")]
    distance: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    customer_latitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    customer_longitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    technician_latitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    technician_longitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    productive_dispatch: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    first_time_fix: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    actual_duration: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    appointment_start_time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    appointment_end_time: Option<String>,
}

impl HistoryRow {
    fn distance_km(&self) -> Option<f64> {
        if let Some(distance) = self.distance.as_deref().and_then(parse_number) {
            return Some(distance);
        }

        let customer = GeoPoint::new(
            parse_number(self.customer_latitude.as_deref()?)?,
            parse_number(self.customer_longitude.as_deref()?)?,
        );
        let technician = GeoPoint::new(
            parse_number(self.technician_latitude.as_deref()?)?,
            parse_number(self.technician_longitude.as_deref()?)?,
        );
        if !customer.is_valid() || !technician.is_valid() {
            return None;
        }
        Some(customer.distance_km(&technician))
    }

    fn into_dispatch(self) -> Option<CompletedDispatch> {
        let distance_km = self.distance_km().filter(|distance| *distance >= 0.0)?;
        Some(CompletedDispatch {
            distance_km,
            productive: parse_flag(self.productive_dispatch.as_deref()?)?,
            first_time_fix: parse_flag(self.first_time_fix.as_deref()?)?,
            actual_duration_minutes: parse_number(self.actual_duration.as_deref()?)?,
            appointment_start: parse_datetime(self.appointment_start_time.as_deref()?)?,
            appointment_end: parse_datetime(self.appointment_end_time.as_deref()?)?,
            dispatch_id: self.dispatch_id?,
        })
    }
}
