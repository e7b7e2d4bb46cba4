use serde::{Deserialize, Serialize};
use std::fmt;

/// Workload ratio assumed when a record carries none (lands in the medium bucket).
pub const DEFAULT_WORKLOAD_RATIO: f64 = 0.5;

/// Dispatch urgency. Unrecognised values are kept verbatim and carry no adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
    Other(String),
}

impl Priority {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "normal" => Self::Normal,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
            Self::Critical => "Critical",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of work behind a dispatch. Open-ended like [`Priority`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketType {
    #[default]
    Order,
    Trouble,
    Other(String),
}

impl TicketType {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "order" => Self::Order,
            "trouble" => Self::Trouble,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Order => "Order",
            Self::Trouble => "Trouble",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for TicketType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for TicketType {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<TicketType> for String {
    fn from(value: TicketType) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs to the rule-based success estimate.
///
/// Optional fields fall back to documented defaults, so any partially
/// populated record still scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchFeatures {
    pub distance_km: f64,
    pub skill_match: bool,
    #[serde(default)]
    pub workload_ratio: Option<f64>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub ticket_type: Option<TicketType>,
}

impl DispatchFeatures {
    pub fn new(distance_km: f64, skill_match: bool) -> Self {
        Self {
            distance_km,
            skill_match,
            workload_ratio: None,
            priority: None,
            ticket_type: None,
        }
    }

    pub fn with_workload_ratio(mut self, ratio: f64) -> Self {
        self.workload_ratio = Some(ratio);
        self
    }

    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_ticket_type(mut self, ticket_type: impl Into<TicketType>) -> Self {
        self.ticket_type = Some(ticket_type.into());
        self
    }

    pub fn effective_workload_ratio(&self) -> f64 {
        self.workload_ratio.unwrap_or(DEFAULT_WORKLOAD_RATIO)
    }

    pub fn effective_priority(&self) -> Priority {
        self.priority.clone().unwrap_or_default()
    }

    pub fn effective_ticket_type(&self) -> TicketType {
        self.ticket_type.clone().unwrap_or_default()
    }
}

/// A technician matches when their primary skill equals the required skill.
pub fn skill_match(required_skill: &str, technician_skill: &str) -> bool {
    required_skill.trim() == technician_skill.trim()
}

/// Assigned jobs over capacity for the day; `None` when capacity is zero.
pub fn workload_ratio(assigned: u32, capacity: u32) -> Option<f64> {
    if capacity == 0 {
        None
    } else {
        Some(f64::from(assigned) / f64::from(capacity))
    }
}
