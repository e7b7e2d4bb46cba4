use crate::scoring::{Priority, TicketType};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance by the spherical law of cosines.
    ///
    /// The cosine is clamped to `[-1, 1]` so identical points give 0 instead of NaN.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let cosine = lat1.cos() * lat2.cos() * delta_lon.cos() + lat1.sin() * lat2.sin();
        EARTH_RADIUS_KM * cosine.clamp(-1.0, 1.0).acos()
    }
}

/// A dispatch waiting for a technician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenDispatch {
    pub dispatch_id: String,
    pub required_skill: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub ticket_type: Option<TicketType>,
    #[serde(default)]
    pub expected_duration_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technician {
    pub technician_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub skill: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub current_assignments: u32,
    pub workload_capacity: u32,
}

impl Technician {
    /// Free slots for the day; never negative.
    pub fn spare_capacity(&self) -> u32 {
        self.workload_capacity.saturating_sub(self.current_assignments)
    }
}

/// One scored technician for a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub rank: usize,
    pub technician_id: String,
    pub technician_name: Option<String>,
    pub technician_skill: String,
    pub distance_km: f64,
    pub skill_match: bool,
    pub workload_ratio: Option<f64>,
    pub current_assignments: u32,
    pub workload_capacity: u32,
    pub success_probability: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRanking {
    pub dispatch_id: String,
    pub required_skill: String,
    pub candidates: Vec<RankedCandidate>,
}

impl DispatchRanking {
    pub fn best(&self) -> Option<&RankedCandidate> {
        self.candidates.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_do_not_produce_nan() {
        let point = GeoPoint::new(41.5868, -93.625);
        let distance = point.distance_km(&point);
        assert!(distance.is_finite());
        assert!(distance < 1e-3, "got {distance}");
    }

    #[test]
    fn quarter_meridian_matches_sphere_geometry() {
        let equator = GeoPoint::new(0.0, 0.0);
        let pole = GeoPoint::new(90.0, 0.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((equator.distance_km(&pole) - expected).abs() < 1e-6);
    }

    #[test]
    fn known_city_pair_is_close_to_reference() {
        // Des Moines to Chicago is roughly 500 km
        let des_moines = GeoPoint::new(41.5868, -93.625);
        let chicago = GeoPoint::new(41.8781, -87.6298);
        let distance = des_moines.distance_km(&chicago);
        assert!((495.0..505.0).contains(&distance), "got {distance}");
        assert!((distance - chicago.distance_km(&des_moines)).abs() < 1e-9);
    }

    #[test]
    fn coordinates_outside_the_globe_are_invalid() {
        assert!(GeoPoint::new(45.0, 120.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn spare_capacity_saturates() {
        let technician = Technician {
            technician_id: "T-1".to_string(),
            name: None,
            skill: "Fiber".to_string(),
            location: GeoPoint::new(0.0, 0.0),
            current_assignments: 7,
            workload_capacity: 5,
        };
        assert_eq!(technician.spare_capacity(), 0);
    }
}
