use super::category::{CategoryTable, DistanceBucket, WorkloadBucket};
use super::features::{DispatchFeatures, Priority, TicketType};
use super::probability::Probability;
use rayon::prelude::*;
use serde::Serialize;

/// Success rate before any adjustment.
pub const BASE_SUCCESS_RATE: f64 = 0.55;
/// Skill match is the dominant signal; the mismatch penalty is smaller.
pub const SKILL_MATCH_BONUS: f64 = 0.37;
pub const SKILL_MISMATCH_PENALTY: f64 = -0.10;

/// Signed additive adjustments keyed by bucket or categorical value.
///
/// Keys without an entry contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentTable<K> {
    entries: Vec<(K, f64)>,
}

impl<K: PartialEq> AdjustmentTable<K> {
    pub fn new(entries: Vec<(K, f64)>) -> Self {
        Self { entries }
    }

    pub fn adjustment(&self, key: &K) -> f64 {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, adjustment)| *adjustment)
            .unwrap_or(0.0)
    }

    pub fn entries(&self) -> &[(K, f64)] {
        &self.entries
    }
}

/// Which rule produced a contribution, with the input it keyed on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "factor", rename_all = "snake_case")]
pub enum RuleFactor {
    Base,
    Skill { matched: bool },
    Workload { bucket: WorkloadBucket, ratio: f64 },
    Distance { bucket: DistanceBucket, distance_km: f64 },
    Priority { priority: Priority },
    TicketType { ticket_type: TicketType },
}

/// One additive term of the rule estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleContribution {
    #[serde(flatten)]
    pub factor: RuleFactor,
    pub adjustment: f64,
}

impl RuleContribution {
    fn trace_line(&self) -> Option<String> {
        let pct = |value: f64| format!("{:+.0}%", value * 100.0);
        match &self.factor {
            RuleFactor::Base => Some(format!("Base rate: {:.0}%", self.adjustment * 100.0)),
            RuleFactor::Skill { matched: true } => {
                Some(format!("[+] Skill match: {}", pct(self.adjustment)))
            }
            RuleFactor::Skill { matched: false } => {
                Some(format!("[-] Skill mismatch: {}", pct(self.adjustment)))
            }
            RuleFactor::Workload { bucket, ratio } => Some(format!(
                "Workload ({bucket}, {ratio:.2}): {}",
                pct(self.adjustment)
            )),
            RuleFactor::Distance {
                bucket,
                distance_km,
            } => Some(format!(
                "Distance ({bucket}, {distance_km:.1}km): {}",
                pct(self.adjustment)
            )),
            RuleFactor::Priority { priority } if self.adjustment != 0.0 => Some(format!(
                "Priority ({priority}): {}",
                pct(self.adjustment)
            )),
            RuleFactor::TicketType { ticket_type } if self.adjustment != 0.0 => Some(format!(
                "Type ({ticket_type}): {}",
                pct(self.adjustment)
            )),
            RuleFactor::Priority { .. } | RuleFactor::TicketType { .. } => None,
        }
    }
}

/// Full audit trail of a rule estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleBreakdown {
    pub contributions: Vec<RuleContribution>,
    pub raw_sum: f64,
    pub probability: Probability,
}

impl RuleBreakdown {
    /// Human-readable factor lines ending with the clipped result.
    ///
    /// Priority and ticket-type lines are omitted when they contribute nothing.
    pub fn trace(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .contributions
            .iter()
            .filter_map(RuleContribution::trace_line)
            .collect();
        lines.push(format!("=> Final: {}", self.probability));
        lines
    }
}

/// Rule-based success estimator: base rate plus keyed adjustments, clipped to `[0, 1]`.
///
/// All tables are immutable after construction, so one engine can be shared
/// across threads and requests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEngine {
    base_rate: f64,
    skill_match_bonus: f64,
    skill_mismatch_penalty: f64,
    workload_buckets: CategoryTable<WorkloadBucket>,
    distance_buckets: CategoryTable<DistanceBucket>,
    workload_adjustments: AdjustmentTable<WorkloadBucket>,
    distance_adjustments: AdjustmentTable<DistanceBucket>,
    priority_adjustments: AdjustmentTable<Priority>,
    ticket_type_adjustments: AdjustmentTable<TicketType>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleEngine {
    /// Rule set calibrated against historical dispatch outcomes.
    pub fn standard() -> Self {
        Self {
            base_rate: BASE_SUCCESS_RATE,
            skill_match_bonus: SKILL_MATCH_BONUS,
            skill_mismatch_penalty: SKILL_MISMATCH_PENALTY,
            workload_buckets: WorkloadBucket::table(),
            distance_buckets: DistanceBucket::table(),
            workload_adjustments: AdjustmentTable::new(vec![
                (WorkloadBucket::Low, 0.32),
                (WorkloadBucket::Medium, 0.30),
                (WorkloadBucket::High, -0.10),
                (WorkloadBucket::Overloaded, -0.30),
            ]),
            distance_adjustments: AdjustmentTable::new(vec![
                (DistanceBucket::VeryClose, 0.33),
                (DistanceBucket::Close, 0.05),
                (DistanceBucket::Medium, 0.00),
                (DistanceBucket::Far, -0.12),
                (DistanceBucket::VeryFar, -0.30),
            ]),
            priority_adjustments: AdjustmentTable::new(vec![
                (Priority::Low, 0.02),
                (Priority::Normal, 0.00),
                (Priority::High, -0.02),
                (Priority::Critical, -0.05),
            ]),
            ticket_type_adjustments: AdjustmentTable::new(vec![
                (TicketType::Order, 0.02),
                (TicketType::Trouble, -0.03),
            ]),
        }
    }

    pub fn estimate(&self, features: &DispatchFeatures) -> Probability {
        self.explain(features).probability
    }

    pub fn explain(&self, features: &DispatchFeatures) -> RuleBreakdown {
        let ratio = features.effective_workload_ratio();
        let workload = self.workload_buckets.classify(ratio);
        let distance = self.distance_buckets.classify(features.distance_km);
        let priority = features.effective_priority();
        let ticket_type = features.effective_ticket_type();

        let skill_adjustment = if features.skill_match {
            self.skill_match_bonus
        } else {
            self.skill_mismatch_penalty
        };

        let contributions = vec![
            RuleContribution {
                factor: RuleFactor::Base,
                adjustment: self.base_rate,
            },
            RuleContribution {
                factor: RuleFactor::Skill {
                    matched: features.skill_match,
                },
                adjustment: skill_adjustment,
            },
            RuleContribution {
                adjustment: self.workload_adjustments.adjustment(&workload),
                factor: RuleFactor::Workload {
                    bucket: workload,
                    ratio,
                },
            },
            RuleContribution {
                adjustment: self.distance_adjustments.adjustment(&distance),
                factor: RuleFactor::Distance {
                    bucket: distance,
                    distance_km: features.distance_km,
                },
            },
            RuleContribution {
                adjustment: self.priority_adjustments.adjustment(&priority),
                factor: RuleFactor::Priority { priority },
            },
            RuleContribution {
                adjustment: self.ticket_type_adjustments.adjustment(&ticket_type),
                factor: RuleFactor::TicketType { ticket_type },
            },
        ];

        let raw_sum: f64 = contributions.iter().map(|term| term.adjustment).sum();

        RuleBreakdown {
            contributions,
            raw_sum,
            probability: Probability::clipped(raw_sum),
        }
    }

    /// Element-wise estimate over a batch; order follows the input.
    pub fn estimate_batch(&self, batch: &[DispatchFeatures]) -> Vec<Probability> {
        batch
            .par_iter()
            .map(|features| self.estimate(features))
            .collect()
    }

    pub fn workload_buckets(&self) -> &CategoryTable<WorkloadBucket> {
        &self.workload_buckets
    }

    pub fn distance_buckets(&self) -> &CategoryTable<DistanceBucket> {
        &self.distance_buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ideal() -> DispatchFeatures {
        DispatchFeatures::new(15.0, true)
            .with_workload_ratio(0.4)
            .with_priority(Priority::Normal)
            .with_ticket_type(TicketType::Order)
    }

    fn challenging() -> DispatchFeatures {
        DispatchFeatures::new(150.0, false)
            .with_workload_ratio(1.2)
            .with_priority(Priority::Critical)
            .with_ticket_type(TicketType::Trouble)
    }

    #[test]
    fn ideal_dispatch_clips_to_one() {
        let breakdown = RuleEngine::standard().explain(&ideal());
        assert!((breakdown.raw_sum - 1.31).abs() < 1e-9);
        assert_eq!(breakdown.probability.value(), 1.0);
    }

    #[test]
    fn challenging_dispatch_clips_to_zero() {
        let breakdown = RuleEngine::standard().explain(&challenging());
        assert!((breakdown.raw_sum - (-0.05)).abs() < 1e-9);
        assert_eq!(breakdown.probability.value(), 0.0);
    }

    #[test]
    fn average_dispatch_stays_inside_the_interval() {
        let features = DispatchFeatures::new(60.0, true)
            .with_workload_ratio(0.6)
            .with_priority("Normal")
            .with_ticket_type("Order");
        let probability = RuleEngine::standard().estimate(&features).value();
        // 0.55 + 0.37 + 0.30 + 0.00 + 0.00 + 0.02
        assert!((probability - 1.0).abs() < 1e-9);

        let features = DispatchFeatures::new(60.0, false).with_workload_ratio(0.9);
        let probability = RuleEngine::standard().estimate(&features).value();
        // 0.55 - 0.10 - 0.10 + 0.00 + 0.00 + 0.02
        assert!((probability - 0.37).abs() < 1e-9);
    }

    #[test]
    fn unknown_categories_contribute_nothing() {
        let engine = RuleEngine::standard();
        let known = DispatchFeatures::new(60.0, false).with_priority(Priority::Normal);
        let unknown = DispatchFeatures::new(60.0, false)
            .with_priority("Medium")
            .with_ticket_type("Survey");
        let difference = engine.estimate(&known).value() - engine.estimate(&unknown).value();
        // only the Order bonus is lost
        assert!((difference - 0.02).abs() < 1e-9);
    }

    #[test]
    fn unusable_distances_score_as_very_far() {
        let engine = RuleEngine::standard();
        let remote = engine.explain(&DispatchFeatures::new(1.0e12, true));
        // 0.55 + 0.37 + 0.30 - 0.30 + 0.00 + 0.02
        assert!((remote.raw_sum - 0.94).abs() < 1e-9);

        for distance in [f64::INFINITY, f64::NAN, -5.0] {
            let breakdown = engine.explain(&DispatchFeatures::new(distance, true));
            assert_eq!(breakdown.raw_sum, remote.raw_sum);
            assert!(breakdown.trace()[3].starts_with("Distance (very_far, "));
        }
    }

    #[test]
    fn missing_fields_use_defaults() {
        let engine = RuleEngine::standard();
        let sparse = DispatchFeatures::new(60.0, true);
        let explicit = DispatchFeatures::new(60.0, true)
            .with_workload_ratio(0.5)
            .with_priority(Priority::Normal)
            .with_ticket_type(TicketType::Order);
        assert_eq!(engine.explain(&sparse), engine.explain(&explicit));
    }

    #[test]
    fn trace_ends_with_the_clipped_value_and_skips_neutral_lines() {
        let trace = RuleEngine::standard().explain(&ideal()).trace();
        assert_eq!(
            trace,
            vec![
                "Base rate: 55%".to_string(),
                "[+] Skill match: +37%".to_string(),
                "Workload (low, 0.40): +32%".to_string(),
                "Distance (close, 15.0km): +5%".to_string(),
                "Type (Order): +2%".to_string(),
                "=> Final: 100%".to_string(),
            ]
        );

        let trace = RuleEngine::standard().explain(&challenging()).trace();
        assert_eq!(trace[1], "[-] Skill mismatch: -10%");
        assert_eq!(trace[4], "Priority (Critical): -5%");
        assert_eq!(trace.last().map(String::as_str), Some("=> Final: 0%"));
    }

    #[test]
    fn batch_preserves_input_order() {
        let engine = RuleEngine::standard();
        let results = engine.estimate_batch(&[ideal(), challenging()]);
        assert_eq!(results, vec![Probability::ONE, Probability::ZERO]);
    }

    proptest! {
        #[test]
        fn rule_probability_never_leaves_the_unit_interval(
            distance in 0.0f64..2_000.0,
            workload in 0.0f64..5.0,
            matched in any::<bool>(),
            priority in prop::sample::select(vec!["Low", "Normal", "High", "Critical", "Urgent"]),
            ticket in prop::sample::select(vec!["Order", "Trouble", "Survey"]),
        ) {
            let features = DispatchFeatures::new(distance, matched)
                .with_workload_ratio(workload)
                .with_priority(priority)
                .with_ticket_type(ticket);
            let probability = RuleEngine::standard().estimate(&features).value();
            prop_assert!((0.0..=1.0).contains(&probability));
        }
    }
}
