//! Hard-coded overrides applied after thresholding. Evaluated in order; the
//! first rule whose predicate holds is applied and the rest are skipped.

use super::RiskLevel;
use crate::features::FeatureVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Raise to at least this level
    AtLeast(RiskLevel),
    /// Lower to at most this level
    AtMost(RiskLevel),
}

impl Bound {
    pub fn apply(self, level: RiskLevel) -> RiskLevel {
        match self {
            Bound::AtLeast(floor) => level.max(floor),
            Bound::AtMost(ceiling) => level.min(ceiling),
        }
    }
}

#[derive(Clone, Copy)]
pub struct OverrideRule {
    pub name: &'static str,
    pub matches: fn(&FeatureVector) -> bool,
    pub bound: Bound,
}

impl std::fmt::Debug for OverrideRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideRule")
            .field("name", &self.name)
            .field("bound", &self.bound)
            .finish()
    }
}

fn strong_and_very_recent(f: &FeatureVector) -> bool {
    f.magnitude >= 0.8 && f.recency >= 0.9
}

fn moderate_recent_and_deep(f: &FeatureVector) -> bool {
    f.magnitude >= 0.6 && f.recency >= 0.8 && f.depth >= 0.7
}

fn weak_and_stale(f: &FeatureVector) -> bool {
    f.magnitude <= 0.2 && f.recency <= 0.3
}

/// Priority order is significant: overlapping conditions resolve to the earlier rule.
pub const OVERRIDE_RULES: [OverrideRule; 3] = [
    OverrideRule {
        name: "strong_and_very_recent",
        matches: strong_and_very_recent,
        bound: Bound::AtLeast(RiskLevel::High),
    },
    OverrideRule {
        name: "moderate_recent_and_deep",
        matches: moderate_recent_and_deep,
        bound: Bound::AtLeast(RiskLevel::High),
    },
    OverrideRule {
        name: "weak_and_stale",
        matches: weak_and_stale,
        bound: Bound::AtMost(RiskLevel::Low),
    },
];

/// First matching rule, if any.
pub fn first_match<'a>(rules: &'a [OverrideRule], features: &FeatureVector) -> Option<&'a OverrideRule> {
    rules.iter().find(|rule| (rule.matches)(features))
}
