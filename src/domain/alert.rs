//! Threshold tiers and the persisted markers that record delivered alerts.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Alert tiers, ordered from the lowest to the highest threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThresholdTier {
    Warning,
    Critical,
    Exceeded,
}

impl ThresholdTier {
    pub const ALL: [ThresholdTier; 3] = [
        ThresholdTier::Warning,
        ThresholdTier::Critical,
        ThresholdTier::Exceeded,
    ];

    /// Percentage at which the tier starts.
    pub fn lower_bound(self) -> f64 {
        self.value() as f64
    }

    /// Percentage at which the next tier takes over, if any.
    pub fn upper_bound(self) -> Option<f64> {
        match self {
            ThresholdTier::Warning => Some(ThresholdTier::Critical.lower_bound()),
            ThresholdTier::Critical => Some(ThresholdTier::Exceeded.lower_bound()),
            ThresholdTier::Exceeded => None,
        }
    }

    pub fn value(self) -> u32 {
        match self {
            ThresholdTier::Warning => 80,
            ThresholdTier::Critical => 85,
            ThresholdTier::Exceeded => 100,
        }
    }

    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.value() == value)
    }

    /// `true` when `percentage` lies in `[lower_bound, upper_bound)`.
    pub fn band_contains(self, percentage: f64) -> bool {
        percentage >= self.lower_bound()
            && self.upper_bound().map_or(true, |upper| percentage < upper)
    }

    pub fn label(self) -> &'static str {
        match self {
            ThresholdTier::Warning => "warning",
            ThresholdTier::Critical => "critical",
            ThresholdTier::Exceeded => "exceeded",
        }
    }
}

impl fmt::Display for ThresholdTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// "This budget has already been alerted at this tier."
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationMarker {
    pub budget_id: String,
    pub tier: ThresholdTier,
}

impl NotificationMarker {
    pub fn new(budget_id: impl Into<String>, tier: ThresholdTier) -> Self {
        Self {
            budget_id: budget_id.into(),
            tier,
        }
    }

    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NotificationMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.budget_id, self.tier)
    }
}

impl FromStr for NotificationMarker {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Budget ids may contain dashes themselves; the tier is the last segment.
        let (budget_id, tier) = value
            .rsplit_once('-')
            .ok_or_else(|| format!("marker `{value}` has no tier suffix"))?;
        let tier = tier
            .parse::<u32>()
            .ok()
            .and_then(ThresholdTier::from_value)
            .ok_or_else(|| format!("marker `{value}` has an unknown tier"))?;
        if budget_id.is_empty() {
            return Err(format!("marker `{value}` has no budget id"));
        }
        Ok(Self::new(budget_id, tier))
    }
}

/// Persisted set of marker keys for one user. Unknown keys are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerSet(BTreeSet<String>);

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, budget_id: &str, tier: ThresholdTier) -> bool {
        self.0.contains(&NotificationMarker::new(budget_id, tier).key())
    }

    /// Adds the marker, returning `true` when it was not present before.
    pub fn insert(&mut self, budget_id: &str, tier: ThresholdTier) -> bool {
        self.0.insert(NotificationMarker::new(budget_id, tier).key())
    }

    /// Removes the marker, returning `true` when it was present.
    pub fn remove(&mut self, budget_id: &str, tier: ThresholdTier) -> bool {
        self.0.remove(&NotificationMarker::new(budget_id, tier).key())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Markers that parse as `{budgetId}-{tier}`.
    pub fn markers(&self) -> Vec<NotificationMarker> {
        self.0.iter().filter_map(|key| key.parse().ok()).collect()
    }

    pub fn tiers_for(&self, budget_id: &str) -> Vec<ThresholdTier> {
        ThresholdTier::ALL
            .into_iter()
            .filter(|tier| self.contains(budget_id, *tier))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MarkerSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
