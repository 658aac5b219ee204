pub mod profile;

pub use profile::ScoringProfile;

use crate::features::{FeatureName, FeatureVector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Weights are integer points; 100 points equal a weight of 1.0.
pub const POINTS_PER_UNIT: u32 = 100;

/// Below this many points a URL is Low risk.
pub const LOW_CUT: u32 = 30;

/// At or above this many points a URL is High risk.
pub const HIGH_CUT: u32 = 60;

/// Rule deciding whether a weighted feature contributes its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Value is non-zero
    Present,
    /// Value is zero
    Absent,
    /// Value is strictly greater than the threshold
    Above(u64),
}

impl Trigger {
    pub fn holds(self, value: u64) -> bool {
        match self {
            Trigger::Present => value > 0,
            Trigger::Absent => value == 0,
            Trigger::Above(threshold) => value > threshold,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Present => f.write_str("present"),
            Trigger::Absent => f.write_str("absent"),
            Trigger::Above(threshold) => write!(f, "> {}", threshold),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub feature: FeatureName,
    pub points: u32,
    pub trigger: Trigger,
}

impl WeightEntry {
    const fn new(feature: FeatureName, points: u32, trigger: Trigger) -> Self {
        Self {
            feature,
            points,
            trigger,
        }
    }

    pub fn weight(&self) -> f64 {
        f64::from(self.points) / f64::from(POINTS_PER_UNIT)
    }
}

/// The one weight table every runtime scores with.
pub static CANONICAL_WEIGHTS: [WeightEntry; 16] = [
    WeightEntry::new(FeatureName::HasIpAddress, 25, Trigger::Present),
    WeightEntry::new(FeatureName::HasSuspiciousWords, 20, Trigger::Present),
    WeightEntry::new(FeatureName::DomainInPath, 18, Trigger::Present),
    WeightEntry::new(FeatureName::HasHttps, 15, Trigger::Absent),
    WeightEntry::new(FeatureName::UrlLength, 12, Trigger::Above(75)),
    WeightEntry::new(FeatureName::NumDots, 10, Trigger::Above(3)),
    WeightEntry::new(FeatureName::NumAt, 10, Trigger::Present),
    WeightEntry::new(FeatureName::HasDoubleSlash, 8, Trigger::Present),
    WeightEntry::new(FeatureName::HostnameLength, 8, Trigger::Above(30)),
    WeightEntry::new(FeatureName::PathLength, 8, Trigger::Above(50)),
    WeightEntry::new(FeatureName::NumHyphens, 6, Trigger::Above(2)),
    WeightEntry::new(FeatureName::NumSlash, 6, Trigger::Above(4)),
    WeightEntry::new(FeatureName::NumEqual, 5, Trigger::Above(2)),
    WeightEntry::new(FeatureName::NumAnd, 5, Trigger::Above(2)),
    WeightEntry::new(FeatureName::NumUnderscore, 2, Trigger::Above(2)),
    WeightEntry::new(FeatureName::NumTilde, 2, Trigger::Present),
];

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("Feature '{0}' is weighted more than once")]
    DuplicateFeature(FeatureName),
    #[error("Feature '{feature}' has {points} points, expected 1..={}", POINTS_PER_UNIT)]
    PointsOutOfRange { feature: FeatureName, points: u32 },
    #[error("Cut points must satisfy 0 < low < high, got low={low} high={high}")]
    InvalidCuts { low: u32, high: u32 },
    #[error("Profile {field} is {theirs}, this runtime classifies with {ours}")]
    ClassificationMismatch {
        field: &'static str,
        ours: String,
        theirs: String,
    },
    #[error("Malformed scoring profile: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validated, immutable set of weighted features and the cut points that
/// turn their summed points into a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    entries: Vec<WeightEntry>,
    low_cut: u32,
    high_cut: u32,
}

impl WeightTable {
    /// Validate `entries` and pair them with the canonical cut points.
    pub fn new(entries: Vec<WeightEntry>) -> Result<Self, ScoringError> {
        Self::with_cuts(entries, LOW_CUT, HIGH_CUT)
    }

    pub fn with_cuts(
        entries: Vec<WeightEntry>,
        low_cut: u32,
        high_cut: u32,
    ) -> Result<Self, ScoringError> {
        if low_cut == 0 || low_cut >= high_cut {
            return Err(ScoringError::InvalidCuts {
                low: low_cut,
                high: high_cut,
            });
        }
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.points == 0 || entry.points > POINTS_PER_UNIT {
                return Err(ScoringError::PointsOutOfRange {
                    feature: entry.feature,
                    points: entry.points,
                });
            }
            if !seen.insert(entry.feature) {
                return Err(ScoringError::DuplicateFeature(entry.feature));
            }
        }
        Ok(Self {
            entries,
            low_cut,
            high_cut,
        })
    }

    pub fn canonical() -> Self {
        Self {
            entries: CANONICAL_WEIGHTS.to_vec(),
            low_cut: LOW_CUT,
            high_cut: HIGH_CUT,
        }
    }

    pub fn low_cut(&self) -> u32 {
        self.low_cut
    }

    pub fn high_cut(&self) -> u32 {
        self.high_cut
    }

    pub fn level_for(&self, points: u32) -> RiskLevel {
        RiskLevel::from_points_with(points, self.low_cut, self.high_cut)
    }

    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    pub fn get(&self, feature: FeatureName) -> Option<&WeightEntry> {
        self.entries.iter().find(|entry| entry.feature == feature)
    }

    /// Entries by descending points; ties keep table order.
    pub fn ranked(&self) -> Vec<WeightEntry> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.points.cmp(&a.points));
        ranked
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::canonical()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Level under the canonical cut points.
    pub fn from_points(points: u32) -> Self {
        Self::from_points_with(points, LOW_CUT, HIGH_CUT)
    }

    pub fn from_points_with(points: u32, low_cut: u32, high_cut: u32) -> Self {
        match points {
            p if p >= high_cut => RiskLevel::High,
            p if p >= low_cut => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => f.write_str("Low"),
            RiskLevel::Medium => f.write_str("Medium"),
            RiskLevel::High => f.write_str("High"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub points: u32,
    pub score: f64,
    pub level: RiskLevel,
    /// Weighted features whose trigger held, in table order
    pub triggered: Vec<FeatureName>,
}

/// Score a feature vector against the canonical weight table.
pub fn assess_risk(features: &FeatureVector) -> RiskAssessment {
    assess_risk_with(features, &WeightTable::canonical())
}

pub fn assess_risk_with(features: &FeatureVector, table: &WeightTable) -> RiskAssessment {
    let mut points = 0u32;
    let mut triggered = Vec::new();

    for entry in table.entries() {
        if entry.trigger.holds(features.get(entry.feature)) {
            points += entry.points;
            triggered.push(entry.feature);
        }
    }

    let level = table.level_for(points);
    log::debug!(
        "Risk assessment: {} points ({}) from {:?}",
        points,
        level,
        triggered
    );

    RiskAssessment {
        points,
        score: f64::from(points) / f64::from(POINTS_PER_UNIT),
        level,
        triggered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{extract_features, FEATURE_COUNT};

    fn vector_with(pairs: &[(FeatureName, u64)]) -> FeatureVector {
        let mut values = [0u64; FEATURE_COUNT];
        for (name, value) in pairs {
            values[name.index()] = *value;
        }
        FeatureVector::from_values(values)
    }

    #[test]
    fn test_canonical_table_is_valid() {
        let table = WeightTable::new(CANONICAL_WEIGHTS.to_vec()).unwrap();
        assert_eq!(table, WeightTable::canonical());
    }

    #[test]
    fn test_trigger_predicates() {
        assert!(Trigger::Present.holds(1));
        assert!(!Trigger::Present.holds(0));
        assert!(Trigger::Absent.holds(0));
        assert!(!Trigger::Absent.holds(1));
        assert!(Trigger::Above(75).holds(76));
        assert!(!Trigger::Above(75).holds(75));
    }

    #[test]
    fn test_missing_https_contributes() {
        let assessment = assess_risk(&vector_with(&[(FeatureName::HasHttps, 0)]));
        assert_eq!(assessment.points, 15);
        assert_eq!(assessment.triggered, vec![FeatureName::HasHttps]);

        let assessment = assess_risk(&vector_with(&[(FeatureName::HasHttps, 1)]));
        assert_eq!(assessment.points, 0);
        assert_eq!(assessment.level, RiskLevel::Low);
    }

    #[test]
    fn test_length_thresholds() {
        let assessment = assess_risk(&vector_with(&[
            (FeatureName::HasHttps, 1),
            (FeatureName::UrlLength, 75),
            (FeatureName::HostnameLength, 31),
        ]));
        assert_eq!(assessment.triggered, vec![FeatureName::HostnameLength]);
        assert_eq!(assessment.points, 8);
    }

    #[test]
    fn test_unweighted_features_never_score() {
        let assessment = assess_risk(&vector_with(&[
            (FeatureName::HasHttps, 1),
            (FeatureName::NumPercent, 40),
            (FeatureName::NumQuestionMarks, 5),
            (FeatureName::DirCount, 12),
        ]));
        assert_eq!(assessment.points, 0);
    }

    #[test]
    fn test_level_cut_points() {
        assert_eq!(RiskLevel::from_points(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_points(LOW_CUT - 1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_points(LOW_CUT), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_points(HIGH_CUT - 1), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_points(HIGH_CUT), RiskLevel::High);
    }

    #[test]
    fn test_ip_login_without_https_is_high() {
        let features = extract_features("http://192.168.1.1/login").unwrap();
        let assessment = assess_risk(&features);
        assert!(assessment.points >= HIGH_CUT);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_plain_https_is_low() {
        let features = extract_features("https://example.com").unwrap();
        let assessment = assess_risk(&features);
        assert_eq!(assessment.points, 0);
        assert_eq!(assessment.score, 0.0);
        assert_eq!(assessment.level, RiskLevel::Low);
    }

    #[test]
    fn test_score_is_points_over_hundred() {
        let features = extract_features("http://example.com/login").unwrap();
        let assessment = assess_risk(&features);
        assert_eq!(assessment.points, 35);
        assert!((assessment.score - 0.35).abs() < 1e-12);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn test_table_rejects_bad_entries() {
        let duplicate = vec![
            WeightEntry::new(FeatureName::NumAt, 10, Trigger::Present),
            WeightEntry::new(FeatureName::NumAt, 5, Trigger::Present),
        ];
        assert!(matches!(
            WeightTable::new(duplicate),
            Err(ScoringError::DuplicateFeature(FeatureName::NumAt))
        ));

        let zero = vec![WeightEntry::new(FeatureName::NumAt, 0, Trigger::Present)];
        assert!(matches!(
            WeightTable::new(zero),
            Err(ScoringError::PointsOutOfRange { .. })
        ));

        let too_heavy = vec![WeightEntry::new(FeatureName::NumAt, 101, Trigger::Present)];
        assert!(WeightTable::new(too_heavy).is_err());
    }

    #[test]
    fn test_table_cut_points_decide_level() {
        let table = WeightTable::with_cuts(CANONICAL_WEIGHTS.to_vec(), 10, 20).unwrap();
        let features = extract_features("http://example.com").unwrap();

        let assessment = assess_risk_with(&features, &table);
        assert_eq!(assessment.points, 15);
        assert_eq!(assessment.level, RiskLevel::Medium);
        assert_eq!(assess_risk(&features).level, RiskLevel::Low);
    }

    #[test]
    fn test_table_rejects_bad_cuts() {
        assert!(matches!(
            WeightTable::with_cuts(CANONICAL_WEIGHTS.to_vec(), 0, 20),
            Err(ScoringError::InvalidCuts { low: 0, high: 20 })
        ));
        assert!(WeightTable::with_cuts(CANONICAL_WEIGHTS.to_vec(), 40, 40).is_err());
    }

    #[test]
    fn test_ranked_orders_by_points() {
        let ranked = WeightTable::canonical().ranked();
        assert_eq!(ranked[0].feature, FeatureName::HasIpAddress);
        assert!(ranked.windows(2).all(|pair| pair[0].points >= pair[1].points));
        // Ties keep table order
        let at = ranked.iter().position(|e| e.feature == FeatureName::NumAt);
        let dots = ranked.iter().position(|e| e.feature == FeatureName::NumDots);
        assert!(dots < at);
    }

    #[test]
    fn test_custom_table() {
        let table = WeightTable::new(vec![WeightEntry::new(
            FeatureName::NumPercent,
            40,
            Trigger::Above(1),
        )])
        .unwrap();
        let assessment = assess_risk_with(&vector_with(&[(FeatureName::NumPercent, 2)]), &table);
        assert_eq!(assessment.points, 40);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }
}
