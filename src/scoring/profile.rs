//! Serialisable view of the scoring constants.
//!
//! The browser extension loads this JSON instead of carrying its own copy of
//! the weights, so both runtimes score from the same table.

use super::{RiskLevel, ScoringError, WeightEntry, WeightTable, HIGH_CUT, LOW_CUT};
use crate::classification::{CONFIDENCE_CEILING, PHISHING_FLOOR};
use crate::features::url_features::SUSPICIOUS_WORDS;
use crate::features::FeatureName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub feature_order: Vec<FeatureName>,
    pub weights: Vec<WeightEntry>,
    pub low_cut: u32,
    pub high_cut: u32,
    pub phishing_floor: RiskLevel,
    pub confidence_ceiling: f64,
    pub suspicious_words: Vec<String>,
}

impl ScoringProfile {
    pub fn canonical() -> Self {
        Self {
            feature_order: FeatureName::ALL.to_vec(),
            weights: WeightTable::canonical().entries().to_vec(),
            low_cut: LOW_CUT,
            high_cut: HIGH_CUT,
            phishing_floor: PHISHING_FLOOR,
            confidence_ceiling: CONFIDENCE_CEILING,
            suspicious_words: SUSPICIOUS_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Parse a profile exported by another runtime. Unknown feature names fail here.
    pub fn from_json(content: &str) -> Result<Self, ScoringError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ScoringError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the profile and return its weight table, cut points included.
    ///
    /// Classification constants are not table data, so a profile whose phishing
    /// floor or confidence ceiling differs from this runtime's is rejected.
    pub fn into_weight_table(self) -> Result<WeightTable, ScoringError> {
        if self.phishing_floor != PHISHING_FLOOR {
            return Err(ScoringError::ClassificationMismatch {
                field: "phishing_floor",
                ours: PHISHING_FLOOR.to_string(),
                theirs: self.phishing_floor.to_string(),
            });
        }
        if self.confidence_ceiling.to_bits() != CONFIDENCE_CEILING.to_bits() {
            return Err(ScoringError::ClassificationMismatch {
                field: "confidence_ceiling",
                ours: CONFIDENCE_CEILING.to_string(),
                theirs: self.confidence_ceiling.to_string(),
            });
        }
        WeightTable::with_cuts(self.weights, self.low_cut, self.high_cut)
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract_features;
    use crate::scoring::{assess_risk_with, Trigger};

    #[test]
    fn test_export_round_trips_to_canonical_table() {
        let json = ScoringProfile::canonical().to_json_pretty().unwrap();
        let parsed = ScoringProfile::from_json(&json).unwrap();
        assert_eq!(parsed, ScoringProfile::canonical());
        assert_eq!(parsed.into_weight_table().unwrap(), WeightTable::canonical());
    }

    #[test]
    fn test_export_uses_snake_case_names() {
        let json = ScoringProfile::canonical().to_json_pretty().unwrap();
        assert!(json.contains("\"has_ip_address\""));
        assert!(json.contains("\"above\": 75"));
        assert!(json.contains("\"phishing_floor\": \"Medium\""));
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let json = r#"{
            "feature_order": [],
            "weights": [{"feature": "num_emoji", "points": 5, "trigger": "present"}],
            "low_cut": 30,
            "high_cut": 60,
            "phishing_floor": "Medium",
            "confidence_ceiling": 0.99,
            "suspicious_words": []
        }"#;
        assert!(matches!(
            ScoringProfile::from_json(json),
            Err(ScoringError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_cuts_are_rejected() {
        let mut profile = ScoringProfile::canonical();
        profile.low_cut = 70;
        assert!(matches!(
            profile.into_weight_table(),
            Err(ScoringError::InvalidCuts { low: 70, high: 60 })
        ));
    }

    #[test]
    fn test_loaded_cuts_are_used_for_scoring() {
        let mut profile = ScoringProfile::canonical();
        profile.low_cut = 10;
        profile.high_cut = 20;
        let json = profile.to_json_pretty().unwrap();

        let table = ScoringProfile::from_json(&json)
            .unwrap()
            .into_weight_table()
            .unwrap();
        assert_eq!(table.low_cut(), 10);
        assert_eq!(table.high_cut(), 20);

        let features = extract_features("http://example.com").unwrap();
        let assessment = assess_risk_with(&features, &table);
        assert_eq!(assessment.points, 15);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn test_foreign_floor_is_rejected() {
        let mut profile = ScoringProfile::canonical();
        profile.phishing_floor = RiskLevel::High;
        assert!(matches!(
            profile.into_weight_table(),
            Err(ScoringError::ClassificationMismatch {
                field: "phishing_floor",
                ..
            })
        ));
    }

    #[test]
    fn test_foreign_ceiling_is_rejected() {
        let mut profile = ScoringProfile::canonical();
        profile.confidence_ceiling = 1.0;
        assert!(matches!(
            profile.into_weight_table(),
            Err(ScoringError::ClassificationMismatch {
                field: "confidence_ceiling",
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_weight_is_rejected() {
        let mut profile = ScoringProfile::canonical();
        profile.weights.push(WeightEntry {
            feature: FeatureName::HasHttps,
            points: 10,
            trigger: Trigger::Absent,
        });
        assert!(matches!(
            profile.into_weight_table(),
            Err(ScoringError::DuplicateFeature(FeatureName::HasHttps))
        ));
    }
}
