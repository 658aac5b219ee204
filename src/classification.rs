use crate::scoring::{RiskAssessment, RiskLevel};
use serde::Serialize;

/// Lowest risk level reported as phishing. Everything below is legitimate.
pub const PHISHING_FLOOR: RiskLevel = RiskLevel::Medium;

/// Confidence never reaches certainty.
pub const CONFIDENCE_CEILING: f64 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub is_phishing: bool,
    pub confidence: f64,
}

impl ClassificationResult {
    pub fn verdict(&self) -> &'static str {
        if self.is_phishing {
            "Potential Phishing Website"
        } else {
            "Likely Legitimate Website"
        }
    }
}

/// Collapse a three-level assessment into a binary verdict.
pub fn classify(assessment: &RiskAssessment) -> ClassificationResult {
    ClassificationResult {
        is_phishing: assessment.level >= PHISHING_FLOOR,
        confidence: assessment.score.clamp(0.0, CONFIDENCE_CEILING),
    }
}
