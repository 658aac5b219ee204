use crate::report::analyze_url;
use crate::scoring::{RiskLevel, ScoringProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// URLs every runtime scores when producing a parity report.
pub const SAMPLE_URLS: &[(&str, &str)] = &[
    ("plain_https", "https://example.com"),
    ("plain_http", "http://example.com"),
    ("ip_login", "http://192.168.1.1/login"),
    ("domain_in_path", "http://example.com/example.com/x"),
    (
        "long_subdomain_chain",
        "https://secure-login.account-update.paypal.com.verify-user.example.net/signin?id=1&session=2&token=3&ref=4",
    ),
    ("at_redirect", "http://bank.example.com@203.0.113.7/update"),
    ("double_slash", "https://example.org/files//download"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityReport {
    pub runtime: String,
    pub version: String,
    pub profile: ScoringProfile,
    pub sample_scores: Vec<SampleScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleScore {
    pub test_name: String,
    pub url: String,
    pub points: u32,
    pub risk_level: RiskLevel,
    pub is_phishing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParityMismatch {
    Profile { field: String, ours: String, theirs: String },
    Sample { test_name: String, ours: String, theirs: String },
    MissingSample { test_name: String },
    ExtraSample { test_name: String },
}

impl fmt::Display for ParityMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParityMismatch::Profile { field, ours, theirs } => {
                write!(f, "profile {}: ours={} theirs={}", field, ours, theirs)
            }
            ParityMismatch::Sample {
                test_name,
                ours,
                theirs,
            } => write!(f, "sample {}: ours={} theirs={}", test_name, ours, theirs),
            ParityMismatch::MissingSample { test_name } => {
                write!(f, "sample {}: missing from other runtime", test_name)
            }
            ParityMismatch::ExtraSample { test_name } => {
                write!(f, "sample {}: only in other runtime", test_name)
            }
        }
    }
}

impl ParityReport {
    pub fn generate(runtime: &str) -> Self {
        let mut sample_scores = Vec::new();
        for (name, url) in SAMPLE_URLS {
            match analyze_url(url) {
                Ok(report) => sample_scores.push(SampleScore {
                    test_name: name.to_string(),
                    url: url.to_string(),
                    points: report.assessment.points,
                    risk_level: report.assessment.level,
                    is_phishing: report.classification.is_phishing,
                }),
                Err(e) => log::warn!("Parity sample {} could not be analyzed: {}", name, e),
            }
        }

        ParityReport {
            runtime: runtime.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            profile: ScoringProfile::canonical(),
            sample_scores,
        }
    }

    /// Everything on which `other` disagrees with this report. Empty means parity.
    pub fn compare(&self, other: &ParityReport) -> Vec<ParityMismatch> {
        let mut mismatches = Vec::new();
        compare_profiles(&self.profile, &other.profile, &mut mismatches);

        let theirs: HashMap<&str, &SampleScore> = other
            .sample_scores
            .iter()
            .map(|s| (s.test_name.as_str(), s))
            .collect();

        for ours in &self.sample_scores {
            match theirs.get(ours.test_name.as_str()) {
                Some(their) => {
                    let ours_desc = describe_sample(ours);
                    let their_desc = describe_sample(their);
                    if ours.url != their.url || ours_desc != their_desc {
                        mismatches.push(ParityMismatch::Sample {
                            test_name: ours.test_name.clone(),
                            ours: format!("{} {}", ours.url, ours_desc),
                            theirs: format!("{} {}", their.url, their_desc),
                        });
                    }
                }
                None => mismatches.push(ParityMismatch::MissingSample {
                    test_name: ours.test_name.clone(),
                }),
            }
        }

        for their in &other.sample_scores {
            if !self
                .sample_scores
                .iter()
                .any(|ours| ours.test_name == their.test_name)
            {
                mismatches.push(ParityMismatch::ExtraSample {
                    test_name: their.test_name.clone(),
                });
            }
        }

        mismatches
    }
}

fn describe_sample(sample: &SampleScore) -> String {
    format!(
        "{} points/{}/phishing={}",
        sample.points, sample.risk_level, sample.is_phishing
    )
}

fn compare_profiles(ours: &ScoringProfile, theirs: &ScoringProfile, out: &mut Vec<ParityMismatch>) {
    let mut check = |field: &str, a: String, b: String| {
        if a != b {
            out.push(ParityMismatch::Profile {
                field: field.to_string(),
                ours: a,
                theirs: b,
            });
        }
    };

    check(
        "feature_order",
        format!("{:?}", ours.feature_order),
        format!("{:?}", theirs.feature_order),
    );
    check("low_cut", ours.low_cut.to_string(), theirs.low_cut.to_string());
    check("high_cut", ours.high_cut.to_string(), theirs.high_cut.to_string());
    check(
        "phishing_floor",
        ours.phishing_floor.to_string(),
        theirs.phishing_floor.to_string(),
    );
    check(
        "confidence_ceiling",
        ours.confidence_ceiling.to_string(),
        theirs.confidence_ceiling.to_string(),
    );
    check(
        "suspicious_words",
        ours.suspicious_words.join(","),
        theirs.suspicious_words.join(","),
    );

    // Weights are compared by feature so table order does not matter
    for entry in &ours.weights {
        let field = format!("weights.{}", entry.feature);
        match theirs.weights.iter().find(|w| w.feature == entry.feature) {
            Some(their) => check(
                &field,
                format!("{} ({})", entry.points, entry.trigger),
                format!("{} ({})", their.points, their.trigger),
            ),
            None => check(
                &field,
                format!("{} ({})", entry.points, entry.trigger),
                "unweighted".to_string(),
            ),
        }
    }
    for their in &theirs.weights {
        if !ours.weights.iter().any(|w| w.feature == their.feature) {
            check(
                &format!("weights.{}", their.feature),
                "unweighted".to_string(),
                format!("{} ({})", their.points, their.trigger),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureName;

    #[test]
    fn test_report_agrees_with_itself() {
        let report = ParityReport::generate("rust");
        assert_eq!(report.sample_scores.len(), SAMPLE_URLS.len());
        assert!(report.compare(&report.clone()).is_empty());
    }

    #[test]
    fn test_report_survives_json() {
        let report = ParityReport::generate("rust");
        let json = serde_json::to_string(&report).unwrap();
        let browser: ParityReport = serde_json::from_str(&json).unwrap();
        assert!(report.compare(&browser).is_empty());
    }

    #[test]
    fn test_weight_drift_is_reported() {
        let ours = ParityReport::generate("rust");
        let mut theirs = ours.clone();
        theirs.runtime = "browser".to_string();
        theirs.profile.weights[0].points = 15;

        let mismatches = ours.compare(&theirs);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(
            mismatches[0],
            ParityMismatch::Profile {
                field: format!("weights.{}", FeatureName::HasIpAddress),
                ours: "25 (present)".to_string(),
                theirs: "15 (present)".to_string(),
            }
        );
    }

    #[test]
    fn test_cut_and_verdict_drift_is_reported() {
        let ours = ParityReport::generate("rust");
        let mut theirs = ours.clone();
        theirs.profile.high_cut = 70;
        theirs.sample_scores[2].risk_level = RiskLevel::Medium;

        let mismatches = ours.compare(&theirs);
        assert!(mismatches
            .iter()
            .any(|m| matches!(m, ParityMismatch::Profile { field, .. } if field == "high_cut")));
        assert!(mismatches
            .iter()
            .any(|m| matches!(m, ParityMismatch::Sample { test_name, .. } if test_name == "ip_login")));
    }

    #[test]
    fn test_missing_sample_is_reported() {
        let ours = ParityReport::generate("rust");
        let mut theirs = ours.clone();
        theirs.sample_scores.pop();
        assert!(matches!(
            ours.compare(&theirs).as_slice(),
            [ParityMismatch::MissingSample { .. }]
        ));
    }

    #[test]
    fn test_extra_sample_is_reported() {
        let ours = ParityReport::generate("rust");
        let mut theirs = ours.clone();
        theirs.sample_scores.push(SampleScore {
            test_name: "browser_only".to_string(),
            url: "https://example.net".to_string(),
            points: 0,
            risk_level: RiskLevel::Low,
            is_phishing: false,
        });

        let mismatches = ours.compare(&theirs);
        assert_eq!(
            mismatches,
            vec![ParityMismatch::ExtraSample {
                test_name: "browser_only".to_string()
            }]
        );
        assert_eq!(
            mismatches[0].to_string(),
            "sample browser_only: only in other runtime"
        );
    }

    #[test]
    fn test_sample_verdicts() {
        let report = ParityReport::generate("rust");
        let by_name: HashMap<&str, &SampleScore> = report
            .sample_scores
            .iter()
            .map(|s| (s.test_name.as_str(), s))
            .collect();

        assert_eq!(by_name["plain_https"].risk_level, RiskLevel::Low);
        assert!(!by_name["plain_https"].is_phishing);
        assert_eq!(by_name["plain_http"].points, 15);
        assert_eq!(by_name["ip_login"].risk_level, RiskLevel::High);
        assert_eq!(by_name["long_subdomain_chain"].risk_level, RiskLevel::High);
    }
}
